#[cfg(test)]
mod tests {
    use multi_dict::{AxisHeader, Label, MultiDictError};

    #[test]
    fn construction_test() {
        let header: AxisHeader = AxisHeader::range(4);
        assert_eq!(header.len(), 4);
        assert_eq!(header.position(&Label::from(3)), Some(3));
        assert!(!header.contains(&Label::from(4)));

        let names: AxisHeader<String> = ["alice", "bob"].into_iter().map(String::from).collect();
        assert_eq!(names.position(&"bob".to_owned()), Some(1));
        assert!(AxisHeader::<String>::new().is_empty());
    }

    #[test]
    fn insert_tests() {
        let mut header: AxisHeader<u64> = AxisHeader::new();
        for i in 0..100 {
            assert_eq!(header.insert(i * 7), i as usize);
        }
        for i in 0..100 {
            assert_eq!(header.insert(i * 7), i as usize);
        }
        assert_eq!(header.len(), 100);
        header.extend([700, 0, 701]);
        assert_eq!(header.len(), 102);
        assert_eq!(header.index_of(0, &701), Ok(101));
        assert_eq!(
            header.index_of(2, &1),
            Err(MultiDictError::LabelNotFound { axis: 2, label: 1 })
        );
    }

    #[test]
    fn iteration_test() {
        let header: AxisHeader<char> = "abcd".chars().collect();
        let forward: Vec<&char> = header.iter().collect();
        assert_eq!(forward, vec![&'a', &'b', &'c', &'d']);
        let backward: Vec<&char> = header.iter().rev().collect();
        assert_eq!(backward, vec![&'d', &'c', &'b', &'a']);
        assert_eq!(header.iter().len(), 4);
        assert_eq!((&header).into_iter().nth(2), Some(&'c'));
        assert_eq!(format!("{header:?}"), "['a', 'b', 'c', 'd']");
    }

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Tag(u8);

    #[test]
    fn iterator_without_clone_labels_test() {
        let header: AxisHeader<Tag> = [Tag(1), Tag(2)].into_iter().collect();
        let mut iter = header.iter();
        assert_eq!(iter.next(), Some(&Tag(1)));
        let rest = iter.clone();
        assert_eq!(format!("{iter:?}"), "[Tag(2)]");
        assert_eq!(rest.count(), 1);
        assert_eq!(iter.next(), Some(&Tag(2)));
    }

    #[test]
    fn range_resolution_test() {
        let header: AxisHeader<char> = "abcdef".chars().collect();
        assert_eq!(header.resolve_range(0, Some(&'b'), Some(&'e'), 1), Ok(vec![1, 2, 3]));
        assert_eq!(header.resolve_range(0, Some(&'f'), Some(&'a'), -2), Ok(vec![5, 3, 1]));
        assert_eq!(header.resolve_range(0, None, None, 4), Ok(vec![0, 4]));
        assert_eq!(header.resolve_range(0, Some(&'e'), Some(&'b'), 1), Ok(vec![]));
        assert_eq!(
            header.resolve_range(5, Some(&'z'), None, 1),
            Err(MultiDictError::LabelNotFound { axis: 5, label: 'z' })
        );
    }

    #[test]
    fn equality_test() {
        let first: AxisHeader<u8> = [1, 2, 3].into_iter().collect();
        let mut second: AxisHeader<u8> = [1, 2].into_iter().collect();
        assert_ne!(first, second);
        second.insert(3);
        assert_eq!(first, second);
        assert_eq!(first.clone(), second);
        let reordered: AxisHeader<u8> = [3, 2, 1].into_iter().collect();
        assert_ne!(first, reordered);
    }
}
