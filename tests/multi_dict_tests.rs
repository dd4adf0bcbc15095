#[cfg(test)]
mod tests {
    use multi_dict::{key, Label, MultiDict, MultiDictError, Nested};

    fn labels<T: Into<Label>, const N: usize>(labels: [T; N]) -> Vec<Label> {
        labels.into_iter().map(Into::into).collect()
    }

    fn grid() -> MultiDict<i32> {
        MultiDict::from_nested_with_headers(
            vec![vec![12, 13], vec![25, 34], vec![56, 89]],
            vec![labels([1, 2, 3]), labels(["A", "B"])],
        )
        .expect("Unable to build the grid!")
    }

    #[test]
    fn column_projection_test() {
        let m: MultiDict<i32> = MultiDict::from_nested_with_headers(
            vec![vec![12, 13], vec![25, 34]],
            vec![labels([1, 2]), labels(["A", "B"])],
        )
        .unwrap();
        let column = m.get(key![.., "B"]).unwrap().into_view().unwrap();
        assert_eq!(column, vec![13, 34]);
        assert_eq!(m.value(key![2, "B"]), Ok(&34));
    }

    #[test]
    fn inferred_arity_test() {
        let mut m: MultiDict<i32> = MultiDict::inferring();
        assert_eq!(m.set(key!["A"], 12), Ok(None));
        assert_eq!(m.arity(), Some(1));
        assert!(!m.is_inferring());
        assert_eq!(
            m.set(key!["A", "C"], 13),
            Err(MultiDictError::ArityMismatch {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m.shape(), vec![1]);
    }

    #[test]
    fn from_flat_test() {
        let m: MultiDict<i32> =
            MultiDict::from_flat([(key![1, "A"], 12), (key![2, "B"], 34)]).unwrap();
        assert_eq!(m.value(key![2, "B"]), Ok(&34));
        assert_eq!(m.shape(), vec![2, 2]);
        assert_eq!(m.header(0).unwrap().labels(), &labels([1, 2])[..]);
        assert_eq!(m.header(1).unwrap().labels(), &labels(["A", "B"])[..]);
        // Storage is sparse
        assert_eq!(m.len(), 2);
        assert_eq!(
            m.value(key![1, "B"]),
            Err(MultiDictError::KeyNotFound {
                key: labels([Label::from(1), Label::from("B")])
            })
        );
    }

    #[test]
    fn set_get_round_trip_test() {
        let mut m: MultiDict<String> = MultiDict::with_arity(3);
        for i in 0..20 {
            let k = key![i % 4, format!("s{}", i % 5), i % 2 == 0];
            m.set(k.clone(), i.to_string()).unwrap();
            assert_eq!(m.value(k.clone()), Ok(&i.to_string()));
            assert!(m.contains(k));
        }
        assert_eq!(m.shape(), vec![4, 5, 2]);
    }

    #[test]
    fn header_growth_test() {
        let mut m: MultiDict<i32> = MultiDict::with_arity(2);
        m.set(key!["x", 1], 1).unwrap();
        assert_eq!(m.shape(), vec![1, 1]);
        m.set(key!["x", 2], 2).unwrap();
        assert_eq!(m.shape(), vec![1, 2]);
        m.set(key!["y", 2], 3).unwrap();
        assert_eq!(m.shape(), vec![2, 2]);
        // Existing labels never grow a header
        m.set(key!["y", 1], 4).unwrap();
        assert_eq!(m.shape(), vec![2, 2]);
        assert_eq!(m.header(0).unwrap().position(&Label::from("y")), Some(1));
    }

    #[test]
    fn idempotent_set_test() {
        let mut m = grid();
        let before = m.clone();
        assert_eq!(m.set(key![2, "A"], 25), Ok(Some(25)));
        assert_eq!(m, before);
        assert_eq!(m.headers(), before.headers());
        assert_eq!(m.set(key![2, "A"], 7), Ok(Some(25)));
        assert_eq!(m.value(key![2, "A"]), Ok(&7));
    }

    #[test]
    fn reads_never_insert_test() {
        let m = grid();
        assert!(!m.contains(key![9, "A"]));
        assert!(!m.contains(key![1, "Z"]));
        assert_eq!(
            m.value(key![9, "A"]),
            Err(MultiDictError::LabelNotFound {
                axis: 0,
                label: Label::from(9)
            })
        );
        assert!(m.get(key![.., "Z"]).is_err());
        assert_eq!(m.shape(), vec![3, 2]);
    }

    #[test]
    fn partial_and_long_keys_test() {
        let mut m = grid();
        assert_eq!(
            m.value(key![1]),
            Err(MultiDictError::PartialKey { axis: 1 })
        );
        assert_eq!(
            m.set(key![[1, 2], "A"], 0),
            Err(MultiDictError::PartialKey { axis: 0 })
        );
        assert_eq!(
            m.get(key![1, "A", 0]).map(|s| s.is_value()),
            Err(MultiDictError::ArityMismatch {
                expected: 2,
                found: 3
            })
        );
        assert!(m.get(key![1]).unwrap().is_view());
        assert!(m.get(key![1, "A"]).unwrap().is_value());
    }

    #[test]
    fn get_mut_and_remove_test() {
        let mut m = grid();
        *m.get_mut(key![3, "B"]).unwrap() += 11;
        assert_eq!(m.value(key![3, "B"]), Ok(&100));
        assert_eq!(m.remove(key![3, "B"]), Some(100));
        assert_eq!(m.remove(key![3, "B"]), None);
        assert_eq!(m.remove(key![7, "B"]), None);
        assert!(!m.contains(key![3, "B"]));
        // Headers keep their labels
        assert_eq!(m.shape(), vec![3, 2]);
        assert_eq!(m.len(), 5);
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.arity(), Some(2));
    }

    #[test]
    fn from_nested_test() {
        let m: MultiDict<i32> = MultiDict::from_nested(vec![vec![12, 13], vec![25, 34]]).unwrap();
        assert_eq!(m.shape(), vec![2, 2]);
        assert_eq!(m.value(key![0, 1]), Ok(&13));
        assert_eq!(m, vec![vec![12, 13], vec![25, 34]]);
        assert_eq!(m, Nested::<i32>::from(vec![vec![12, 13], vec![25, 34]]));
        assert_ne!(m, vec![vec![12, 13], vec![25, 35]]);

        let ragged = Nested::List(vec![
            Nested::Leaf(1),
            Nested::List(vec![Nested::Leaf(2)]),
        ]);
        assert_eq!(
            MultiDict::<i32>::from_nested(ragged).map(|m| m.len()),
            Err(MultiDictError::ArityMismatch {
                expected: 1,
                found: 2
            })
        );

        let empty = MultiDict::<i32>::from_nested(Vec::<i32>::new()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.is_inferring());
    }

    #[test]
    fn explicit_headers_test() {
        let m: MultiDict<i32> =
            MultiDict::with_headers(vec![labels(["a", "b"]), labels([1, 2, 3])]).unwrap();
        assert_eq!(m.shape(), vec![2, 3]);
        assert!(m.is_empty());

        let duplicate: Result<MultiDict<i32>, _> =
            MultiDict::with_headers(vec![labels(["a", "a"])]);
        assert_eq!(
            duplicate.map(|m| m.len()),
            Err(MultiDictError::DuplicateLabel {
                axis: 0,
                label: Label::from("a")
            })
        );

        let shallow: Result<MultiDict<i32>, _> =
            MultiDict::from_nested_with_headers(vec![1, 2], vec![labels(["a", "b"]), labels([1])]);
        assert_eq!(
            shallow.map(|m| m.len()),
            Err(MultiDictError::ArityMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn reduce_test() {
        let m = grid();

        let corners = m.reduce(key![[3, 1], ..]).unwrap();
        assert_eq!(corners.arity(), Some(2));
        assert_eq!(corners.header(0).unwrap().labels(), &labels([3, 1])[..]);
        assert_eq!(corners.value(key![3, "A"]), Ok(&56));
        assert_eq!(corners.value(key![1, "B"]), Ok(&13));
        assert_eq!(corners.len(), 4);

        let repeated = m.reduce(key![[1, 1, 2], "A"]).unwrap();
        assert_eq!(repeated.header(0).unwrap().labels(), &labels([1, 2])[..]);
        assert_eq!(repeated, vec![12, 25]);

        let tail = m.reduce(key![2.., "B"]).unwrap();
        assert_eq!(tail.arity(), Some(1));
        assert_eq!(tail, vec![34, 89]);

        let point = m.reduce(key![2, "B"]).unwrap();
        assert_eq!(point.arity(), Some(0));
        assert_eq!(point.value(key![]), Ok(&34));

        // The source is untouched
        assert_eq!(m, grid());
    }

    #[test]
    fn reduce_projection_test() {
        let mut m: MultiDict<i32> = MultiDict::with_arity(3);
        for i in 0..30 {
            m.set(key![i % 3, i % 5, i % 7], i).unwrap();
        }
        let reduced = m.reduce(key![[2, 0], 4, ..]).unwrap();
        assert_eq!(reduced.arity(), Some(2));
        for (labels, value) in m.items() {
            let in_selection = (labels[0] == &Label::from(2) || labels[0] == &Label::from(0))
                && labels[1] == &Label::from(4);
            let projected = key![labels[0].clone(), labels[2].clone()];
            if in_selection {
                assert_eq!(reduced.value(projected), Ok(value));
            }
        }
        let expected = m
            .items()
            .filter(|(l, _)| {
                (l[0] == &Label::from(2) || l[0] == &Label::from(0)) && l[1] == &Label::from(4)
            })
            .count();
        assert_eq!(reduced.len(), expected);
    }

    #[test]
    fn merge_test() {
        let m = grid();
        let other: MultiDict<i32> =
            MultiDict::from_flat([(key![2, "A"], 0), (key![4, "C"], 1)]).unwrap();
        let merged = m.merge(&other).unwrap();
        assert_eq!(merged.value(key![2, "A"]), Ok(&0));
        assert_eq!(merged.value(key![4, "C"]), Ok(&1));
        assert_eq!(merged.value(key![1, "A"]), Ok(&12));
        assert_eq!(merged.shape(), vec![4, 3]);
        assert_eq!(m.value(key![2, "A"]), Ok(&25));

        let empty: MultiDict<i32> = MultiDict::new();
        assert!(empty.merge(&other).unwrap().eq_labeled(&other));

        let mismatched: MultiDict<i32> = MultiDict::from_flat([(key!["x"], 1)]).unwrap();
        assert!(m.merge(&mismatched).is_err());
    }

    #[test]
    fn map_values_test() {
        let m = grid();
        let doubled = m.map_values(|v| v * 2);
        assert_eq!(doubled.len(), m.len());
        assert_eq!(doubled.headers(), m.headers());
        for (labels, value) in m.items() {
            let k = multi_dict::Key::from_labels(labels.into_iter().cloned());
            assert_eq!(doubled.value(k), Ok(&(value * 2)));
        }
        let described = m.map_values(|v| format!("#{v}"));
        assert_eq!(described.value(key![3, "B"]), Ok(&"#89".to_owned()));
    }

    #[test]
    fn equality_test() {
        let first: MultiDict<i32> =
            MultiDict::from_flat([(key!["a", 1], 1), (key!["b", 2], 2)]).unwrap();
        let second: MultiDict<i32> =
            MultiDict::from_flat([(key!["b", 2], 2), (key!["a", 1], 1)]).unwrap();
        // Same labels, different coordinates
        assert_ne!(first, second);
        assert!(first.eq_labeled(&second));
        assert!(second.eq_labeled(&first));
        assert_eq!(first, first.clone());
    }

    #[test]
    fn to_nested_test() {
        let m = grid();
        let tree = m.to_nested();
        assert_eq!(tree.labels(), vec![&Label::from(1), &Label::from(2), &Label::from(3)]);
        assert_eq!(tree.lookup(&labels([Label::from(3), Label::from("B")])), Some(&89));
        assert_eq!(
            tree.get(&Label::from(2)).map(|t| t.labels()),
            Some(vec![&Label::from("A"), &Label::from("B")])
        );
    }

    #[test]
    fn items_test() {
        let m = grid();
        let mut items: Vec<(Vec<Label>, i32)> = m
            .items()
            .map(|(l, v)| (l.into_iter().cloned().collect(), *v))
            .collect();
        items.sort();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], (labels([Label::from(1), Label::from("A")]), 12));
        assert_eq!(items[5], (labels([Label::from(3), Label::from("B")]), 89));
        assert_eq!(m.items().len(), 6);
        let mut values: Vec<i32> = m.values().copied().collect();
        values.sort();
        assert_eq!(values, vec![12, 13, 25, 34, 56, 89]);
    }
}
