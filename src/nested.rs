use std::fmt;

/// Nested list data, the input of [`MultiDict::from_nested`].
///
/// Every leaf is addressed by the path of list indices leading to it, so
/// `vec![vec![12, 13], vec![25, 34]]` places `34` at `(1, 1)`. All leaves must sit at the same
/// depth.
///
/// [`MultiDict::from_nested`]: crate::MultiDict::from_nested
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Nested<V> {
    /// A single value
    Leaf(V),
    /// A list of nested items
    List(Vec<Nested<V>>),
}

impl<V> Nested<V> {
    /// Consumes the data and returns every leaf together with its path
    pub fn unroll(self) -> Vec<(Vec<usize>, V)> {
        let mut digest = Vec::new();
        let mut stack = vec![(Vec::new(), self)];
        while let Some((path, item)) = stack.pop() {
            match item {
                Nested::Leaf(v) => digest.push((path, v)),
                Nested::List(items) => {
                    for (i, item) in items.into_iter().enumerate().rev() {
                        let mut item_path = path.clone();
                        item_path.push(i);
                        stack.push((item_path, item));
                    }
                }
            }
        }
        digest
    }

    /// Returns every leaf together with its path, without consuming the data
    pub fn unroll_ref(&self) -> Vec<(Vec<usize>, &V)> {
        let mut digest = Vec::new();
        let mut stack = vec![(Vec::new(), self)];
        while let Some((path, item)) = stack.pop() {
            match item {
                Nested::Leaf(v) => digest.push((path, v)),
                Nested::List(items) => {
                    for (i, item) in items.iter().enumerate().rev() {
                        let mut item_path = path.clone();
                        item_path.push(i);
                        stack.push((item_path, item));
                    }
                }
            }
        }
        digest
    }
}

impl<V: fmt::Debug> fmt::Debug for Nested<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nested::Leaf(v) => v.fmt(f),
            Nested::List(items) => f.debug_list().entries(items.iter()).finish(),
        }
    }
}

impl<V> From<Vec<V>> for Nested<V> {
    fn from(values: Vec<V>) -> Self {
        Nested::List(values.into_iter().map(Nested::Leaf).collect())
    }
}

impl<V> From<Vec<Vec<V>>> for Nested<V> {
    fn from(rows: Vec<Vec<V>>) -> Self {
        Nested::List(rows.into_iter().map(Nested::<V>::from).collect())
    }
}

impl<V> From<Vec<Vec<Vec<V>>>> for Nested<V> {
    fn from(planes: Vec<Vec<Vec<V>>>) -> Self {
        Nested::List(planes.into_iter().map(Nested::<V>::from).collect())
    }
}

impl<V> FromIterator<Nested<V>> for Nested<V> {
    fn from_iter<T: IntoIterator<Item = Nested<V>>>(iter: T) -> Self {
        Nested::List(iter.into_iter().collect())
    }
}

/// A map rendered as nested levels, one level per axis, keyed by external labels.
///
/// Produced by [`MultiDict::to_nested`]. Branches list their children in header order.
///
/// [`MultiDict::to_nested`]: crate::MultiDict::to_nested
#[derive(Clone, PartialEq, Eq)]
pub enum Tree<L, V> {
    /// A stored value
    Leaf(V),
    /// One level of the map: each label of the axis that has entries beneath it
    Branch(Vec<(L, Tree<L, V>)>),
}

impl<L: PartialEq, V> Tree<L, V> {
    /// Returns the subtree under the given label of this level
    pub fn get(&self, label: &L) -> Option<&Tree<L, V>> {
        match self {
            Tree::Leaf(_) => None,
            Tree::Branch(children) => children
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, child)| child),
        }
    }

    /// Follows the labels down the levels and returns the value found at the end
    pub fn lookup(&self, labels: &[L]) -> Option<&V> {
        let mut node = self;
        for label in labels {
            node = node.get(label)?;
        }
        node.leaf()
    }

    /// Returns the value if this is a leaf
    pub fn leaf(&self) -> Option<&V> {
        match self {
            Tree::Leaf(v) => Some(v),
            Tree::Branch(_) => None,
        }
    }

    /// Returns the labels of this level, in header order
    pub fn labels(&self) -> Vec<&L> {
        match self {
            Tree::Leaf(_) => Vec::new(),
            Tree::Branch(children) => children.iter().map(|(l, _)| l).collect(),
        }
    }
}

impl<L: fmt::Debug, V: fmt::Debug> fmt::Debug for Tree<L, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(v) => v.fmt(f),
            Tree::Branch(children) => f
                .debug_map()
                .entries(children.iter().map(|(l, c)| (l, c)))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unroll_test() {
        let data: Nested<i32> = Nested::from(vec![vec![12, 13], vec![25, 34]]);
        let by_ref: Vec<(Vec<usize>, i32)> =
            data.unroll_ref().into_iter().map(|(p, v)| (p, *v)).collect();
        let owned = data.unroll();
        assert_eq!(by_ref, owned);
        assert_eq!(
            owned,
            vec![
                (vec![0, 0], 12),
                (vec![0, 1], 13),
                (vec![1, 0], 25),
                (vec![1, 1], 34)
            ]
        );
    }

    #[test]
    fn ragged_unroll_test() {
        let data = Nested::List(vec![
            Nested::Leaf(1),
            Nested::List(vec![Nested::Leaf(2), Nested::Leaf(3)]),
        ]);
        assert_eq!(
            data.unroll(),
            vec![(vec![0], 1), (vec![1, 0], 2), (vec![1, 1], 3)]
        );
        assert!(Nested::<u8>::List(vec![]).unroll().is_empty());
        assert_eq!(Nested::Leaf(7).unroll(), vec![(vec![], 7)]);
    }
}
