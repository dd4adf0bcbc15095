use std::{
    default::Default,
    fmt,
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
};

use hashbrown::{hash_map, hash_map::DefaultHashBuilder, HashMap};
use log::debug;

use crate::{
    error::{MultiDictError, Result},
    functions,
    header::AxisHeader,
    key::Key,
    label::Label,
    nested::{Nested, Tree},
    selected::Selected,
    translate::*,
    view::{View, ViewMut},
};

/// A sparse map from multi-axis keys to values.
///
/// A `MultiDict` has a fixed number of axes, its arity. Each axis owns an [`AxisHeader`] that
/// translates the axis' external labels into positions, and values are stored under the
/// [`Coordinate`] made of those positions. Only the entries that were actually written are
/// stored; nothing is defaulted.
///
/// Indexing with a key that has a label on every axis addresses one value. Indexing with a key
/// that lists several labels, or a range of labels, on some axis yields a [`View`]: a deferred
/// projection of the map that can be indexed further or materialized into a new `MultiDict`
/// with [`reduce`].
///
/// Writes append new labels to the headers as needed. Reads never do; looking up a label that
/// is not in its header is an error, not a miss.
///
/// The arity is fixed once established. It can be set up front with [`with_arity`], set later
/// with [`establish_arity`], or, for maps built with [`inferring`], taken from the first write.
///
/// # Examples
/// ```rust
/// use multi_dict::{key, MultiDict, MultiDictError};
///
/// let mut grades: MultiDict<u32> = MultiDict::with_arity(2);
/// grades.set(key!["alice", "math"], 90).unwrap();
/// grades.set(key!["alice", "art"], 75).unwrap();
/// grades.set(key!["bob", "math"], 60).unwrap();
///
/// assert_eq!(grades.value(key!["alice", "art"]), Ok(&75));
/// assert_eq!(grades.shape(), vec![2, 2]);
///
/// // Bob never took art
/// assert!(!grades.contains(key!["bob", "art"]));
///
/// // Every grade in math, as a map of its own
/// let math = grades.reduce(key![.., "math"]).unwrap();
/// assert_eq!(math.arity(), Some(1));
/// assert_eq!(math.value(key!["bob"]), Ok(&60));
///
/// // Keys must match the arity
/// assert_eq!(
///     grades.set(key!["carol"], 10),
///     Err(MultiDictError::ArityMismatch { expected: 2, found: 1 })
/// );
/// ```
///
/// [`reduce`]: struct.MultiDict.html#method.reduce
/// [`with_arity`]: struct.MultiDict.html#method.with_arity
/// [`establish_arity`]: struct.MultiDict.html#method.establish_arity
/// [`inferring`]: struct.MultiDict.html#method.inferring
pub struct MultiDict<V, L = Label, S = DefaultHashBuilder> {
    pub(crate) hash_builder: S,
    pub(crate) headers: Vec<AxisHeader<L, S>>,
    store: HashMap<Coordinate, V, S>,
    arity: Option<usize>,
    infer_arity: bool,
}

impl<V, L> MultiDict<V, L, DefaultHashBuilder> {
    #[inline]
    /// Creates an empty map whose arity is not yet established. Writes fail until
    /// [`establish_arity`] is called.
    ///
    /// [`establish_arity`]: struct.MultiDict.html#method.establish_arity
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    /// Creates an empty map whose arity is taken from the first write
    pub fn inferring() -> Self {
        Self::inferring_with_hasher(DefaultHashBuilder::default())
    }

    #[inline]
    /// Creates an empty map with the given number of axes
    pub fn with_arity(arity: usize) -> Self {
        Self::with_arity_and_hasher(arity, DefaultHashBuilder::default())
    }
}

impl<V, L> MultiDict<V, L, DefaultHashBuilder>
where
    L: Eq + Hash + Clone,
{
    /// Creates a map with the given headers and no values
    pub fn with_headers(headers: Vec<Vec<L>>) -> Result<Self, L> {
        Self::from_nested_with_headers(Nested::List(Vec::new()), headers)
    }

    /// Builds a map out of nested lists. Each leaf is stored under the path of list indices that
    /// leads to it, and every axis gets the header `0..N`, where `N` is one more than the largest
    /// index seen on that axis.
    ///
    /// Empty data yields an empty map that infers its arity from the first write.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_nested(vec![vec![12, 13], vec![25, 34]]).unwrap();
    /// assert_eq!(m.shape(), vec![2, 2]);
    /// assert_eq!(m.value(key![1, 0]), Ok(&25));
    /// ```
    pub fn from_nested<N>(data: N) -> Result<Self, L>
    where
        N: Into<Nested<V>>,
        L: TryFrom<usize>,
    {
        let entries = data.into().unroll();
        let arity = match entries.first() {
            Some((path, _)) => path.len(),
            None => return Ok(Self::inferring()),
        };
        let mut shape = vec![0; arity];
        for (path, _) in &entries {
            if path.len() != arity {
                return Err(MultiDictError::ArityMismatch {
                    expected: arity,
                    found: path.len(),
                });
            }
            for (len, pos) in shape.iter_mut().zip(path.iter()) {
                *len = (*len).max(pos + 1);
            }
        }
        let hash_builder = DefaultHashBuilder::default();
        let headers = shape
            .into_iter()
            .map(|len| AxisHeader::range_with_hasher(len, hash_builder.clone()))
            .collect();
        debug!("built a map of arity {arity} from {} nested values", entries.len());
        Self::from_parts(hash_builder, headers, entries)
    }

    /// Builds a map out of nested lists, labelling each axis with the given header instead of
    /// list indices. The data must not reach past the end of any header.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, Label, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_nested_with_headers(
    ///     vec![vec![12, 13], vec![25, 34]],
    ///     vec![vec![Label::from(1), Label::from(2)], vec!["A".into(), "B".into()]],
    /// )
    /// .unwrap();
    /// assert_eq!(m.value(key![2, "A"]), Ok(&25));
    /// ```
    pub fn from_nested_with_headers<N>(data: N, headers: Vec<Vec<L>>) -> Result<Self, L>
    where
        N: Into<Nested<V>>,
    {
        let hash_builder = DefaultHashBuilder::default();
        let headers = headers
            .into_iter()
            .enumerate()
            .map(|(axis, labels)| {
                AxisHeader::from_labels_with_hasher(axis, labels, hash_builder.clone())
            })
            .collect::<Result<Vec<_>, L>>()?;
        Self::from_parts(hash_builder, headers, data.into().unroll())
    }

    /// Builds a map out of fully concrete keys and their values. Headers are filled in the order
    /// the labels are first seen, and the arity is taken from the first key.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_flat([(key![1, "A"], 12), (key![2, "B"], 34)]).unwrap();
    /// assert_eq!(m.value(key![2, "B"]), Ok(&34));
    /// assert!(!m.contains(key![1, "B"]));
    /// ```
    pub fn from_flat<I, K>(entries: I) -> Result<Self, L>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key<L>>,
    {
        let mut digest = Self::inferring();
        for (key, value) in entries {
            digest.set(key, value)?;
        }
        Ok(digest)
    }
}

impl<V, L, S> MultiDict<V, L, S>
where
    L: Eq + Hash,
    S: BuildHasher,
{
    /// Assembles a map out of prepared headers and coordinate/value pairs, checking that every
    /// coordinate fits the headers.
    pub(crate) fn from_parts<I, C>(
        hash_builder: S,
        headers: Vec<AxisHeader<L, S>>,
        entries: I,
    ) -> Result<Self, L>
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<Coordinate>,
        S: Clone,
    {
        let arity = headers.len();
        let mut store = HashMap::with_hasher(hash_builder.clone());
        for (coordinate, value) in entries {
            let coordinate = coordinate.into();
            if coordinate.arity() != arity {
                return Err(MultiDictError::ArityMismatch {
                    expected: arity,
                    found: coordinate.arity(),
                });
            }
            for (axis, (pos, header)) in coordinate.iter().zip(headers.iter()).enumerate() {
                if *pos >= header.len() {
                    return Err(MultiDictError::CoordinateOutOfBounds {
                        axis,
                        position: *pos,
                        len: header.len(),
                    });
                }
            }
            store.insert(coordinate, value);
        }
        Ok(Self {
            hash_builder,
            headers,
            store,
            arity: Some(arity),
            infer_arity: false,
        })
    }

    /// Fixes the arity of the map. Establishing the arity a map already has is a no-op; any
    /// other arity is an error.
    pub fn establish_arity(&mut self, arity: usize) -> Result<(), L>
    where
        S: Clone,
    {
        match self.arity {
            Some(current) if current == arity => Ok(()),
            Some(current) => Err(MultiDictError::ArityMismatch {
                expected: current,
                found: arity,
            }),
            None => {
                debug!("established an arity of {arity}");
                self.headers = (0..arity)
                    .map(|_| AxisHeader::with_hasher(self.hash_builder.clone()))
                    .collect();
                self.arity = Some(arity);
                Ok(())
            }
        }
    }

    fn established(&self) -> Result<usize, L> {
        self.arity.ok_or(MultiDictError::ArityNotEstablished)
    }

    /// Sets the value stored under a concrete key, returning the value it replaces.
    ///
    /// Labels missing from their headers are appended. The key must have exactly one label per
    /// axis. On a map built with [`inferring`], the first write establishes the arity.
    ///
    /// [`inferring`]: struct.MultiDict.html#method.inferring
    pub fn set<K: Into<Key<L>>>(&mut self, key: K, value: V) -> Result<Option<V>, L>
    where
        S: Clone,
    {
        let key = key.into();
        if self.arity.is_none() {
            if !self.infer_arity {
                return Err(MultiDictError::ArityNotEstablished);
            }
            self.establish_arity(key.len())?;
        }
        let coordinate = resolve_for_write(&mut self.headers, key)?;
        Ok(self.store.insert(coordinate, value))
    }

    /// Indexes the map. A key with a label on every axis returns the stored value; a key that
    /// selects several labels on some axis returns a [`View`]. Missing trailing axes select the
    /// whole axis.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_nested(vec![vec![12, 13], vec![25, 34]]).unwrap();
    /// assert_eq!(m.get(key![0, 1]).unwrap().value(), Some(&13));
    ///
    /// let row = m.get(key![1]).unwrap().into_view().unwrap();
    /// assert_eq!(row, vec![25, 34]);
    /// ```
    pub fn get<K: Into<Key<L>>>(&self, key: K) -> Result<Selected<'_, V, L, S>, L>
    where
        L: Clone,
    {
        let arity = self.established()?;
        let key = key.into();
        match resolve(&self.headers, &key)? {
            Resolved::Point(coordinate) => self.lookup(&coordinate).map(Selected::Value),
            Resolved::Partial(_) => Ok(Selected::View(View::new(self, key.pad(arity)))),
        }
    }

    /// Returns the value stored under a concrete key
    pub fn value<K: Into<Key<L>>>(&self, key: K) -> Result<&V, L>
    where
        L: Clone,
    {
        self.established()?;
        let coordinate = self.point(&key.into())?;
        self.lookup(&coordinate)
    }

    /// Returns a mutable reference to the value stored under a concrete key
    pub fn get_mut<K: Into<Key<L>>>(&mut self, key: K) -> Result<&mut V, L>
    where
        L: Clone,
    {
        self.established()?;
        let coordinate = self.point(&key.into())?;
        let Self { store, headers, .. } = self;
        store
            .get_mut(&coordinate)
            .ok_or_else(|| missing_key(headers, &coordinate))
    }

    /// Returns true if a value is stored under the key. Any label that cannot be resolved makes
    /// this false rather than an error.
    pub fn contains<K: Into<Key<L>>>(&self, key: K) -> bool
    where
        L: Clone,
    {
        if self.arity.is_none() {
            return false;
        }
        match resolve(&self.headers, &key.into()) {
            Ok(Resolved::Point(coordinate)) => self.store.contains_key(&coordinate),
            _ => false,
        }
    }

    /// Removes the value stored under a concrete key and returns it. Headers keep their labels.
    pub fn remove<K: Into<Key<L>>>(&mut self, key: K) -> Option<V>
    where
        L: Clone,
    {
        match resolve(&self.headers, &key.into()) {
            Ok(Resolved::Point(coordinate)) if self.arity.is_some() => {
                self.store.remove(&coordinate)
            }
            _ => None,
        }
    }

    /// Creates a [`View`] over the selection made by the key. Unlike [`get`], a fully concrete
    /// key also yields a view.
    ///
    /// [`get`]: struct.MultiDict.html#method.get
    pub fn view<K: Into<Key<L>>>(&self, key: K) -> Result<View<'_, V, L, S>, L>
    where
        L: Clone,
    {
        let arity = self.established()?;
        let key = key.into();
        resolve(&self.headers, &key)?;
        Ok(View::new(self, key.pad(arity)))
    }

    /// Creates a [`ViewMut`] over the selection made by the key, through which values can be
    /// written.
    pub fn view_mut<K: Into<Key<L>>>(&mut self, key: K) -> Result<ViewMut<'_, V, L, S>, L>
    where
        L: Clone,
    {
        let arity = self.established()?;
        let key = key.into();
        resolve(&self.headers, &key)?;
        Ok(ViewMut::new(self, key.pad(arity)))
    }

    /// Materializes the selection made by the key into a new, independent map.
    ///
    /// Axes given a single label are filtered on and dropped. Axes given a list or a range are
    /// kept, with their headers cut down to the selected labels in selection order. Entries that
    /// do not match the filters are left out.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, Label, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_nested_with_headers(
    ///     vec![vec![12, 13], vec![25, 34], vec![56, 89]],
    ///     vec![vec![Label::from(1), Label::from(2), Label::from(3)], vec!["A".into(), "B".into()]],
    /// )
    /// .unwrap();
    ///
    /// let corners = m.reduce(key![[3, 1], "B"]).unwrap();
    /// assert_eq!(corners.arity(), Some(1));
    /// assert_eq!(corners.header(0).unwrap().labels(), &[Label::from(3), Label::from(1)]);
    /// assert_eq!(corners, vec![89, 13]);
    /// ```
    pub fn reduce<K: Into<Key<L>>>(&self, key: K) -> Result<Self, L>
    where
        V: Clone,
        L: Clone,
        S: Clone,
    {
        self.established()?;
        let selections = match resolve(&self.headers, &key.into())? {
            Resolved::Point(coordinate) => coordinate.iter().map(|p| Selection::One(*p)).collect(),
            Resolved::Partial(selections) => selections,
        };
        Ok(self.reduce_selections(&selections))
    }

    pub(crate) fn reduce_selections(&self, selections: &[Selection]) -> Self
    where
        V: Clone,
        L: Clone,
        S: Clone,
    {
        let mut headers = Vec::new();
        let mut remaps: Vec<Option<HashMap<usize, usize>>> = Vec::with_capacity(selections.len());
        for (header, selection) in self.headers.iter().zip(selections.iter()) {
            match selection {
                Selection::One(_) => remaps.push(None),
                Selection::Many(positions) => {
                    let mut remap = HashMap::with_capacity(positions.len());
                    let mut kept = Vec::with_capacity(positions.len());
                    for pos in positions {
                        if !remap.contains_key(pos) {
                            remap.insert(*pos, kept.len());
                            kept.push(*pos);
                        }
                    }
                    headers.push(header.restrict(&kept));
                    remaps.push(Some(remap));
                }
            }
        }
        let mut store = HashMap::with_hasher(self.hash_builder.clone());
        for (coordinate, value) in self.store.iter() {
            let mut projected = Vec::with_capacity(headers.len());
            let matched = coordinate.iter().zip(selections.iter().zip(remaps.iter())).all(
                |(pos, (selection, remap))| match (selection, remap) {
                    (Selection::One(wanted), _) => wanted == pos,
                    (Selection::Many(_), Some(remap)) => match remap.get(pos) {
                        Some(new_pos) => {
                            projected.push(*new_pos);
                            true
                        }
                        None => false,
                    },
                    (Selection::Many(_), None) => false,
                },
            );
            if matched {
                store.insert(Coordinate::new(projected), value.clone());
            }
        }
        debug!(
            "reduced a map of {} entries to {} entries over {} axes",
            self.store.len(),
            store.len(),
            headers.len()
        );
        Self {
            hash_builder: self.hash_builder.clone(),
            arity: Some(headers.len()),
            headers,
            store,
            infer_arity: false,
        }
    }

    /// Returns a copy of this map with every entry of `other` written into it. Entries of
    /// `other` replace entries of `self` under the same labels.
    ///
    /// A map without an arity takes the arity of `other`.
    pub fn merge<S2>(&self, other: &MultiDict<V, L, S2>) -> Result<Self, L>
    where
        V: Clone,
        L: Clone,
        S: Clone,
    {
        let mut digest = self.clone();
        if let (None, Some(arity)) = (digest.arity, other.arity) {
            digest.establish_arity(arity)?;
        }
        for (labels, value) in other.items() {
            digest.set(Key::from_labels(labels.into_iter().cloned()), value.clone())?;
        }
        Ok(digest)
    }

    /// Returns a new map with the same headers and coordinates where every value is passed
    /// through `f`. This map is left untouched.
    pub fn map_values<W, F>(&self, f: F) -> MultiDict<W, L, S>
    where
        F: FnMut(&V) -> W,
        L: Clone,
        S: Clone,
    {
        MultiDict {
            hash_builder: self.hash_builder.clone(),
            headers: self.headers.clone(),
            store: functions::map_values(f, &self.store),
            arity: self.arity,
            infer_arity: self.infer_arity,
        }
    }

    /// Renders the map as nested levels, one per axis, keyed by labels in header order
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, Label, MultiDict};
    ///
    /// let m: MultiDict<i32> = MultiDict::from_flat([(key!["x", 1], 10), (key!["y", 2], 20)]).unwrap();
    /// let tree = m.to_nested();
    /// assert_eq!(tree.labels(), vec![&Label::from("x"), &Label::from("y")]);
    /// assert_eq!(tree.lookup(&[Label::from("y"), Label::from(2)]), Some(&20));
    /// assert_eq!(tree.lookup(&[Label::from("y"), Label::from(1)]), None);
    /// ```
    pub fn to_nested(&self) -> Tree<L, V>
    where
        V: Clone,
        L: Clone,
    {
        let mut entries: Vec<(&Coordinate, &V)> = self.store.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        self.build_tree(&entries, 0)
    }

    fn build_tree(&self, entries: &[(&Coordinate, &V)], depth: usize) -> Tree<L, V>
    where
        V: Clone,
        L: Clone,
    {
        match entries {
            [(coordinate, value)] if coordinate.arity() == depth => Tree::Leaf((*value).clone()),
            _ => {
                let mut children = Vec::new();
                let mut rest = entries;
                while let Some((first, _)) = rest.first() {
                    let pos = first[depth];
                    let split = rest
                        .iter()
                        .position(|(c, _)| c[depth] != pos)
                        .unwrap_or(rest.len());
                    let (group, tail) = rest.split_at(split);
                    if let Some(label) = self.headers[depth].label(pos) {
                        children.push((label.clone(), self.build_tree(group, depth + 1)));
                    }
                    rest = tail;
                }
                Tree::Branch(children)
            }
        }
    }

    /// Compares two maps through their labels rather than their internal coordinates. Two maps
    /// are equal this way if they hold the same values under the same external keys, regardless
    /// of the order in which labels were added to their headers.
    pub fn eq_labeled<S2>(&self, other: &MultiDict<V, L, S2>) -> bool
    where
        V: PartialEq,
        L: Clone,
        S2: BuildHasher,
    {
        self.arity == other.arity
            && self.len() == other.len()
            && self.items().all(|(labels, value)| {
                other.value(Key::from_labels(labels.into_iter().cloned())) == Ok(value)
            })
    }

    fn point(&self, key: &Key<L>) -> Result<Coordinate, L>
    where
        L: Clone,
    {
        match resolve(&self.headers, key)? {
            Resolved::Point(coordinate) => Ok(coordinate),
            Resolved::Partial(_) => {
                let axis = (0..self.headers.len())
                    .find(|axis| key.tokens().get(*axis).map_or(true, |t| !t.is_concrete()))
                    .unwrap_or(0);
                Err(MultiDictError::PartialKey { axis })
            }
        }
    }

    pub(crate) fn lookup(&self, coordinate: &Coordinate) -> Result<&V, L>
    where
        L: Clone,
    {
        self.store
            .get(coordinate)
            .ok_or_else(|| missing_key(&self.headers, coordinate))
    }
}

fn missing_key<L: Clone, S>(headers: &[AxisHeader<L, S>], coordinate: &Coordinate) -> MultiDictError<L> {
    MultiDictError::KeyNotFound {
        key: labels_of(headers, coordinate).into_iter().cloned().collect(),
    }
}

impl<V, L, S> MultiDict<V, L, S> {
    /// Creates an empty map without an arity that uses the given hasher
    pub fn with_hasher(hash_builder: S) -> Self
    where
        S: Clone,
    {
        Self {
            headers: Vec::new(),
            store: HashMap::with_hasher(hash_builder.clone()),
            hash_builder,
            arity: None,
            infer_arity: false,
        }
    }

    /// Creates an empty map that infers its arity from the first write and uses the given hasher
    pub fn inferring_with_hasher(hash_builder: S) -> Self
    where
        S: Clone,
    {
        let mut digest = Self::with_hasher(hash_builder);
        digest.infer_arity = true;
        digest
    }

    /// Creates an empty map with the given number of axes that uses the given hasher
    pub fn with_arity_and_hasher(arity: usize, hash_builder: S) -> Self
    where
        S: Clone,
    {
        Self {
            headers: (0..arity)
                .map(|_| AxisHeader::with_hasher(hash_builder.clone()))
                .collect(),
            store: HashMap::with_hasher(hash_builder.clone()),
            hash_builder,
            arity: Some(arity),
            infer_arity: false,
        }
    }

    /// Returns a reference to the [`BuildHasher`] used by the map
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of axes, if established
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Returns true if the map takes its arity from the first write
    pub fn is_inferring(&self) -> bool {
        self.infer_arity && self.arity.is_none()
    }

    /// Returns the number of labels on each axis
    pub fn shape(&self) -> Vec<usize> {
        self.headers.iter().map(AxisHeader::len).collect()
    }

    /// Returns the headers of all axes
    pub fn headers(&self) -> &[AxisHeader<L, S>] {
        &self.headers
    }

    /// Returns the header of the given axis
    pub fn header(&self, axis: usize) -> Option<&AxisHeader<L, S>> {
        self.headers.get(axis)
    }

    /// Returns the number of stored values
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if no values are stored
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all values while keeping the headers and the arity
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Returns an iterator over the stored entries as external labels and values. Entries are
    /// visited in an arbitrary order.
    pub fn items(&self) -> Items<'_, V, L, S> {
        Items {
            iter: self.store.iter(),
            headers: &self.headers,
        }
    }

    /// Returns an iterator over the stored entries by internal coordinate
    pub fn coordinates(&self) -> hash_map::Iter<'_, Coordinate, V> {
        self.store.iter()
    }

    /// Returns an iterator over the stored values
    pub fn values(&self) -> hash_map::Values<'_, Coordinate, V> {
        self.store.values()
    }
}

impl<V, L, S> Clone for MultiDict<V, L, S>
where
    V: Clone,
    L: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hash_builder: self.hash_builder.clone(),
            headers: self.headers.clone(),
            store: self.store.clone(),
            arity: self.arity,
            infer_arity: self.infer_arity,
        }
    }
}

impl<V, L, S> Default for MultiDict<V, L, S>
where
    S: Default + Clone,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<V, L, S> fmt::Debug for MultiDict<V, L, S>
where
    V: fmt::Debug,
    L: fmt::Debug,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<(&Coordinate, &V)> = self.store.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        fmt.debug_map()
            .entries(
                entries
                    .into_iter()
                    .map(|(c, v)| (LabelTuple(labels_of(&self.headers, c)), v)),
            )
            .finish()
    }
}

struct LabelTuple<'a, L>(Vec<&'a L>);

impl<L: fmt::Debug> fmt::Debug for LabelTuple<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("");
        for label in &self.0 {
            tuple.field(label);
        }
        tuple.finish()
    }
}

/// Two maps are equal if their coordinate stores are equal. Headers are not compared, so two
/// maps that place different labels at the same positions can compare equal; use
/// [`MultiDict::eq_labeled`] to compare through labels.
impl<V, L, S> PartialEq for MultiDict<V, L, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store
    }
}

impl<V, L, S> Eq for MultiDict<V, L, S>
where
    V: Eq,
    S: BuildHasher,
{
}

impl<V, L, S> PartialEq<Nested<V>> for MultiDict<V, L, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Nested<V>) -> bool {
        let entries = other.unroll_ref();
        entries.len() == self.store.len()
            && entries.into_iter().all(|(path, value)| {
                self.store.get(&Coordinate::new(path)) == Some(value)
            })
    }
}

impl<V, L, S> PartialEq<Vec<V>> for MultiDict<V, L, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Vec<V>) -> bool {
        other.len() == self.store.len()
            && other
                .iter()
                .enumerate()
                .all(|(i, value)| self.store.get(&Coordinate::new(vec![i])) == Some(value))
    }
}

impl<V, L, S> PartialEq<Vec<Vec<V>>> for MultiDict<V, L, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Vec<Vec<V>>) -> bool {
        other.iter().map(Vec::len).sum::<usize>() == self.store.len()
            && other.iter().enumerate().all(|(i, row)| {
                row.iter().enumerate().all(|(j, value)| {
                    self.store.get(&Coordinate::new(vec![i, j])) == Some(value)
                })
            })
    }
}

/// An iterator over the entries of a [`MultiDict`], as external labels and values.
pub struct Items<'a, V, L, S> {
    iter: hash_map::Iter<'a, Coordinate, V>,
    headers: &'a [AxisHeader<L, S>],
}

impl<V, L, S> Clone for Items<'_, V, L, S> {
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
            headers: self.headers,
        }
    }
}

impl<V, L, S> fmt::Debug for Items<'_, V, L, S>
where
    V: fmt::Debug,
    L: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, V, L, S> Iterator for Items<'a, V, L, S> {
    type Item = (Vec<&'a L>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|(coordinate, value)| (labels_of(self.headers, coordinate), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V, L, S> ExactSizeIterator for Items<'_, V, L, S> {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

impl<V, L, S> FusedIterator for Items<'_, V, L, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;

    #[test]
    fn arity_policy_test() {
        let mut m: MultiDict<i32> = MultiDict::new();
        assert_eq!(m.arity(), None);
        assert!(!m.is_inferring());
        assert_eq!(
            m.set(key!["A"], 12),
            Err(MultiDictError::ArityNotEstablished)
        );
        assert!(m.headers().is_empty());
        m.establish_arity(1).unwrap();
        assert_eq!(m.set(key!["A"], 12), Ok(None));
        assert_eq!(m.establish_arity(1), Ok(()));
        assert_eq!(
            m.establish_arity(2),
            Err(MultiDictError::ArityMismatch {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn failed_write_keeps_headers_test() {
        let mut m: MultiDict<i32> = MultiDict::with_arity(2);
        m.set(key!["A", "B"], 1).unwrap();
        assert!(m.set(key!["C", ..], 2).is_err());
        assert!(m.set(key!["C"], 2).is_err());
        assert_eq!(m.shape(), vec![1, 1]);
    }

    #[test]
    fn reads_on_unestablished_map_test() {
        let m: MultiDict<i32> = MultiDict::inferring();
        assert!(m.is_inferring());
        assert!(!m.contains(key!["A"]));
        assert_eq!(m.value(key!["A"]), Err(MultiDictError::ArityNotEstablished));
        assert!(m.get(key!["A"]).is_err());
        assert!(m.reduce(key![..]).is_err());
    }

    #[test]
    fn out_of_bounds_headers_test() {
        let m: Result<MultiDict<i32>> = MultiDict::from_nested_with_headers(
            vec![vec![1, 2, 3]],
            vec![vec![Label::from(0)], vec![Label::from("a"), Label::from("b")]],
        );
        assert_eq!(
            m.unwrap_err(),
            MultiDictError::CoordinateOutOfBounds {
                axis: 1,
                position: 2,
                len: 2
            }
        );
    }

    #[test]
    fn debug_output_test() {
        let m: MultiDict<i32> =
            MultiDict::from_flat([(key![1, "A"], 12), (key![2, "B"], 34)]).unwrap();
        assert_eq!(format!("{m:?}"), "{(1, \"A\"): 12, (2, \"B\"): 34}");
    }
}
