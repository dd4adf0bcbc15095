use std::{
    fmt,
    hash::{BuildHasher, Hash},
    iter::FusedIterator,
};

use hashbrown::{hash_map::DefaultHashBuilder, raw::RawTable};
use log::trace;

use crate::{
    error::{MultiDictError, Result},
    label::Label,
    utils::*,
};

/// The labels of one axis of a [`MultiDict`], in position order.
///
/// A label's position in the header is the coordinate used for it internally. Labels are unique
/// within a header and, once placed, never move: new labels are only ever appended.
///
/// Lookups from label to position are near-constant time. Like the maps in `hashbrown`, the
/// header only keeps a single copy of each label; the lookup table stores positions and hashes
/// through the label list.
///
/// # Examples
/// ```rust
/// use multi_dict::{AxisHeader, Label};
///
/// let mut header: AxisHeader = AxisHeader::new();
/// assert_eq!(header.insert(Label::from("A")), 0);
/// assert_eq!(header.insert(Label::from("B")), 1);
/// assert_eq!(header.insert(Label::from("A")), 0);
/// assert_eq!(header.len(), 2);
/// assert_eq!(header.position(&Label::from("B")), Some(1));
/// ```
///
/// [`MultiDict`]: crate::MultiDict
pub struct AxisHeader<L = Label, S = DefaultHashBuilder> {
    hash_builder: S,
    labels: Vec<L>,
    lookup: RawTable<usize>,
}

impl<L> AxisHeader<L, DefaultHashBuilder> {
    #[inline]
    /// Creates an empty header
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header holding the labels `0..len`
    pub fn range(len: usize) -> Self
    where
        L: Eq + Hash + TryFrom<usize>,
    {
        Self::range_with_hasher(len, DefaultHashBuilder::default())
    }
}

impl<L, S> AxisHeader<L, S> {
    /// Creates an empty header that uses the given hasher
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self {
            hash_builder,
            labels: Vec::new(),
            lookup: RawTable::new(),
        }
    }

    /// Returns the number of labels in the header
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the header has no labels
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the labels in position order
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Returns the label at the given position
    pub fn label(&self, position: usize) -> Option<&L> {
        self.labels.get(position)
    }

    /// Returns an iterator over the labels in position order
    pub fn iter(&self) -> HeaderIter<'_, L> {
        HeaderIter {
            iter: self.labels.iter(),
        }
    }

    /// Returns a reference to the [`BuildHasher`] used by the header
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<L, S> AxisHeader<L, S>
where
    L: Eq + Hash,
    S: BuildHasher,
{
    /// Creates a header holding the labels `0..len` that uses the given hasher. The header stops
    /// at the first position that `L` cannot represent.
    pub fn range_with_hasher(len: usize, hash_builder: S) -> Self
    where
        L: TryFrom<usize>,
    {
        let mut digest = Self::with_hasher(hash_builder);
        digest.extend((0..len).map_while(|i| L::try_from(i).ok()));
        digest
    }

    /// Creates a header out of an explicit list of labels. The labels must be distinct; `axis` is
    /// only used to report a duplicate.
    pub fn from_labels_with_hasher<I>(axis: usize, labels: I, hash_builder: S) -> Result<Self, L>
    where
        I: IntoIterator<Item = L>,
    {
        let mut digest = Self::with_hasher(hash_builder);
        for label in labels {
            if digest.position(&label).is_some() {
                return Err(MultiDictError::DuplicateLabel { axis, label });
            }
            digest.insert(label);
        }
        Ok(digest)
    }

    /// Returns the position of the label, if it is in the header
    pub fn position(&self, label: &L) -> Option<usize> {
        let hash = make_hash::<L, S>(&self.hash_builder, label);
        self.lookup
            .get(hash, equivalent_label(label, &self.labels))
            .copied()
    }

    /// Returns true if the label is in the header
    pub fn contains(&self, label: &L) -> bool {
        self.position(label).is_some()
    }

    /// Returns the position of the label on the given axis. Reads never insert, so a missing
    /// label is an error.
    pub fn index_of(&self, axis: usize, label: &L) -> Result<usize, L>
    where
        L: Clone,
    {
        self.position(label)
            .ok_or_else(|| MultiDictError::LabelNotFound {
                axis,
                label: label.clone(),
            })
    }

    /// Returns the position of the label, appending it to the end of the header if it is not
    /// already present.
    pub fn insert(&mut self, label: L) -> usize {
        let hash = make_hash::<L, S>(&self.hash_builder, &label);
        if let Some(pos) = self.lookup.get(hash, equivalent_label(&label, &self.labels)) {
            return *pos;
        }
        let pos = self.labels.len();
        self.labels.push(label);
        self.lookup.insert(
            hash,
            pos,
            make_position_hasher::<L, S>(&self.hash_builder, &self.labels),
        );
        trace!("appended a label at position {pos}");
        pos
    }

    /// Resolves a range of labels into the positions it covers.
    ///
    /// A missing `start` is the beginning of the header and a missing `stop` is its end. The
    /// `stop` position is excluded. A negative `step` walks downward from `start` to `stop`.
    pub fn resolve_range(
        &self,
        axis: usize,
        start: Option<&L>,
        stop: Option<&L>,
        step: isize,
    ) -> Result<Vec<usize>, L>
    where
        L: Clone,
    {
        self.resolve_range_within(axis, start, stop, step, self.len())
    }

    // Same as `resolve_range`, but an open `stop` is placed at `len`. Used to ask whether a range
    // would cover a label that is about to be appended.
    pub(crate) fn resolve_range_within(
        &self,
        axis: usize,
        start: Option<&L>,
        stop: Option<&L>,
        step: isize,
        len: usize,
    ) -> Result<Vec<usize>, L>
    where
        L: Clone,
    {
        if step == 0 {
            return Err(MultiDictError::ZeroStep { axis });
        }
        let start = match start {
            Some(l) => self.index_of(axis, l)?,
            None => 0,
        };
        let stop = match stop {
            Some(l) => self.index_of(axis, l)?,
            None => len,
        };
        Ok(stepped(start, stop, step))
    }

    /// Resolves each label into its position, preserving order
    pub fn resolve_many(&self, axis: usize, labels: &[L]) -> Result<Vec<usize>, L>
    where
        L: Clone,
    {
        labels.iter().map(|l| self.index_of(axis, l)).collect()
    }

    /// Resolves each label into its position, appending the missing ones
    pub fn insert_many(&mut self, labels: &[L]) -> Vec<usize>
    where
        L: Clone,
    {
        labels.iter().map(|l| self.insert(l.clone())).collect()
    }

    /// Creates a new header holding the labels at the given positions, in the given order
    pub(crate) fn restrict(&self, positions: &[usize]) -> Self
    where
        L: Clone,
        S: Clone,
    {
        let mut digest = Self::with_hasher(self.hash_builder.clone());
        for pos in positions {
            if let Some(label) = self.labels.get(*pos) {
                digest.insert(label.clone());
            }
        }
        digest
    }
}

fn stepped(start: usize, stop: usize, step: isize) -> Vec<usize> {
    if step > 0 {
        (start..stop).step_by(step as usize).collect()
    } else {
        let mut digest = Vec::new();
        let mut i = start as isize;
        while i > stop as isize {
            digest.push(i as usize);
            i += step;
        }
        digest
    }
}

impl<L, S> Clone for AxisHeader<L, S>
where
    L: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hash_builder: self.hash_builder.clone(),
            labels: self.labels.clone(),
            lookup: self.lookup.clone(),
        }
    }
}

impl<L, S> Default for AxisHeader<L, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<L, S> fmt::Debug for AxisHeader<L, S>
where
    L: fmt::Debug,
{
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_list().entries(self.labels.iter()).finish()
    }
}

impl<L, S> PartialEq for AxisHeader<L, S>
where
    L: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl<L: Eq, S> Eq for AxisHeader<L, S> {}

impl<L, S> Extend<L> for AxisHeader<L, S>
where
    L: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = L>>(&mut self, iter: T) {
        for label in iter {
            self.insert(label);
        }
    }
}

impl<L> FromIterator<L> for AxisHeader<L>
where
    L: Eq + Hash,
{
    fn from_iter<T: IntoIterator<Item = L>>(iter: T) -> Self {
        let mut digest = AxisHeader::default();
        digest.extend(iter);
        digest
    }
}

/// An iterator over the labels of an [`AxisHeader`], in position order.
pub struct HeaderIter<'a, L> {
    iter: std::slice::Iter<'a, L>,
}

impl<L> Clone for HeaderIter<'_, L> {
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
        }
    }
}

impl<L> fmt::Debug for HeaderIter<'_, L>
where
    L: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, L> Iterator for HeaderIter<'a, L> {
    type Item = &'a L;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<L> DoubleEndedIterator for HeaderIter<'_, L> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl<L> ExactSizeIterator for HeaderIter<'_, L> {
    fn len(&self) -> usize {
        self.iter.len()
    }
}

impl<L> FusedIterator for HeaderIter<'_, L> {}

impl<'a, L, S> IntoIterator for &'a AxisHeader<L, S> {
    type Item = &'a L;
    type IntoIter = HeaderIter<'a, L>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
