use std::{
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::{hash_map::DefaultHashBuilder, HashSet};

use crate::{
    error::{MultiDictError, Result},
    header::AxisHeader,
    key::{AxisKey, Key},
    label::Label,
    multi_dict::MultiDict,
    nested::Nested,
    selected::Selected,
    translate::resolve_token,
};

/// A deferred, partially indexed projection of a [`MultiDict`].
///
/// A view keeps the key it was created with, one token per axis, and borrows its source map.
/// Nothing is copied until the view is reduced. Axes whose token names a single label are
/// resolved; the others are unresolved, and further indexing fills them in from left to right.
///
/// A token given to a view must stay inside the selection the view already makes on that axis:
/// a view over rows `[1, 3]` can be narrowed to row `3` but not to row `2`. A full-axis wildcard
/// leaves the axis as it is.
///
/// # Examples
/// ```rust
/// use multi_dict::{key, Label, MultiDict, MultiDictError};
///
/// let m: MultiDict<i32> = MultiDict::from_nested_with_headers(
///     vec![vec![12, 13], vec![25, 34], vec![56, 89]],
///     vec![vec![Label::from(1), Label::from(2), Label::from(3)], vec!["A".into(), "B".into()]],
/// )
/// .unwrap();
///
/// let view = m.view(key![[1, 3]]).unwrap();
/// assert_eq!(view.unresolved_axes(), vec![0, 1]);
/// assert_eq!(view.value(key![3, "A"]), Ok(&56));
/// assert_eq!(
///     view.value(key![2, "A"]),
///     Err(MultiDictError::ViewConstraintViolation { axis: 0, label: Label::from(2) })
/// );
///
/// // Axes are filled in left to right; the wildcard keeps the row selection
/// let column = view.narrow(key![.., "B"]).unwrap();
/// assert_eq!(column, vec![13, 89]);
/// ```
pub struct View<'a, V, L = Label, S = DefaultHashBuilder> {
    source: &'a MultiDict<V, L, S>,
    key: Key<L>,
}

/// A [`View`] that can write through to its source map.
///
/// Reads behave exactly like a `View`. The key is resolved again on every access, so labels
/// appended through the view are visible to it right away.
pub struct ViewMut<'a, V, L = Label, S = DefaultHashBuilder> {
    source: &'a mut MultiDict<V, L, S>,
    key: Key<L>,
}

impl<'a, V, L, S> View<'a, V, L, S> {
    pub(crate) fn new(source: &'a MultiDict<V, L, S>, key: Key<L>) -> Self {
        Self { source, key }
    }

    /// Returns the key of the view, one token per axis of the source
    pub fn key(&self) -> &Key<L> {
        &self.key
    }

    /// Returns the map the view projects
    pub fn source(&self) -> &'a MultiDict<V, L, S> {
        self.source
    }

    /// Returns the axes of the source that the view has not resolved to a single label
    pub fn unresolved_axes(&self) -> Vec<usize> {
        unresolved(&self.key)
    }
}

impl<'a, V, L, S> View<'a, V, L, S>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Fills the unresolved axes with the tokens of `subkey` and returns the resulting view
    pub fn narrow<K: Into<Key<L>>>(&self, subkey: K) -> Result<View<'a, V, L, S>, L> {
        let key = merge_subkey(&self.source.headers, &self.key, subkey.into(), false)?;
        Ok(View::new(self.source, key))
    }

    /// Indexes the view. If the subkey resolves every remaining axis, the stored value is
    /// returned; otherwise a narrower view is.
    pub fn get<K: Into<Key<L>>>(&self, subkey: K) -> Result<Selected<'a, V, L, S>, L> {
        let narrowed = self.narrow(subkey)?;
        self.source.get(narrowed.key)
    }

    /// Returns the value under the subkey, which must resolve every remaining axis
    pub fn value<K: Into<Key<L>>>(&self, subkey: K) -> Result<&'a V, L> {
        let narrowed = self.narrow(subkey)?;
        self.source.value(narrowed.key)
    }

    /// Returns true if the subkey lies inside the view and addresses a stored value
    pub fn contains<K: Into<Key<L>>>(&self, subkey: K) -> bool {
        match self.narrow(subkey) {
            Ok(narrowed) => self.source.contains(narrowed.key),
            Err(_) => false,
        }
    }

    /// Fills the unresolved axes with the tokens of `subkey` and materializes the result into a
    /// new map. See [`MultiDict::reduce`].
    pub fn reduce<K: Into<Key<L>>>(&self, subkey: K) -> Result<MultiDict<V, L, S>, L>
    where
        V: Clone,
        S: Clone,
    {
        let narrowed = self.narrow(subkey)?;
        self.source.reduce(narrowed.key)
    }

    /// Materializes the view as it stands into a new map
    pub fn to_multi_dict(&self) -> Result<MultiDict<V, L, S>, L>
    where
        V: Clone,
        S: Clone,
    {
        self.source.reduce(self.key.clone())
    }
}

impl<'a, V, L, S> ViewMut<'a, V, L, S> {
    pub(crate) fn new(source: &'a mut MultiDict<V, L, S>, key: Key<L>) -> Self {
        Self { source, key }
    }

    /// Returns the key of the view, one token per axis of the source
    pub fn key(&self) -> &Key<L> {
        &self.key
    }

    /// Returns the axes of the source that the view has not resolved to a single label
    pub fn unresolved_axes(&self) -> Vec<usize> {
        unresolved(&self.key)
    }

    /// Returns a read-only view making the same selection
    pub fn as_view(&self) -> View<'_, V, L, S>
    where
        L: Clone,
    {
        View::new(&*self.source, self.key.clone())
    }
}

impl<'a, V, L, S> ViewMut<'a, V, L, S>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Indexes the view. See [`View::get`].
    pub fn get<K: Into<Key<L>>>(&self, subkey: K) -> Result<Selected<'_, V, L, S>, L> {
        let key = merge_subkey(&self.source.headers, &self.key, subkey.into(), false)?;
        self.source.get(key)
    }

    /// Returns the value under the subkey. See [`View::value`].
    pub fn value<K: Into<Key<L>>>(&self, subkey: K) -> Result<&V, L> {
        let key = merge_subkey(&self.source.headers, &self.key, subkey.into(), false)?;
        self.source.value(key)
    }

    /// Writes a value through the view. The subkey, merged into the view's key, must give every
    /// axis a single label.
    ///
    /// A label that the source has not seen yet is accepted only on an axis whose selection
    /// would cover it once appended, i.e. a range that is open at its end.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{key, MultiDict};
    ///
    /// let mut m: MultiDict<i32> = MultiDict::from_flat([(key!["x", 1], 10)]).unwrap();
    /// let mut row = m.view_mut(key!["x"]).unwrap();
    /// row.set(key![2], 20).unwrap();
    /// assert_eq!(row.value(key![2]), Ok(&20));
    /// assert_eq!(m.shape(), vec![1, 2]);
    /// ```
    pub fn set<K: Into<Key<L>>>(&mut self, subkey: K, value: V) -> Result<Option<V>, L>
    where
        S: Clone,
    {
        let key = merge_subkey(&self.source.headers, &self.key, subkey.into(), true)?;
        self.source.set(key, value)
    }

    /// Materializes the view, narrowed by `subkey`, into a new map. See [`View::reduce`].
    pub fn reduce<K: Into<Key<L>>>(&self, subkey: K) -> Result<MultiDict<V, L, S>, L>
    where
        V: Clone,
        S: Clone,
    {
        let key = merge_subkey(&self.source.headers, &self.key, subkey.into(), false)?;
        self.source.reduce(key)
    }
}

pub(crate) fn unresolved<L>(key: &Key<L>) -> Vec<usize> {
    key.tokens()
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_concrete())
        .map(|(axis, _)| axis)
        .collect()
}

// Places the subkey's tokens onto the unresolved axes of `key`, checking each against the
// selection it replaces.
pub(crate) fn merge_subkey<L, S>(
    headers: &[AxisHeader<L, S>],
    key: &Key<L>,
    subkey: Key<L>,
    write: bool,
) -> Result<Key<L>, L>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    let open = unresolved(key);
    if subkey.len() > open.len() {
        return Err(MultiDictError::ArityMismatch {
            expected: open.len(),
            found: subkey.len(),
        });
    }
    let mut tokens = key.tokens().to_vec();
    for (token, axis) in subkey.into_iter().zip(open) {
        if token.is_full() {
            continue;
        }
        let header = &headers[axis];
        let admitted: HashSet<usize> = resolve_token(header, axis, &tokens[axis])?
            .positions()
            .iter()
            .copied()
            .collect();
        let violation = |label: &L| MultiDictError::ViewConstraintViolation {
            axis,
            label: label.clone(),
        };
        match &token {
            AxisKey::Label(label) => match header.position(label) {
                Some(pos) if admitted.contains(&pos) => {}
                Some(_) => return Err(violation(label)),
                None if write => {
                    if !admits_append(header, axis, &tokens[axis])? {
                        return Err(violation(label));
                    }
                }
                None => {
                    return Err(MultiDictError::LabelNotFound {
                        axis,
                        label: label.clone(),
                    })
                }
            },
            AxisKey::Many(labels) => {
                for label in labels {
                    if !admitted.contains(&header.index_of(axis, label)?) {
                        return Err(violation(label));
                    }
                }
            }
            AxisKey::Range { start, stop, step } => {
                let positions =
                    header.resolve_range(axis, start.as_ref(), stop.as_ref(), *step)?;
                for pos in positions {
                    if !admitted.contains(&pos) {
                        if let Some(label) = header.label(pos) {
                            return Err(violation(label));
                        }
                    }
                }
            }
        }
        tokens[axis] = token;
    }
    Ok(Key::new(tokens))
}

// A label about to be appended lands at `header.len()`; only a range open at its end can cover it.
fn admits_append<L, S>(header: &AxisHeader<L, S>, axis: usize, token: &AxisKey<L>) -> Result<bool, L>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    match token {
        AxisKey::Range {
            start,
            stop: None,
            step,
        } if *step > 0 => {
            let len = header.len();
            let positions = header.resolve_range_within(axis, start.as_ref(), None, *step, len + 1)?;
            Ok(positions.contains(&len))
        }
        _ => Ok(false),
    }
}

impl<V, L, S> Clone for View<'_, V, L, S>
where
    L: Clone,
{
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            key: self.key.clone(),
        }
    }
}

impl<V, L, S> fmt::Debug for View<'_, V, L, S>
where
    V: fmt::Debug + Clone,
    L: fmt::Debug + Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_multi_dict() {
            Ok(reduced) => reduced.fmt(f),
            Err(_) => f.debug_struct("View").field("key", &self.key).finish(),
        }
    }
}

impl<V, L, S> fmt::Debug for ViewMut<'_, V, L, S>
where
    L: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewMut").field("key", &self.key).finish()
    }
}

/// Views compare by the maps they reduce to.
impl<V, L, S> PartialEq for View<'_, V, L, S>
where
    V: PartialEq + Clone,
    L: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Self) -> bool {
        match (self.to_multi_dict(), other.to_multi_dict()) {
            (Ok(this), Ok(that)) => this == that,
            _ => false,
        }
    }
}

impl<V, L, S> PartialEq<MultiDict<V, L, S>> for View<'_, V, L, S>
where
    V: PartialEq + Clone,
    L: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &MultiDict<V, L, S>) -> bool {
        self.to_multi_dict().map_or(false, |this| this == *other)
    }
}

impl<V, L, S> PartialEq<Nested<V>> for View<'_, V, L, S>
where
    V: PartialEq + Clone,
    L: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Nested<V>) -> bool {
        self.to_multi_dict().map_or(false, |this| this == *other)
    }
}

impl<V, L, S> PartialEq<Vec<V>> for View<'_, V, L, S>
where
    V: PartialEq + Clone,
    L: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Vec<V>) -> bool {
        self.to_multi_dict().map_or(false, |this| this == *other)
    }
}

impl<V, L, S> PartialEq<Vec<Vec<V>>> for View<'_, V, L, S>
where
    V: PartialEq + Clone,
    L: Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn eq(&self, other: &Vec<Vec<V>>) -> bool {
        self.to_multi_dict().map_or(false, |this| this == *other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key;

    fn letters() -> Vec<AxisHeader> {
        vec![["A", "B", "C", "D"].into_iter().map(Label::from).collect()]
    }

    #[test]
    fn merge_fills_unresolved_axes_test() {
        let headers = vec![
            [1, 2].into_iter().map(Label::from).collect(),
            ["x"].into_iter().map(Label::from).collect(),
            ["A", "B"].into_iter().map(Label::from).collect(),
        ];
        let key: Key = key![.., "x", ..];
        assert_eq!(unresolved(&key), vec![0, 2]);
        let merged = merge_subkey(&headers, &key, key![2, "B"], false).unwrap();
        assert_eq!(merged, key![2, "x", "B"]);
        let merged = merge_subkey(&headers, &key, key![.., "A"], false).unwrap();
        assert_eq!(merged, key![.., "x", "A"]);
        assert_eq!(
            merge_subkey(&headers, &key, key![1, "A", "x"], false),
            Err(MultiDictError::ArityMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn merge_checks_constraints_test() {
        let headers = letters();
        let key: Key = key!["B".."D"];
        assert!(merge_subkey(&headers, &key, key!["C"], false).is_ok());
        assert!(merge_subkey(&headers, &key, key![["B", "C"]], false).is_ok());
        assert!(merge_subkey(&headers, &key, key!["C"..], false).is_err());
        assert_eq!(
            merge_subkey(&headers, &key, key!["A"], false),
            Err(MultiDictError::ViewConstraintViolation {
                axis: 0,
                label: Label::from("A")
            })
        );
        assert_eq!(
            merge_subkey(&headers, &key, key!["Z"], false),
            Err(MultiDictError::LabelNotFound {
                axis: 0,
                label: Label::from("Z")
            })
        );
    }

    #[test]
    fn appends_through_open_ranges_test() {
        let headers = letters();
        let new_label: Key = key!["E"];
        assert!(merge_subkey(&headers, &key![..], new_label.clone(), true).is_ok());
        assert!(merge_subkey(&headers, &key!["C"..], new_label.clone(), true).is_ok());
        assert!(merge_subkey(&headers, &key![.."C"], new_label.clone(), true).is_err());
        assert!(merge_subkey(&headers, &key![["A", "B"]], new_label.clone(), true).is_err());
        // Position 4 is not on the stride of a range starting at 1 with a step of 2
        let strided: Key = key![AxisKey::from("B"..).with_step(2)];
        assert!(merge_subkey(&headers, &strided, new_label, true).is_err());
    }
}
