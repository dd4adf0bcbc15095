use std::{
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::hash_map::DefaultHashBuilder;

use crate::{label::Label, view::View};

/// The result of indexing a [`MultiDict`]: either the value under a concrete key, or a [`View`]
/// over a partial one.
///
/// # Examples
/// ```rust
/// use multi_dict::{key, MultiDict, Selected};
///
/// let m: MultiDict<i32> = MultiDict::from_nested(vec![vec![12, 13], vec![25, 34]]).unwrap();
///
/// match m.get(key![0]).unwrap() {
///     Selected::Value(v) => { /*...*/ },
///     Selected::View(view) => assert_eq!(view.value(key![1]), Ok(&13)),
/// }
/// ```
///
/// [`MultiDict`]: crate::MultiDict
pub enum Selected<'a, V, L = Label, S = DefaultHashBuilder> {
    /// A single stored value
    Value(&'a V),
    /// A deferred selection of several values
    View(View<'a, V, L, S>),
}

impl<'a, V, L, S> Selected<'a, V, L, S> {
    /// Returns true if a single value was selected
    pub fn is_value(&self) -> bool {
        matches!(self, Selected::Value(_))
    }

    /// Returns the negation of [`is_value`]
    ///
    /// [`is_value`]: enum.Selected.html#method.is_value
    pub fn is_view(&self) -> bool {
        !self.is_value()
    }

    /// Returns the selected value, if a single value was selected
    pub fn value(&self) -> Option<&'a V> {
        match self {
            Selected::Value(v) => Some(*v),
            Selected::View(_) => None,
        }
    }

    /// Consumes the selection and returns the view, if several values were selected
    pub fn into_view(self) -> Option<View<'a, V, L, S>> {
        match self {
            Selected::Value(_) => None,
            Selected::View(view) => Some(view),
        }
    }

    /// Maps the selected value or the view into a common type, consuming the selection
    pub fn map<T, VF, WF>(self, value: VF, view: WF) -> T
    where
        VF: FnOnce(&'a V) -> T,
        WF: FnOnce(View<'a, V, L, S>) -> T,
    {
        match self {
            Selected::Value(v) => value(v),
            Selected::View(w) => view(w),
        }
    }
}

impl<V, L, S> Clone for Selected<'_, V, L, S>
where
    L: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Selected::Value(v) => Selected::Value(*v),
            Selected::View(view) => Selected::View(view.clone()),
        }
    }
}

impl<V, L, S> fmt::Debug for Selected<'_, V, L, S>
where
    V: fmt::Debug + Clone,
    L: fmt::Debug + Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selected::Value(v) => write!(f, "Value( {v:?} )"),
            Selected::View(view) => write!(f, "View( {view:?} )"),
        }
    }
}
