use std::{
    fmt,
    hash::{BuildHasher, Hash},
};

use hashbrown::hash_map::DefaultHashBuilder;
use log::trace;

use crate::{
    error::{MultiDictError, Result},
    key::{AxisKey, Key},
    label::Label,
    multi_dict::MultiDict,
    nested::Nested,
    selected::Selected,
    view::View,
};

/// A [`MultiDict`] whose axes carry names, so that it can be indexed by keyword.
///
/// A keyword key is a list of `(name, token)` pairs, most easily built with [`named_key!`]. Axes
/// that are not named in a key select everything, so the order in which axes are narrowed does
/// not matter.
///
/// # Examples
/// ```rust
/// use multi_dict::{named_key, Label, NamedMultiDict};
///
/// let n: NamedMultiDict<i32> = NamedMultiDict::from_nested_with_headers(
///     vec![vec![12, 13], vec![25, 34], vec![56, 89]],
///     vec![vec![Label::from(1), Label::from(2), Label::from(3)], vec!["A".into(), "B".into()]],
///     ["row", "column"],
/// )
/// .unwrap();
///
/// assert_eq!(n.value(named_key!(row = 2, column = "B")), Ok(&34));
/// assert_eq!(n.value(named_key!(column = "B", row = 2)), Ok(&34));
///
/// let row = n.get(named_key!(row = 2)).unwrap().into_view().unwrap();
/// assert_eq!(row.axis_names(), vec!["column"]);
/// assert_eq!(row.value(named_key!(column = "B")), Ok(&34));
/// ```
///
/// [`named_key!`]: macro@crate::named_key
#[derive(Clone)]
pub struct NamedMultiDict<V, L = Label, S = DefaultHashBuilder> {
    inner: MultiDict<V, L, S>,
    axis_names: Option<Vec<String>>,
}

/// The result of indexing a [`NamedMultiDict`] by keyword
pub enum NamedSelected<'a, V, L = Label, S = DefaultHashBuilder> {
    /// A single stored value
    Value(&'a V),
    /// A deferred selection that can be narrowed by the names of its remaining axes
    View(NamedView<'a, V, L, S>),
}

/// A [`View`] whose unresolved axes keep their names.
pub struct NamedView<'a, V, L = Label, S = DefaultHashBuilder> {
    view: View<'a, V, L, S>,
    names: Option<&'a [String]>,
}

impl<V, L> NamedMultiDict<V, L, DefaultHashBuilder> {
    /// Creates an empty map with neither an arity nor axis names
    pub fn new() -> Self {
        Self {
            inner: MultiDict::new(),
            axis_names: None,
        }
    }

    /// Creates an empty map whose arity is taken from its first positional write. Names can be
    /// given afterwards with [`set_axis_names`].
    ///
    /// [`set_axis_names`]: struct.NamedMultiDict.html#method.set_axis_names
    pub fn inferring() -> Self {
        Self {
            inner: MultiDict::inferring(),
            axis_names: None,
        }
    }
}

impl<V, L> NamedMultiDict<V, L, DefaultHashBuilder>
where
    L: Eq + Hash + Clone,
{
    /// Creates an empty map with one axis per name
    pub fn with_names<I, N>(names: I) -> Result<Self, L>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::from_multi_dict(MultiDict::new(), names)
    }

    /// Builds a map out of nested lists and explicit headers, naming the axes in order. See
    /// [`MultiDict::from_nested_with_headers`].
    pub fn from_nested_with_headers<D, I, N>(
        data: D,
        headers: Vec<Vec<L>>,
        names: I,
    ) -> Result<Self, L>
    where
        D: Into<Nested<V>>,
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::from_multi_dict(MultiDict::from_nested_with_headers(data, headers)?, names)
    }
}

impl<V, L, S> NamedMultiDict<V, L, S>
where
    L: Eq + Hash,
    S: BuildHasher,
{
    /// Names the axes of an existing map. A map without an arity takes the number of names as
    /// its arity.
    pub fn from_multi_dict<I, N>(inner: MultiDict<V, L, S>, names: I) -> Result<Self, L>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
        S: Clone,
    {
        let mut digest = Self {
            inner,
            axis_names: None,
        };
        digest.set_axis_names(names)?;
        Ok(digest)
    }

    /// Replaces the names of the axes. There must be one distinct name per axis.
    pub fn set_axis_names<I, N>(&mut self, names: I) -> Result<(), L>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
        S: Clone,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(MultiDictError::DuplicateAxisName(name.clone()));
            }
        }
        match self.inner.arity() {
            Some(arity) if arity != names.len() => {
                return Err(MultiDictError::AxisNameCount {
                    expected: arity,
                    found: names.len(),
                })
            }
            Some(_) => {}
            None => self.inner.establish_arity(names.len())?,
        }
        trace!("named the axes {names:?}");
        self.axis_names = Some(names);
        Ok(())
    }

    /// Indexes the map by keyword. Naming every axis yields the stored value; otherwise a
    /// [`NamedView`] over the remaining axes is returned.
    pub fn get<I, N>(&self, named: I) -> Result<NamedSelected<'_, V, L, S>, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        L: Clone,
    {
        let key = self.to_positional(named)?;
        let names = self.axis_names.as_deref();
        Ok(NamedSelected::wrap(self.inner.get(key)?, names))
    }

    /// Returns the value stored under a keyword key that names every axis
    pub fn value<I, N>(&self, named: I) -> Result<&V, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        L: Clone,
    {
        let key = self.to_positional(named)?;
        self.inner.value(key)
    }

    /// Sets the value under a keyword key that names every axis, returning the value it replaces
    pub fn set<I, N>(&mut self, named: I, value: V) -> Result<Option<V>, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        S: Clone,
    {
        let key = self.to_positional(named)?;
        self.inner.set(key, value)
    }

    /// Returns true if a value is stored under the keyword key
    pub fn contains<I, N>(&self, named: I) -> bool
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        L: Clone,
    {
        match self.to_positional(named) {
            Ok(key) => self.inner.contains(key),
            Err(_) => false,
        }
    }

    /// Materializes the keyword selection into a new map. Axes given a single label are
    /// dropped along with their names; the other axes keep theirs.
    pub fn reduce<I, N>(&self, named: I) -> Result<Self, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        V: Clone,
        L: Clone,
        S: Clone,
    {
        let key = self.to_positional(named)?;
        let axis_names = self.axis_names.as_ref().map(|names| {
            names
                .iter()
                .zip(key.tokens())
                .filter(|(_, token)| !token.is_concrete())
                .map(|(name, _)| name.clone())
                .collect()
        });
        Ok(Self {
            inner: self.inner.reduce(key)?,
            axis_names,
        })
    }

    /// Returns a copy of this map with every entry of `other` written into it. The names of
    /// `self` are kept; a map without names takes those of `other`.
    pub fn merge<S2>(&self, other: &NamedMultiDict<V, L, S2>) -> Result<Self, L>
    where
        V: Clone,
        L: Clone,
        S: Clone,
    {
        Ok(Self {
            inner: self.inner.merge(&other.inner)?,
            axis_names: self
                .axis_names
                .clone()
                .or_else(|| other.axis_names.clone()),
        })
    }

    /// Returns a new map with the same names, headers and coordinates where every value is
    /// passed through `f`
    pub fn map_values<W, F>(&self, f: F) -> NamedMultiDict<W, L, S>
    where
        F: FnMut(&V) -> W,
        L: Clone,
        S: Clone,
    {
        NamedMultiDict {
            inner: self.inner.map_values(f),
            axis_names: self.axis_names.clone(),
        }
    }

    // Every axis left unnamed by the keyword key selects everything.
    fn to_positional<I, N>(&self, named: I) -> Result<Key<L>, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
    {
        let names = self.axis_names.as_deref().unwrap_or(&[]);
        by_name(names, named)
    }
}

impl<V, L, S> NamedMultiDict<V, L, S> {
    /// Returns the names of the axes, if they have been given
    pub fn axis_names(&self) -> Option<&[String]> {
        self.axis_names.as_deref()
    }

    /// Returns the underlying map for positional access
    pub fn as_multi_dict(&self) -> &MultiDict<V, L, S> {
        &self.inner
    }

    /// Returns the underlying map mutably for positional access
    pub fn as_multi_dict_mut(&mut self) -> &mut MultiDict<V, L, S> {
        &mut self.inner
    }

    /// Consumes the map and returns the underlying positional map
    pub fn into_inner(self) -> MultiDict<V, L, S> {
        self.inner
    }

    /// Returns the number of stored values
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no values are stored
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<'a, V, L, S> NamedSelected<'a, V, L, S> {
    fn wrap(selected: Selected<'a, V, L, S>, names: Option<&'a [String]>) -> Self {
        match selected {
            Selected::Value(v) => NamedSelected::Value(v),
            Selected::View(view) => NamedSelected::View(NamedView { view, names }),
        }
    }

    /// Returns true if a single value was selected
    pub fn is_value(&self) -> bool {
        matches!(self, NamedSelected::Value(_))
    }

    /// Returns true if several values were selected
    pub fn is_view(&self) -> bool {
        !self.is_value()
    }

    /// Returns the selected value, if a single value was selected
    pub fn value(&self) -> Option<&'a V> {
        match self {
            NamedSelected::Value(v) => Some(*v),
            NamedSelected::View(_) => None,
        }
    }

    /// Consumes the selection and returns the view, if several values were selected
    pub fn into_view(self) -> Option<NamedView<'a, V, L, S>> {
        match self {
            NamedSelected::Value(_) => None,
            NamedSelected::View(view) => Some(view),
        }
    }
}

impl<'a, V, L, S> NamedView<'a, V, L, S> {
    /// Returns the names of the axes the view has not resolved yet
    pub fn axis_names(&self) -> Vec<&'a str> {
        let names = match self.names {
            Some(names) => names,
            None => return Vec::new(),
        };
        self.view
            .unresolved_axes()
            .into_iter()
            .filter_map(|axis| names.get(axis).map(String::as_str))
            .collect()
    }

    /// Returns the positional view underneath
    pub fn as_view(&self) -> &View<'a, V, L, S> {
        &self.view
    }
}

impl<'a, V, L, S> NamedView<'a, V, L, S>
where
    L: Eq + Hash + Clone,
    S: BuildHasher,
{
    /// Indexes the view by the names of its remaining axes
    pub fn get<I, N>(&self, named: I) -> Result<NamedSelected<'a, V, L, S>, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
    {
        let subkey = by_name(&self.axis_names(), named)?;
        Ok(NamedSelected::wrap(self.view.get(subkey)?, self.names))
    }

    /// Returns the value under a keyword key that names every remaining axis
    pub fn value<I, N>(&self, named: I) -> Result<&'a V, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
    {
        let subkey = by_name(&self.axis_names(), named)?;
        self.view.value(subkey)
    }

    /// Returns true if the keyword key lies inside the view and addresses a stored value
    pub fn contains<I, N>(&self, named: I) -> bool
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
    {
        match by_name(&self.axis_names(), named) {
            Ok(subkey) => self.view.contains(subkey),
            Err(_) => false,
        }
    }

    /// Narrows the view by keyword and materializes it into a new map that keeps the names of
    /// the axes left unresolved.
    ///
    /// # Examples
    /// ```rust
    /// use multi_dict::{named_key, Label, NamedMultiDict};
    ///
    /// let n: NamedMultiDict<i32> = NamedMultiDict::from_nested_with_headers(
    ///     vec![vec![12, 13], vec![25, 34], vec![56, 89]],
    ///     vec![vec![Label::from(1), Label::from(2), Label::from(3)], vec!["A".into(), "B".into()]],
    ///     ["row", "column"],
    /// )
    /// .unwrap();
    ///
    /// let outer = n.get(named_key!(row = [1, 3])).unwrap().into_view().unwrap();
    /// let reduced = outer.reduce(named_key!()).unwrap();
    /// assert_eq!(reduced.axis_names(), Some(&["row".to_owned(), "column".to_owned()][..]));
    /// assert_eq!(reduced.value(named_key!(row = 1, column = "B")), Ok(&13));
    /// ```
    pub fn reduce<I, N>(&self, named: I) -> Result<NamedMultiDict<V, L, S>, L>
    where
        I: IntoIterator<Item = (N, AxisKey<L>)>,
        N: AsRef<str>,
        V: Clone,
        S: Clone,
    {
        let subkey = by_name(&self.axis_names(), named)?;
        let narrowed = self.view.narrow(subkey)?;
        let axis_names = self.names.map(|names| {
            narrowed
                .unresolved_axes()
                .into_iter()
                .filter_map(|axis| names.get(axis).cloned())
                .collect()
        });
        Ok(NamedMultiDict {
            inner: narrowed.to_multi_dict()?,
            axis_names,
        })
    }
}

// Orders the tokens of a keyword key by the position of their names. Unnamed axes select
// everything.
fn by_name<L, T, I, N>(names: &[T], named: I) -> Result<Key<L>, L>
where
    T: AsRef<str>,
    I: IntoIterator<Item = (N, AxisKey<L>)>,
    N: AsRef<str>,
{
    let mut tokens: Vec<Option<AxisKey<L>>> = names.iter().map(|_| None).collect();
    for (name, token) in named {
        let name = name.as_ref();
        let axis = names
            .iter()
            .position(|n| n.as_ref() == name)
            .ok_or_else(|| MultiDictError::UnknownAxisName(name.to_owned()))?;
        if tokens[axis].is_some() {
            return Err(MultiDictError::DuplicateAxisName(name.to_owned()));
        }
        tokens[axis] = Some(token);
    }
    Ok(tokens.into_iter().map(Option::unwrap_or_default).collect())
}

impl<V, L> Default for NamedMultiDict<V, L, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, L, S> PartialEq for NamedMultiDict<V, L, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.axis_names == other.axis_names && self.inner == other.inner
    }
}

impl<V, L, S> Eq for NamedMultiDict<V, L, S>
where
    V: Eq,
    S: BuildHasher,
{
}

impl<V, L, S> fmt::Debug for NamedMultiDict<V, L, S>
where
    V: fmt::Debug,
    L: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedMultiDict")
            .field("axis_names", &self.axis_names)
            .field("values", &self.inner)
            .finish()
    }
}

impl<V, L, S> Clone for NamedView<'_, V, L, S>
where
    L: Clone,
{
    fn clone(&self) -> Self {
        Self {
            view: self.view.clone(),
            names: self.names,
        }
    }
}

impl<V, L, S> fmt::Debug for NamedView<'_, V, L, S>
where
    V: fmt::Debug + Clone,
    L: fmt::Debug + Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedView")
            .field("axis_names", &self.axis_names())
            .field("values", &self.view)
            .finish()
    }
}

impl<V, L, S> Clone for NamedSelected<'_, V, L, S>
where
    L: Clone,
{
    fn clone(&self) -> Self {
        match self {
            NamedSelected::Value(v) => NamedSelected::Value(*v),
            NamedSelected::View(view) => NamedSelected::View(view.clone()),
        }
    }
}

impl<V, L, S> fmt::Debug for NamedSelected<'_, V, L, S>
where
    V: fmt::Debug + Clone,
    L: fmt::Debug + Eq + Hash + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamedSelected::Value(v) => write!(f, "Value( {v:?} )"),
            NamedSelected::View(view) => write!(f, "View( {view:?} )"),
        }
    }
}
