use std::{
    fmt,
    ops::{Range, RangeFrom, RangeFull, RangeTo},
};

use crate::label::Label;

/// The token used to index a single axis of a [`MultiDict`].
///
/// An `AxisKey` either names exactly one label, lists several labels, or describes a range of
/// positions between two labels. Only keys made entirely of [`AxisKey::Label`] tokens address a
/// single value; any other token turns the lookup into a partial index, which yields a [`View`].
///
/// For the default [`Label`] type, tokens convert from plain literals and Rust ranges:
///
/// # Examples
/// ```rust
/// use multi_dict::{AxisKey, Label};
///
/// let one: AxisKey = "A".into();
/// assert_eq!(one, AxisKey::Label(Label::from("A")));
///
/// let many: AxisKey = vec![1, 3].into();
/// assert_eq!(many, AxisKey::Many(vec![Label::from(1), Label::from(3)]));
///
/// let all: AxisKey = (..).into();
/// assert!(all.is_full());
///
/// let upto: AxisKey = (.."C").into();
/// assert_eq!(upto, AxisKey::range(None, Some(Label::from("C"))));
/// ```
///
/// [`MultiDict`]: crate::MultiDict
/// [`View`]: crate::View
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum AxisKey<L = Label> {
    /// Exactly one label
    Label(L),
    /// An ordered list of labels
    Many(Vec<L>),
    /// The positions from `start` (inclusive) up to `stop` (exclusive), walked `step` at a time.
    /// Missing boundaries default to the ends of the axis.
    Range {
        /// The first label of the range, if any
        start: Option<L>,
        /// The label that ends the range (excluded), if any
        stop: Option<L>,
        /// The stride of the range; it must not be zero
        step: isize,
    },
}

impl<L> AxisKey<L> {
    /// A token selecting the whole axis, including labels appended later
    pub const fn all() -> Self {
        AxisKey::Range {
            start: None,
            stop: None,
            step: 1,
        }
    }

    /// A range token with a step of one
    pub const fn range(start: Option<L>, stop: Option<L>) -> Self {
        AxisKey::Range {
            start,
            stop,
            step: 1,
        }
    }

    /// Creates a token listing the given labels
    pub fn many<I, T>(labels: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<L>,
    {
        AxisKey::Many(labels.into_iter().map(Into::into).collect())
    }

    /// Replaces the step of a range token. Other tokens are returned unchanged.
    pub fn with_step(self, step: isize) -> Self {
        match self {
            AxisKey::Range { start, stop, .. } => AxisKey::Range { start, stop, step },
            other => other,
        }
    }

    /// Returns true if the token names a single label
    pub fn is_concrete(&self) -> bool {
        matches!(self, AxisKey::Label(_))
    }

    /// Returns true if the token is an unbounded range with a step of one
    pub fn is_full(&self) -> bool {
        matches!(
            self,
            AxisKey::Range {
                start: None,
                stop: None,
                step: 1
            }
        )
    }

    /// Returns the label of a concrete token
    pub fn as_label(&self) -> Option<&L> {
        match self {
            AxisKey::Label(l) => Some(l),
            _ => None,
        }
    }
}

impl<L> Default for AxisKey<L> {
    fn default() -> Self {
        Self::all()
    }
}

impl<L: fmt::Debug> fmt::Debug for AxisKey<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Label(l) => write!(f, "{l:?}"),
            AxisKey::Many(ls) => f.debug_list().entries(ls.iter()).finish(),
            AxisKey::Range { start, stop, step } => {
                if let Some(s) = start {
                    write!(f, "{s:?}")?;
                }
                write!(f, "..")?;
                if let Some(s) = stop {
                    write!(f, "{s:?}")?;
                }
                if *step != 1 {
                    write!(f, ";{step}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<Label> for AxisKey<Label> {
    fn from(value: Label) -> Self {
        AxisKey::Label(value)
    }
}

impl From<Vec<Label>> for AxisKey<Label> {
    fn from(value: Vec<Label>) -> Self {
        AxisKey::Many(value)
    }
}

impl From<RangeFull> for AxisKey<Label> {
    fn from(_: RangeFull) -> Self {
        AxisKey::all()
    }
}

macro_rules! label_tokens {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AxisKey<Label> {
                fn from(value: $t) -> Self {
                    AxisKey::Label(value.into())
                }
            }

            impl From<Vec<$t>> for AxisKey<Label> {
                fn from(value: Vec<$t>) -> Self {
                    AxisKey::many(value)
                }
            }

            impl<const N: usize> From<[$t; N]> for AxisKey<Label> {
                fn from(value: [$t; N]) -> Self {
                    AxisKey::many(value)
                }
            }

            impl From<Range<$t>> for AxisKey<Label> {
                fn from(value: Range<$t>) -> Self {
                    AxisKey::range(Some(value.start.into()), Some(value.end.into()))
                }
            }

            impl From<RangeFrom<$t>> for AxisKey<Label> {
                fn from(value: RangeFrom<$t>) -> Self {
                    AxisKey::range(Some(value.start.into()), None)
                }
            }

            impl From<RangeTo<$t>> for AxisKey<Label> {
                fn from(value: RangeTo<$t>) -> Self {
                    AxisKey::range(None, Some(value.end.into()))
                }
            }
        )*
    };
}

label_tokens!(&str, String, char, bool, i8, i16, i32, i64, u8, u16, u32);

/// A key into a [`MultiDict`]: one [`AxisKey`] per axis.
///
/// Keys may be shorter than the arity of the map they index. Missing trailing axes are treated
/// as full-axis wildcards. The [`key!`] macro is the most convenient way to build one.
///
/// [`MultiDict`]: crate::MultiDict
/// [`key!`]: macro@crate::key
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key<L = Label> {
    tokens: Vec<AxisKey<L>>,
}

impl<L> Default for Key<L> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<L> Key<L> {
    /// Creates a key from a list of axis tokens
    pub fn new(tokens: Vec<AxisKey<L>>) -> Self {
        Self { tokens }
    }

    /// Creates a key with a concrete token for every given label
    pub fn from_labels<I: IntoIterator<Item = L>>(labels: I) -> Self {
        Self::new(labels.into_iter().map(AxisKey::Label).collect())
    }

    /// Returns the number of axis tokens in the key
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the key has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the axis tokens of the key
    pub fn tokens(&self) -> &[AxisKey<L>] {
        &self.tokens
    }

    /// Consumes the key and returns its tokens
    pub fn into_tokens(self) -> Vec<AxisKey<L>> {
        self.tokens
    }

    /// Returns true if every token names a single label
    pub fn is_concrete(&self) -> bool {
        self.tokens.iter().all(AxisKey::is_concrete)
    }

    /// Right-pads the key with full-axis wildcards up to `arity` tokens
    pub(crate) fn pad(mut self, arity: usize) -> Self {
        while self.tokens.len() < arity {
            self.tokens.push(AxisKey::all());
        }
        self
    }
}

impl<L: fmt::Debug> fmt::Debug for Key<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("");
        for token in &self.tokens {
            tuple.field(token);
        }
        tuple.finish()
    }
}

impl<L> From<AxisKey<L>> for Key<L> {
    fn from(token: AxisKey<L>) -> Self {
        Self::new(vec![token])
    }
}

impl<L> From<Vec<AxisKey<L>>> for Key<L> {
    fn from(tokens: Vec<AxisKey<L>>) -> Self {
        Self::new(tokens)
    }
}

impl<L, const N: usize> From<[AxisKey<L>; N]> for Key<L> {
    fn from(tokens: [AxisKey<L>; N]) -> Self {
        Self::new(tokens.into_iter().collect())
    }
}

impl<L> FromIterator<AxisKey<L>> for Key<L> {
    fn from_iter<T: IntoIterator<Item = AxisKey<L>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<L> IntoIterator for Key<L> {
    type Item = AxisKey<L>;
    type IntoIter = std::vec::IntoIter<AxisKey<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

/// Builds a [`Key`] from a comma separated list of axis tokens.
///
/// Every element goes through `AxisKey::from`, so labels, vectors and arrays of labels, and Rust
/// ranges can be mixed freely.
///
/// # Examples
/// ```rust
/// use multi_dict::{key, AxisKey, Key, Label};
///
/// let k: Key = key![2, "B"];
/// assert!(k.is_concrete());
///
/// let column: Key = key![.., "B"];
/// assert_eq!(column.tokens()[0], AxisKey::all());
/// ```
#[macro_export]
macro_rules! key {
    () => {
        $crate::Key::new(::std::vec::Vec::new())
    };
    ($($token:expr),+ $(,)?) => {
        $crate::Key::new(::std::vec![$($crate::AxisKey::from($token)),+])
    };
}

/// Builds a keyword key for a [`NamedMultiDict`] out of `name = token` pairs.
///
/// # Examples
/// ```rust
/// use multi_dict::{named_key, AxisKey, Label};
///
/// let k = named_key!(row = 2, column = "B");
/// assert_eq!(k[0], ("row", AxisKey::Label(Label::from(2))));
/// ```
///
/// [`NamedMultiDict`]: crate::NamedMultiDict
#[macro_export]
macro_rules! named_key {
    () => {
        ::std::vec::Vec::<(&'static str, $crate::AxisKey<_>)>::new()
    };
    ($($name:ident = $token:expr),+ $(,)?) => {
        ::std::vec![$((::std::stringify!($name), $crate::AxisKey::from($token))),*]
    };
}
