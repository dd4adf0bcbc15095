use std::{fmt, num::TryFromIntError};

/// The default label type of a [`MultiDict`].
///
/// Labels of a single map are all of one Rust type, but different axes routinely want different
/// kinds of labels (row numbers on one axis and column names on another). `Label` covers the
/// common cases and converts from the matching primitive types, so keys can be written with plain
/// literals.
///
/// # Examples
/// ```rust
/// use multi_dict::Label;
///
/// assert_eq!(Label::from(2), Label::Int(2));
/// assert_eq!(Label::from("B"), Label::Str("B".to_string()));
/// assert_eq!(Label::try_from(7usize), Ok(Label::Int(7)));
/// assert!(Label::try_from(u64::MAX).is_err());
///
/// assert_eq!(Label::from(-4).as_int(), Some(-4));
/// assert_eq!(Label::from("B").as_str(), Some("B"));
/// assert_eq!(Label::from('B').as_str(), None);
/// ```
///
/// [`MultiDict`]: crate::MultiDict
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Label {
    /// An integer label
    Int(i64),
    /// A string label
    Str(String),
    /// A single character label
    Char(char),
    /// A boolean label
    Bool(bool),
}

impl Label {
    /// Returns the integer if this is an integer label
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Label::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string slice if this is a string label
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Label::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{i}"),
            Label::Str(s) => write!(f, "{s:?}"),
            Label::Char(c) => write!(f, "{c:?}"),
            Label::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(i) => write!(f, "{i}"),
            Label::Str(s) => write!(f, "{s}"),
            Label::Char(c) => write!(f, "{c}"),
            Label::Bool(b) => write!(f, "{b}"),
        }
    }
}

macro_rules! int_label {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Label {
                fn from(value: $t) -> Self {
                    Label::Int(value as i64)
                }
            }
        )*
    };
}

int_label!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_label {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for Label {
                type Error = TryFromIntError;

                fn try_from(value: $t) -> Result<Self, Self::Error> {
                    i64::try_from(value).map(Label::Int)
                }
            }
        )*
    };
}

wide_label!(u64, usize);

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl From<char> for Label {
    fn from(value: char) -> Self {
        Label::Char(value)
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Label::Bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_integers_test() {
        assert_eq!(Label::try_from(i64::MAX as u64), Ok(Label::Int(i64::MAX)));
        assert!(Label::try_from(usize::MAX).is_err());
        assert!(Label::try_from(i64::MAX as u64 + 1).is_err());
        assert_eq!(Label::try_from(0usize), Ok(Label::from(0)));
        assert_ne!(Label::try_from(usize::MAX).ok(), Some(Label::Int(-1)));
    }
}
