use thiserror::Error;

use crate::label::Label;

/// The error type for all fallible operations on a [`MultiDict`] and its views.
///
/// The error is generic over the label type so that the offending label can be handed back to
/// the caller untouched.
///
/// [`MultiDict`]: crate::MultiDict
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiDictError<L = Label> {
    /// A concrete label, or a range boundary, is not in the header of its axis.
    #[error("label {label:?} not found on axis {axis}")]
    LabelNotFound {
        /// The axis that was searched
        axis: usize,
        /// The label that could not be found
        label: L,
    },

    /// Every label of the key resolved, but no value is stored at that coordinate.
    #[error("no value stored for key {key:?}")]
    KeyNotFound {
        /// The external labels of the missing entry
        key: Vec<L>,
    },

    /// The number of axis tokens in a key does not match the arity of the map.
    #[error("wrong size {found}, expected {expected}")]
    ArityMismatch {
        /// The established arity
        expected: usize,
        /// The arity that was given
        found: usize,
    },

    /// A write was attempted on a map whose arity is not yet known.
    #[error("the arity of the map has not been established")]
    ArityNotEstablished,

    /// A subkey given to a view lies outside the view's constraint for that axis.
    #[error("label {label:?} is outside of the view's selection on axis {axis}")]
    ViewConstraintViolation {
        /// The constrained axis
        axis: usize,
        /// The label that fell outside of the constraint
        label: L,
    },

    /// A write requires a single label on every axis.
    #[error("axis {axis} selects more than one label, writes need a concrete key")]
    PartialKey {
        /// The first non-concrete axis
        axis: usize,
    },

    /// A range token was given a step of zero.
    #[error("range on axis {axis} has a step of zero")]
    ZeroStep {
        /// The axis of the offending range
        axis: usize,
    },

    /// An explicit header listed the same label twice.
    #[error("label {label:?} appears twice in the header of axis {axis}")]
    DuplicateLabel {
        /// The axis of the header
        axis: usize,
        /// The repeated label
        label: L,
    },

    /// Bulk data reaches past the end of an explicitly given header.
    #[error("position {position} is out of bounds for axis {axis} of length {len}")]
    CoordinateOutOfBounds {
        /// The axis of the header
        axis: usize,
        /// The position found in the data
        position: usize,
        /// The length of the header
        len: usize,
    },

    /// A keyword lookup named an axis that does not exist.
    #[error("unknown axis name {0:?}")]
    UnknownAxisName(String),

    /// A keyword lookup named the same axis twice.
    #[error("axis {0:?} was named more than once")]
    DuplicateAxisName(String),

    /// The number of axis names does not match the arity of the map.
    #[error("{found} axis names given for a map of arity {expected}")]
    AxisNameCount {
        /// The arity of the map
        expected: usize,
        /// The number of names given
        found: usize,
    },
}

/// A shorthand for results whose error is a [`MultiDictError`]
pub type Result<T, L = Label> = std::result::Result<T, MultiDictError<L>>;
