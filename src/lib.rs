//! A labeled multi-axis map with partial-index views

#![deny(unused_imports, missing_debug_implementations, unreachable_pub)]
#![cfg_attr(doc, deny(missing_docs, rustdoc::broken_intra_doc_links))]
#![warn(rust_2018_idioms)]

/// The error type shared by every fallible operation
pub mod error;
pub use crate::error::*;

/// The default label type
pub mod label;
pub use crate::label::*;

/// Axis tokens and keys, along with the macros that build them
pub mod key;
pub use crate::key::*;

/// The per-axis registry of labels
pub mod header;
pub use crate::header::*;

/// Translation of keys into internal coordinates
pub mod translate;
pub use crate::translate::Coordinate;

/// Nested input data and nested output trees
pub mod nested;
pub use crate::nested::*;

/// One of the main data structs
pub mod multi_dict;
pub use crate::multi_dict::*;

/// The value-or-view result of indexing
pub mod selected;
pub use crate::selected::*;

/// Deferred projections of a map
pub mod view;
pub use crate::view::{View, ViewMut};

/// Axis names layered on top of a map
pub mod named;
pub use crate::named::*;

/// Helper functions over hashbrown maps
pub mod functions;

#[cfg(feature = "serde")]
mod serde;

/// Various helpful functions
pub(crate) mod utils;
