//! Typed attributes and hyperslab selections over [`zarrs`] hierarchies.
//!
//! Attributes of the six supported element kinds
//! (16, 32 and 64 bit signed integers, 32 and 64 bit floats, and strings)
//! are stored as self-describing records in a node's attribute map,
//! so their kind and extent can be discovered when reading.
//! See [`AttributeStore`] and the lower-level functions in [`codec`].
//!
//! [`Hyperslab`] describes strided sub-regions of an n-dimensional array,
//! which can be read from and written to a [`Dataset`].
pub mod codec;
pub mod config;
mod dataset;
mod error;
pub mod hyperslab;
mod kind;
pub mod metadata;
mod node;
mod store;
mod value;

pub use zarrs;

pub use config::{Compression, DatasetConfig};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use hyperslab::{Hyperslab, HyperslabBuilder};
pub use kind::ElementKind;
pub use node::Node;
pub use store::AttributeStore;
pub use value::{AttributeElement, Value};
