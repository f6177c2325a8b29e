//! # Lockstep Serde
//! Fixed-layout, little-endian byte serialization for lockstep packets.
//!
//! Every value has a layout that depends only on its type (and, for
//! length-prefixed byte strings, its length), so two peers on different
//! platforms always produce identical bytes for identical values.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use error::SerdeErr;
pub use serde::{ConstByteLength, Serde};
