//! HPACK (§3 "HPACK context", §4.C-D): header compression with the
//! reference-set mechanism from the draft this codec targets.
//!
//! A connection owns one [`Compressor`] for headers it sends and one
//! [`Decompressor`] for headers it receives; both wrap a [`Context`] and
//! stay in lock step purely by applying the same `Context::process` rules.

pub mod compressor;
pub mod context;
pub mod decompressor;
pub mod integer;
pub mod representation;
pub mod static_table;

pub use compressor::Compressor;
pub use context::{HuffmanMode, IndexMode, Options as HpackOptions, RefSetMode};
pub use decompressor::Decompressor;
