//! h2-endpoint-core: a sans-I/O HTTP/2 endpoint core.
//!
//! This crate implements the wire-level machinery of an HTTP/2 endpoint
//! without owning any I/O: bytes come in, events come out; structs go in,
//! bytes come out. Nothing here spawns a thread, opens a socket, or knows
//! about TLS. A driver (sync or async, embedded or hosted) owns the
//! transport and calls into [`Connection`] with bytes as they arrive.
//!
//! # Components
//!
//! - [`buffer`] — growable byte buffer with a read cursor
//! - [`huffman`] — the static Huffman code table and a DFA-driven decoder
//! - [`hpack`] — header compression: dynamic table, reference set,
//!   compressor and decompressor
//! - [`frame`] — the 9-byte frame header plus every frame type's payload
//! - [`flow`] — flow-control window accounting
//! - [`stream`] — per-stream lifecycle state machine
//! - [`connection`] — ties the above into one `process`/`create_*` surface
//!
//! # Quick start
//!
//! ```rust
//! use h2_endpoint_core::connection::Connection;
//! use h2_endpoint_core::hpack::HpackOptions;
//!
//! let mut conn = Connection::new(false, HpackOptions::default());
//! let frame = conn
//!     .create_headers(1, &[(b":method".to_vec(), b"GET".to_vec())], true, 16384)
//!     .unwrap();
//! assert!(!frame.is_empty());
//! ```
//!
//! # Non-goals
//!
//! - TCP/TLS transport
//! - HTTP/1.1 upgrade negotiation
//! - Connection-level concurrency policy (your driver decides when to
//!   open new streams and how many to allow)

pub mod buffer;
pub mod connection;
pub mod error;
pub mod flow;
pub mod frame;
pub mod hpack;
pub mod huffman;
pub mod stream;

pub use connection::{Connection, Event};
pub use error::{Error, ErrorCode, Result};
pub use frame::{flags, frame_type, is_h2c_preface, settings_id, Frame, FrameHeader, CONNECTION_PREFACE};
pub use hpack::{Compressor, Decompressor, HpackOptions};
pub use stream::{Stream, StreamEvent, StreamState};
