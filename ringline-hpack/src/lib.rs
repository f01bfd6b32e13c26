//! Streaming sans-IO HPACK header block decoder.
//!
//! This crate decodes HTTP/2 header blocks (RFC 7541) without owning any
//! I/O. A header block can be fed in arbitrary fragments, split at any byte,
//! and decoded fields are reported through a [`DecodingCallback`] as soon as
//! each instruction completes.
//!
//! # Architecture
//!
//! ```text
//!   HEADERS / CONTINUATION payloads
//!        |
//!   +----v-----------+
//!   | Decoder        |  instruction state machine, per-block limits
//!   +----+------+----+
//!        |      |
//!        |   +--v-------------+
//!        |   | IntegerReader  |  N-bit prefixed integers
//!        |   | StringReader   |  literals, plain or via HuffmanReader
//!        |   +----------------+
//!        |
//!   +----v-----------+
//!   | HeaderTable    |  61 static + FIFO dynamic entries
//!   +----------------+
//! ```
//!
//! # Example
//!
//! ```rust
//! use ringline_hpack::{Decoder, HeaderList};
//!
//! let mut decoder = Decoder::new(4096);
//! let mut list = HeaderList::new();
//!
//! // ":method: GET" and ":path: /", delivered in two fragments.
//! let mut first: &[u8] = &[0x82];
//! decoder.decode(&mut first, false, &mut list)?;
//! let mut second: &[u8] = &[0x84];
//! decoder.decode(&mut second, true, &mut list)?;
//!
//! assert_eq!(list.fields()[0].name(), ":method");
//! assert_eq!(list.fields()[1].value(), "/");
//! # Ok::<(), ringline_hpack::HpackError>(())
//! ```

pub mod callback;
pub mod config;
pub mod decoder;
pub mod error;
pub mod huffman;
pub mod integer;
pub mod iso_8859_1;
pub mod metrics;
mod ring;
mod static_table;
pub mod string;
pub mod table;

pub use callback::{DecodingCallback, HeaderList};
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use error::HpackError;
pub use huffman::HuffmanReader;
pub use integer::IntegerReader;
pub use static_table::STATIC_TABLE_LEN;
pub use string::StringReader;
pub use table::{ENTRY_OVERHEAD, HeaderField, HeaderTable, TableMatch};
