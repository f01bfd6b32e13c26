//! Error type for HPACK decoding.

/// Errors produced while decoding an HPACK header block.
///
/// Every variant is fatal to the [`Decoder`](crate::Decoder) that raised it:
/// HPACK state cannot be resynchronized, so the connection must be torn down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HpackError {
    /// The header block ended in the middle of an instruction.
    #[error("unexpected end of header block in {state} representation")]
    UnexpectedEndOfBlock { state: &'static str },

    /// An index referred to neither the static nor the dynamic table.
    #[error("index {index} out of range (table length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A dynamic table size update exceeded the agreed capacity.
    #[error("table size update {requested} exceeds capacity {capacity}")]
    SizeUpdateTooLarge { requested: usize, capacity: usize },

    /// A dynamic table size update followed a field representation.
    #[error("dynamic table size update after a header field")]
    UnexpectedSizeUpdate,

    /// A prefixed integer does not fit in 32 bits.
    #[error("integer overflow")]
    IntegerOverflow,

    /// A Huffman-coded string literal is malformed.
    #[error("invalid huffman string: {0}")]
    InvalidHuffman(&'static str),

    /// The decoded header list grew past the configured maximum.
    #[error("header list size {size} exceeds limit {max}")]
    HeaderListTooLarge { size: usize, max: usize },

    /// Too many literals with incremental indexing in one header block.
    #[error("{count} literals with indexing exceed limit {max}")]
    TooManyIndexedLiterals { count: usize, max: usize },

    /// A character cannot be represented in ISO-8859-1.
    #[error("character {0:?} is not representable in ISO-8859-1")]
    Unrepresentable(char),

    /// The decoder already failed and can no longer be used.
    #[error("decoder is unusable after a previous error")]
    Poisoned,
}
