//! Decoder configuration.

/// Default dynamic table capacity (SETTINGS_HEADER_TABLE_SIZE, RFC 7540 Section 6.5.2).
pub const DEFAULT_HEADER_TABLE_SIZE: usize = 4096;

/// Limits applied by a [`Decoder`](crate::Decoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Capacity ceiling for the dynamic table, as advertised to the peer
    /// through SETTINGS_HEADER_TABLE_SIZE. Default 4096.
    pub header_table_size: usize,
    /// Largest decoded header list per block, counted as the sum of
    /// `len(name) + len(value) + 32` per field. Default unlimited.
    pub max_header_list_size: Option<usize>,
    /// Most literals with incremental indexing allowed per block.
    /// Default unlimited.
    pub max_literal_with_indexing: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            header_table_size: DEFAULT_HEADER_TABLE_SIZE,
            max_header_list_size: None,
            max_literal_with_indexing: None,
        }
    }
}

impl DecoderConfig {
    /// Defaults with the given table capacity.
    pub fn with_header_table_size(header_table_size: usize) -> Self {
        Self {
            header_table_size,
            ..Default::default()
        }
    }

    pub fn max_header_list_size(mut self, max: usize) -> Self {
        self.max_header_list_size = Some(max);
        self
    }

    pub fn max_literal_with_indexing(mut self, max: usize) -> Self {
        self.max_literal_with_indexing = Some(max);
        self
    }
}
