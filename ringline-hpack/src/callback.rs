//! Consumer interface for decoded header fields.

use crate::error::HpackError;
use crate::table::HeaderField;

/// Receives the result of every decoded instruction, in wire order.
///
/// Only [`on_decoded`](Self::on_decoded) is required; the per-representation
/// methods forward to it by default. Implement them to see indices, Huffman
/// flags or the representation kind.
///
/// Errors returned from any method abort decoding and are passed through
/// [`Decoder::decode`](crate::Decoder::decode) unchanged. The decoder is
/// unusable afterwards.
pub trait DecodingCallback {
    /// Error type surfaced by `decode`. Decoding failures convert into it.
    type Error: From<HpackError>;

    /// A header field was decoded.
    ///
    /// `sensitive` is set for fields sent as "never indexed": intermediaries
    /// must not re-encode them into a dynamic table.
    fn on_decoded(&mut self, name: &str, value: &str, sensitive: bool) -> Result<(), Self::Error>;

    /// Indexed header field representation (RFC 7541 Section 6.1).
    fn on_indexed(&mut self, index: usize, name: &str, value: &str) -> Result<(), Self::Error> {
        let _ = index;
        self.on_decoded(name, value, false)
    }

    /// Literal header field without indexing (RFC 7541 Section 6.2.2).
    ///
    /// `index` is set when the name was taken from the table, in which case
    /// `name_huffman` is always false.
    fn on_literal(
        &mut self,
        index: Option<usize>,
        name: &str,
        name_huffman: bool,
        value: &str,
        value_huffman: bool,
    ) -> Result<(), Self::Error> {
        let _ = (index, name_huffman, value_huffman);
        self.on_decoded(name, value, false)
    }

    /// Literal header field with incremental indexing (RFC 7541 Section 6.2.1).
    ///
    /// Called before the field is inserted into the dynamic table.
    fn on_literal_with_indexing(
        &mut self,
        index: Option<usize>,
        name: &str,
        name_huffman: bool,
        value: &str,
        value_huffman: bool,
    ) -> Result<(), Self::Error> {
        let _ = (index, name_huffman, value_huffman);
        self.on_decoded(name, value, false)
    }

    /// Literal header field never indexed (RFC 7541 Section 6.2.3).
    fn on_literal_never_indexed(
        &mut self,
        index: Option<usize>,
        name: &str,
        name_huffman: bool,
        value: &str,
        value_huffman: bool,
    ) -> Result<(), Self::Error> {
        let _ = (index, name_huffman, value_huffman);
        self.on_decoded(name, value, true)
    }

    /// Dynamic table size update (RFC 7541 Section 6.3), called before the
    /// table is resized.
    fn on_size_update(&mut self, max_size: usize) -> Result<(), Self::Error> {
        let _ = max_size;
        Ok(())
    }

    /// The header list of the current block grew past the configured limit.
    /// Fails by default; return `Ok(())` to keep decoding.
    fn on_max_header_list_size_reached(
        &mut self,
        size: usize,
        max: usize,
    ) -> Result<(), Self::Error> {
        Err(HpackError::HeaderListTooLarge { size, max }.into())
    }

    /// The current block carried more literals with indexing than allowed.
    /// Fails by default; return `Ok(())` to keep decoding.
    fn on_max_literal_with_indexing_reached(
        &mut self,
        count: usize,
        max: usize,
    ) -> Result<(), Self::Error> {
        Err(HpackError::TooManyIndexedLiterals { count, max }.into())
    }
}

/// Collects decoded fields in order, remembering which were sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    fields: Vec<HeaderField>,
    sensitive: Vec<bool>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    /// Whether field `i` was sent as "never indexed".
    pub fn is_sensitive(&self, i: usize) -> bool {
        self.sensitive.get(i).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<HeaderField> {
        self.fields
    }
}

impl DecodingCallback for HeaderList {
    type Error = HpackError;

    fn on_decoded(&mut self, name: &str, value: &str, sensitive: bool) -> Result<(), HpackError> {
        self.fields.push(HeaderField::new(name, value));
        self.sensitive.push(sensitive);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_forward_to_on_decoded() {
        let mut list = HeaderList::new();
        list.on_indexed(2, ":method", "GET").unwrap();
        list.on_literal(Some(4), ":path", false, "/a", true).unwrap();
        list.on_literal_with_indexing(None, "x-a", true, "1", false)
            .unwrap();
        list.on_literal_never_indexed(Some(23), "authorization", false, "secret", false)
            .unwrap();
        list.on_size_update(100).unwrap();

        assert_eq!(list.len(), 4);
        assert_eq!(list.fields()[1], HeaderField::new(":path", "/a"));
        assert!(!list.is_sensitive(0));
        assert!(list.is_sensitive(3));
        assert!(!list.is_sensitive(99));
    }

    #[test]
    fn limit_hooks_fail_by_default() {
        let mut list = HeaderList::new();
        assert_eq!(
            list.on_max_header_list_size_reached(200, 100),
            Err(HpackError::HeaderListTooLarge { size: 200, max: 100 })
        );
        assert_eq!(
            list.on_max_literal_with_indexing_reached(3, 2),
            Err(HpackError::TooManyIndexedLiterals { count: 3, max: 2 })
        );
    }
}
