//! Plain (non-Huffman) string literal mapping.
//!
//! HPACK carries raw octets; at this layer every octet maps to the Unicode
//! code point of the same value (ISO-8859-1). The mapping is total when
//! decoding and rejects anything above U+00FF when encoding.

use crate::error::HpackError;

/// Append `bytes` to `out`, one character per octet.
pub fn decode(bytes: &[u8], out: &mut String) {
    if bytes.is_ascii() {
        // ASCII is valid UTF-8 as is.
        out.push_str(std::str::from_utf8(bytes).unwrap_or_default());
        return;
    }
    out.reserve(bytes.len());
    out.extend(bytes.iter().copied().map(char::from));
}

/// Append the ISO-8859-1 octets of `s` to `out`.
pub fn encode(s: &str, out: &mut Vec<u8>) -> Result<(), HpackError> {
    out.reserve(s.len());
    for c in s.chars() {
        let b = u8::try_from(u32::from(c)).map_err(|_| HpackError::Unrepresentable(c))?;
        out.push(b);
    }
    Ok(())
}

/// Whether every character of `s` maps to a single ISO-8859-1 octet.
pub fn is_representable(s: &str) -> bool {
    s.is_ascii() || s.chars().all(|c| u32::from(c) <= 0xff)
}

/// Number of octets `s` occupies on the wire. Only exact for text that
/// [`is_representable`].
pub(crate) fn octet_len(s: &str) -> usize {
    if s.is_ascii() {
        s.len()
    } else {
        s.chars().count()
    }
}
