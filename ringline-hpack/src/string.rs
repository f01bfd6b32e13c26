//! Resumable HPACK string literal reader (RFC 7541 Section 5.2).
//!
//! ```text
//!   0   1   2   3   4   5   6   7
//! +---+---+---+---+---+---+---+---+
//! | H |    String Length (7+)     |
//! +---+---------------------------+
//! |  String Data (Length octets)  |
//! +-------------------------------+
//! ```

use bytes::Buf;

use crate::error::HpackError;
use crate::huffman::HuffmanReader;
use crate::integer::IntegerReader;
use crate::iso_8859_1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    New,
    FirstByteRead,
    LengthRead,
    Done,
}

/// Decodes one string literal, possibly across many buffers.
#[derive(Debug, Clone)]
pub struct StringReader {
    state: State,
    huffman: bool,
    remaining: usize,
    length: IntegerReader,
    huffman_reader: HuffmanReader,
}

impl Default for StringReader {
    fn default() -> Self {
        Self::new()
    }
}

impl StringReader {
    pub fn new() -> Self {
        Self {
            state: State::New,
            huffman: false,
            remaining: 0,
            length: IntegerReader::new(),
            huffman_reader: HuffmanReader::new(),
        }
    }

    /// Consume the literal from `buf`, appending its characters to `out`.
    ///
    /// Returns `Ok(true)` once the whole literal has been read and `Ok(false)`
    /// if `buf` ran out first; call again with more input to continue.
    pub fn read<B: Buf>(&mut self, buf: &mut B, out: &mut String) -> Result<bool, HpackError> {
        if self.state == State::Done {
            return Ok(true);
        }
        if !buf.has_remaining() {
            return Ok(false);
        }

        if self.state == State::New {
            self.huffman = buf.chunk()[0] & 0x80 != 0;
            self.length.configure(7);
            self.state = State::FirstByteRead;
        }

        if self.state == State::FirstByteRead {
            if !self.length.read(buf)? {
                return Ok(false);
            }
            self.remaining = self.length.get();
            self.length.reset();
            if self.remaining == 0 {
                self.state = State::Done;
                return Ok(true);
            }
            self.state = State::LengthRead;
        }

        // The payload is decoded chunk by chunk so a non-contiguous `Buf`
        // never has to be copied out first.
        while self.remaining > 0 && buf.has_remaining() {
            let chunk = buf.chunk();
            let n = chunk.len().min(self.remaining);
            let is_last = n == self.remaining;
            if self.huffman {
                self.huffman_reader.read(&chunk[..n], out, is_last)?;
            } else {
                iso_8859_1::decode(&chunk[..n], out);
            }
            buf.advance(n);
            self.remaining -= n;
        }

        if self.remaining > 0 {
            return Ok(false);
        }
        self.state = State::Done;
        Ok(true)
    }

    /// Whether the literal just read was Huffman-coded.
    pub fn is_huffman_encoded(&self) -> bool {
        debug_assert!(self.state == State::Done, "string not fully read");
        self.huffman
    }

    pub fn reset(&mut self) {
        self.state = State::New;
        self.huffman = false;
        self.remaining = 0;
        self.length.reset();
        self.huffman_reader.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::huffman;
    use crate::integer::encode_prefix_int;

    fn literal(data: &[u8], huffman_coded: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        if huffman_coded {
            let mut encoded = Vec::new();
            huffman::encode(data, &mut encoded);
            encode_prefix_int(&mut buf, encoded.len() as u64, 7, 0x80);
            buf.extend_from_slice(&encoded);
        } else {
            encode_prefix_int(&mut buf, data.len() as u64, 7, 0x00);
            buf.extend_from_slice(data);
        }
        buf
    }

    #[test]
    fn plain_literal() {
        let mut data: &[u8] = &[0x0a, b'c', b'u', b's', b't', b'o', b'm', b'-', b'k', b'e', b'y', 0xff];
        let mut reader = StringReader::new();
        let mut out = String::new();
        assert!(reader.read(&mut data, &mut out).unwrap());
        assert_eq!(out, "custom-key");
        assert!(!reader.is_huffman_encoded());
        assert_eq!(data, &[0xff]);
    }

    #[test]
    fn huffman_literal() {
        // RFC 7541 C.4.1 ":authority" value.
        let mut data: &[u8] = &[
            0x8c, 0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90, 0xf4, 0xff,
        ];
        let mut reader = StringReader::new();
        let mut out = String::new();
        assert!(reader.read(&mut data, &mut out).unwrap());
        assert_eq!(out, "www.example.com");
        assert!(reader.is_huffman_encoded());
        assert!(data.is_empty());
    }

    #[test]
    fn empty_literals() {
        for first in [0x00u8, 0x80] {
            let mut data: &[u8] = &[first];
            let mut reader = StringReader::new();
            let mut out = String::new();
            assert!(reader.read(&mut data, &mut out).unwrap());
            assert!(out.is_empty());
        }
    }

    #[test]
    fn long_length_prefix() {
        let value = vec![b'x'; 300];
        let encoded = literal(&value, false);
        let mut data = encoded.as_slice();
        let mut reader = StringReader::new();
        let mut out = String::new();
        assert!(reader.read(&mut data, &mut out).unwrap());
        assert_eq!(out.len(), 300);
    }

    #[test]
    fn split_at_every_byte() {
        let text = b"Mon, 21 Oct 2013 20:13:21 GMT";
        for huffman_coded in [false, true] {
            let encoded = literal(text, huffman_coded);
            for split in 0..=encoded.len() {
                let mut reader = StringReader::new();
                let mut out = String::new();
                let mut first = &encoded[..split];
                let mut second = &encoded[split..];
                let done = reader.read(&mut first, &mut out).unwrap();
                assert_eq!(done, split == encoded.len());
                assert!(reader.read(&mut second, &mut out).unwrap());
                assert_eq!(out.as_bytes(), text);
                assert_eq!(reader.is_huffman_encoded(), huffman_coded);
            }
        }
    }

    #[test]
    fn non_contiguous_buf() {
        let encoded = literal(b"no-cache", true);
        let (a, b) = encoded.split_at(3);
        let mut chain = Buf::chain(a, b);
        let mut reader = StringReader::new();
        let mut out = String::new();
        assert!(reader.read(&mut chain, &mut out).unwrap());
        assert_eq!(out, "no-cache");
    }

    #[test]
    fn invalid_huffman_fails() {
        let mut data: &[u8] = &[0x81, 0x00];
        let mut reader = StringReader::new();
        let mut out = String::new();
        assert!(matches!(
            reader.read(&mut data, &mut out),
            Err(HpackError::InvalidHuffman(_))
        ));
    }
}
