//! Huffman decoding for HPACK string literals (RFC 7541 Appendix B).
//!
//! [`HuffmanReader`] is streaming: a Huffman-coded literal may be fed in any
//! number of slices, and the padding is only validated once the last slice
//! has been seen.

use std::sync::OnceLock;

use crate::error::HpackError;

const EOS: u16 = 256;

/// Canonical Huffman code per symbol: (code, bit length).
/// Index is the octet value (0-255), plus EOS at 256.
static HUFFMAN_TABLE: [(u32, u8); 257] = [
    (0x1ff8, 13), (0x7fffd8, 23), (0xfffffe2, 28), (0xfffffe3, 28), // 0
    (0xfffffe4, 28), (0xfffffe5, 28), (0xfffffe6, 28), (0xfffffe7, 28), // 4
    (0xfffffe8, 28), (0xffffea, 24), (0x3ffffffc, 30), (0xfffffe9, 28), // 8
    (0xfffffea, 28), (0x3ffffffd, 30), (0xfffffeb, 28), (0xfffffec, 28), // 12
    (0xfffffed, 28), (0xfffffee, 28), (0xfffffef, 28), (0xffffff0, 28), // 16
    (0xffffff1, 28), (0xffffff2, 28), (0x3ffffffe, 30), (0xffffff3, 28), // 20
    (0xffffff4, 28), (0xffffff5, 28), (0xffffff6, 28), (0xffffff7, 28), // 24
    (0xffffff8, 28), (0xffffff9, 28), (0xffffffa, 28), (0xffffffb, 28), // 28
    (0x14, 6), (0x3f8, 10), (0x3f9, 10), (0xffa, 12), // 32
    (0x1ff9, 13), (0x15, 6), (0xf8, 8), (0x7fa, 11), // 36
    (0x3fa, 10), (0x3fb, 10), (0xf9, 8), (0x7fb, 11), // 40
    (0xfa, 8), (0x16, 6), (0x17, 6), (0x18, 6), // 44
    (0x0, 5), (0x1, 5), (0x2, 5), (0x19, 6), // 48
    (0x1a, 6), (0x1b, 6), (0x1c, 6), (0x1d, 6), // 52
    (0x1e, 6), (0x1f, 6), (0x5c, 7), (0xfb, 8), // 56
    (0x7ffc, 15), (0x20, 6), (0xffb, 12), (0x3fc, 10), // 60
    (0x1ffa, 13), (0x21, 6), (0x5d, 7), (0x5e, 7), // 64
    (0x5f, 7), (0x60, 7), (0x61, 7), (0x62, 7), // 68
    (0x63, 7), (0x64, 7), (0x65, 7), (0x66, 7), // 72
    (0x67, 7), (0x68, 7), (0x69, 7), (0x6a, 7), // 76
    (0x6b, 7), (0x6c, 7), (0x6d, 7), (0x6e, 7), // 80
    (0x6f, 7), (0x70, 7), (0x71, 7), (0x72, 7), // 84
    (0xfc, 8), (0x73, 7), (0xfd, 8), (0x1ffb, 13), // 88
    (0x7fff0, 19), (0x1ffc, 13), (0x3ffc, 14), (0x22, 6), // 92
    (0x7ffd, 15), (0x3, 5), (0x23, 6), (0x4, 5), // 96
    (0x24, 6), (0x5, 5), (0x25, 6), (0x26, 6), // 100
    (0x27, 6), (0x6, 5), (0x74, 7), (0x75, 7), // 104
    (0x28, 6), (0x29, 6), (0x2a, 6), (0x7, 5), // 108
    (0x2b, 6), (0x76, 7), (0x2c, 6), (0x8, 5), // 112
    (0x9, 5), (0x2d, 6), (0x77, 7), (0x78, 7), // 116
    (0x79, 7), (0x7a, 7), (0x7b, 7), (0x7ffe, 15), // 120
    (0x7fc, 11), (0x3ffd, 14), (0x1ffd, 13), (0xffffffc, 28), // 124
    (0xfffe6, 20), (0x3fffd2, 22), (0xfffe7, 20), (0xfffe8, 20), // 128
    (0x3fffd3, 22), (0x3fffd4, 22), (0x3fffd5, 22), (0x7fffd9, 23), // 132
    (0x3fffd6, 22), (0x7fffda, 23), (0x7fffdb, 23), (0x7fffdc, 23), // 136
    (0x7fffdd, 23), (0x7fffde, 23), (0xffffeb, 24), (0x7fffdf, 23), // 140
    (0xffffec, 24), (0xffffed, 24), (0x3fffd7, 22), (0x7fffe0, 23), // 144
    (0xffffee, 24), (0x7fffe1, 23), (0x7fffe2, 23), (0x7fffe3, 23), // 148
    (0x7fffe4, 23), (0x1fffdc, 21), (0x3fffd8, 22), (0x7fffe5, 23), // 152
    (0x3fffd9, 22), (0x7fffe6, 23), (0x7fffe7, 23), (0xffffef, 24), // 156
    (0x3fffda, 22), (0x1fffdd, 21), (0xfffe9, 20), (0x3fffdb, 22), // 160
    (0x3fffdc, 22), (0x7fffe8, 23), (0x7fffe9, 23), (0x1fffde, 21), // 164
    (0x7fffea, 23), (0x3fffdd, 22), (0x3fffde, 22), (0xfffff0, 24), // 168
    (0x1fffdf, 21), (0x3fffdf, 22), (0x7fffeb, 23), (0x7fffec, 23), // 172
    (0x1fffe0, 21), (0x1fffe1, 21), (0x3fffe0, 22), (0x1fffe2, 21), // 176
    (0x7fffed, 23), (0x3fffe1, 22), (0x7fffee, 23), (0x7fffef, 23), // 180
    (0xfffea, 20), (0x3fffe2, 22), (0x3fffe3, 22), (0x3fffe4, 22), // 184
    (0x7ffff0, 23), (0x3fffe5, 22), (0x3fffe6, 22), (0x7ffff1, 23), // 188
    (0x3ffffe0, 26), (0x3ffffe1, 26), (0xfffeb, 20), (0x7fff1, 19), // 192
    (0x3fffe7, 22), (0x7ffff2, 23), (0x3fffe8, 22), (0x1ffffec, 25), // 196
    (0x3ffffe2, 26), (0x3ffffe3, 26), (0x3ffffe4, 26), (0x7ffffde, 27), // 200
    (0x7ffffdf, 27), (0x3ffffe5, 26), (0xfffff1, 24), (0x1ffffed, 25), // 204
    (0x7fff2, 19), (0x1fffe3, 21), (0x3ffffe6, 26), (0x7ffffe0, 27), // 208
    (0x7ffffe1, 27), (0x3ffffe7, 26), (0x7ffffe2, 27), (0xfffff2, 24), // 212
    (0x1fffe4, 21), (0x1fffe5, 21), (0x3ffffe8, 26), (0x3ffffe9, 26), // 216
    (0xffffffd, 28), (0x7ffffe3, 27), (0x7ffffe4, 27), (0x7ffffe5, 27), // 220
    (0xfffec, 20), (0xfffff3, 24), (0xfffed, 20), (0x1fffe6, 21), // 224
    (0x3fffe9, 22), (0x1fffe7, 21), (0x1fffe8, 21), (0x7ffff3, 23), // 228
    (0x3fffea, 22), (0x3fffeb, 22), (0x1ffffee, 25), (0x1ffffef, 25), // 232
    (0xfffff4, 24), (0xfffff5, 24), (0x3ffffea, 26), (0x7ffff4, 23), // 236
    (0x3ffffeb, 26), (0x7ffffe6, 27), (0x3ffffec, 26), (0x3ffffed, 26), // 240
    (0x7ffffe7, 27), (0x7ffffe8, 27), (0x7ffffe9, 27), (0x7ffffea, 27), // 244
    (0x7ffffeb, 27), (0xffffffe, 28), (0x7ffffec, 27), (0x7ffffed, 27), // 248
    (0x7ffffee, 27), (0x7ffffef, 27), (0x7fffff0, 27), (0x3ffffee, 26), // 252
    (0x3fffffff, 30), // 256
];

// -- Decode tree --

#[derive(Clone, Copy)]
enum Node {
    Internal { left: u16, right: u16 },
    Leaf { sym: u16 },
}

fn decode_tree() -> &'static [Node] {
    static TREE: OnceLock<Vec<Node>> = OnceLock::new();
    TREE.get_or_init(build_decode_tree)
}

fn build_decode_tree() -> Vec<Node> {
    let mut nodes = Vec::with_capacity(512);
    nodes.push(Node::Internal { left: 0, right: 0 });

    for (sym, &(code, bits)) in HUFFMAN_TABLE.iter().enumerate() {
        let mut node_idx = 0usize;

        for bit_pos in (0..bits).rev() {
            let bit = (code >> bit_pos) & 1;
            let (left, right) = match nodes[node_idx] {
                Node::Internal { left, right } => (left, right),
                Node::Leaf { .. } => panic!("Huffman code collision"),
            };
            let child = if bit == 0 { left } else { right };

            let next = if bit_pos == 0 {
                nodes.push(Node::Leaf { sym: sym as u16 });
                nodes.len() - 1
            } else if child == 0 {
                nodes.push(Node::Internal { left: 0, right: 0 });
                nodes.len() - 1
            } else {
                node_idx = child as usize;
                continue;
            };

            nodes[node_idx] = if bit == 0 {
                Node::Internal {
                    left: next as u16,
                    right,
                }
            } else {
                Node::Internal {
                    left,
                    right: next as u16,
                }
            };
            node_idx = next;
        }
    }

    nodes
}

/// Incremental Huffman decoder.
///
/// Keeps the position in the decode tree between calls, plus enough about
/// the bits read since the last complete symbol to validate the padding.
#[derive(Debug, Clone)]
pub struct HuffmanReader {
    node: u16,
    /// Bits consumed since the last complete symbol.
    pending_bits: u8,
    /// Whether every pending bit was a one (a prefix of EOS).
    pending_ones: bool,
}

impl Default for HuffmanReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HuffmanReader {
    pub fn new() -> Self {
        Self {
            node: 0,
            pending_bits: 0,
            pending_ones: true,
        }
    }

    /// Decode `data`, appending one character per decoded octet to `out`.
    ///
    /// `is_last` marks the final slice of the literal; the trailing padding
    /// is checked then and the reader is reset for the next literal.
    pub fn read(&mut self, data: &[u8], out: &mut String, is_last: bool) -> Result<(), HpackError> {
        let tree = decode_tree();

        for &byte in data {
            for bit_pos in (0..8).rev() {
                let bit = (byte >> bit_pos) & 1;
                let next = match tree[self.node as usize] {
                    Node::Internal { left, right } => {
                        if bit == 0 {
                            left
                        } else {
                            right
                        }
                    }
                    Node::Leaf { .. } => unreachable!(),
                };
                if next == 0 {
                    return Err(HpackError::InvalidHuffman("invalid code"));
                }

                self.pending_bits = self.pending_bits.saturating_add(1);
                self.pending_ones &= bit == 1;

                match tree[next as usize] {
                    Node::Leaf { sym } if sym == EOS => {
                        return Err(HpackError::InvalidHuffman("EOS symbol in string"));
                    }
                    Node::Leaf { sym } => {
                        out.push(char::from(sym as u8));
                        self.node = 0;
                        self.pending_bits = 0;
                        self.pending_ones = true;
                    }
                    Node::Internal { .. } => self.node = next,
                }
            }
        }

        if is_last {
            // Padding must be at most 7 bits and all 1s (EOS prefix).
            if self.pending_bits > 7 {
                return Err(HpackError::InvalidHuffman("padding longer than 7 bits"));
            }
            if !self.pending_ones {
                return Err(HpackError::InvalidHuffman("padding is not an EOS prefix"));
            }
            self.reset();
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Huffman-encode `data` and append to `out`.
#[cfg(test)]
pub(crate) fn encode(data: &[u8], out: &mut Vec<u8>) {
    let mut bits: u64 = 0;
    let mut bit_count = 0u8;

    for &byte in data {
        let (code, len) = HUFFMAN_TABLE[byte as usize];
        bits = (bits << len) | u64::from(code);
        bit_count += len;

        while bit_count >= 8 {
            bit_count -= 8;
            out.push((bits >> bit_count) as u8);
        }
    }

    if bit_count > 0 {
        bits <<= 8 - bit_count;
        bits |= (1u64 << (8 - bit_count)) - 1;
        out.push(bits as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(data: &[u8]) -> Result<String, HpackError> {
        let mut out = String::new();
        HuffmanReader::new().read(data, &mut out, true)?;
        Ok(out)
    }

    #[test]
    fn rfc7541_c4_strings() {
        let cases: &[(&[u8], &str)] = &[
            (
                &[0xf1, 0xe3, 0xc2, 0xe5, 0xf2, 0x3a, 0x6b, 0xa0, 0xab, 0x90, 0xf4, 0xff],
                "www.example.com",
            ),
            (&[0xa8, 0xeb, 0x10, 0x64, 0x9c, 0xbf], "no-cache"),
            (&[0x25, 0xa8, 0x49, 0xe9, 0x5b, 0xa9, 0x7d, 0x7f], "custom-key"),
            (
                &[0x25, 0xa8, 0x49, 0xe9, 0x5b, 0xb8, 0xe8, 0xb4, 0xbf],
                "custom-value",
            ),
        ];
        for &(input, expected) in cases {
            assert_eq!(decode_all(input).unwrap(), expected);
        }
    }

    #[test]
    fn roundtrip_simple_strings() {
        let test_cases: &[&[u8]] = &[
            b"",
            b"a",
            b"hello",
            b"Mon, 21 Oct 2013 20:13:21 GMT",
            b"text/html; charset=utf-8",
        ];

        for &input in test_cases {
            let mut encoded = Vec::new();
            encode(input, &mut encoded);
            let decoded = decode_all(&encoded).unwrap();
            assert_eq!(decoded.as_bytes(), input);
        }
    }

    #[test]
    fn all_bytes_decode_to_latin1() {
        let input: Vec<u8> = (0..=255).collect();
        let mut encoded = Vec::new();
        encode(&input, &mut encoded);
        let decoded = decode_all(&encoded).unwrap();
        let octets: Vec<u8> = decoded.chars().map(|c| c as u8).collect();
        assert_eq!(octets, input);
    }

    #[test]
    fn split_at_every_byte() {
        let mut encoded = Vec::new();
        encode(b"https://www.example.com/some/path?q=1", &mut encoded);

        for split in 0..=encoded.len() {
            let mut reader = HuffmanReader::new();
            let mut out = String::new();
            reader.read(&encoded[..split], &mut out, false).unwrap();
            reader.read(&encoded[split..], &mut out, true).unwrap();
            assert_eq!(out, "https://www.example.com/some/path?q=1");
        }
    }

    #[test]
    fn one_byte_at_a_time() {
        let mut encoded = Vec::new();
        encode(b"custom-value", &mut encoded);

        let mut reader = HuffmanReader::new();
        let mut out = String::new();
        for (i, b) in encoded.iter().enumerate() {
            reader
                .read(std::slice::from_ref(b), &mut out, i == encoded.len() - 1)
                .unwrap();
        }
        assert_eq!(out, "custom-value");
    }

    #[test]
    fn padding_too_long() {
        // 'a' is 00011 (5 bits); a whole extra byte of ones is 11 bits of padding.
        assert_eq!(
            decode_all(&[0x1f, 0xff]),
            Err(HpackError::InvalidHuffman("padding longer than 7 bits"))
        );
    }

    #[test]
    fn padding_not_ones() {
        // '0' is 00000 (5 bits) followed by zero padding.
        assert_eq!(
            decode_all(&[0x00]),
            Err(HpackError::InvalidHuffman("padding is not an EOS prefix"))
        );
    }

    #[test]
    fn eos_in_string() {
        // EOS is 30 ones; four bytes of 0xff contain it.
        assert_eq!(
            decode_all(&[0xff, 0xff, 0xff, 0xff]),
            Err(HpackError::InvalidHuffman("EOS symbol in string"))
        );
    }

    #[test]
    fn reader_resets_after_last_slice() {
        let mut reader = HuffmanReader::new();
        let mut out = String::new();
        reader.read(&[0xa8, 0xeb, 0x10, 0x64, 0x9c, 0xbf], &mut out, true).unwrap();
        reader.read(&[0xa8, 0xeb, 0x10, 0x64, 0x9c, 0xbf], &mut out, true).unwrap();
        assert_eq!(out, "no-cacheno-cache");
    }
}
