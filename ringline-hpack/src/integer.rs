//! Resumable HPACK prefix integer reader (RFC 7541 Section 5.1).
//!
//! ```text
//!   0   1   2   3   4   5   6   7
//! +---+---+---+---+---+---+---+---+
//! | ? | ? | ? | 1   1   1   1   1 |
//! +---+---+---+-------------------+
//! | 1 |    Value-(2^N-1) LSB      |
//! +---+---------------------------+
//!                ...
//! +---+---------------------------+
//! | 0 |    Value-(2^N-1) MSB      |
//! +---+---------------------------+
//! ```

use bytes::Buf;

use crate::error::HpackError;

/// Largest value a prefixed integer may decode to.
pub const MAX_VALUE: u64 = u32::MAX as u64;

/// Highest shift a continuation byte may be applied at. Anything past this
/// cannot fit in [`MAX_VALUE`], even when the payload is zero.
const MAX_SHIFT: u32 = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    New,
    Configured,
    FirstByteRead,
    Done,
}

/// Decodes one N-bit prefixed integer, possibly across many buffers.
#[derive(Debug, Clone)]
pub struct IntegerReader {
    state: State,
    prefix_bits: u8,
    value: u64,
    shift: u32,
}

impl Default for IntegerReader {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerReader {
    pub fn new() -> Self {
        Self {
            state: State::New,
            prefix_bits: 0,
            value: 0,
            shift: 0,
        }
    }

    /// Prepare to read an integer with an `prefix_bits`-bit prefix.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `prefix_bits` is not in `1..=8`.
    pub fn configure(&mut self, prefix_bits: u8) -> &mut Self {
        debug_assert!((1..=8).contains(&prefix_bits), "prefix must be 1..=8 bits");
        self.prefix_bits = prefix_bits;
        self.value = 0;
        self.shift = 0;
        self.state = State::Configured;
        self
    }

    /// Consume bytes from `buf` until the integer is complete.
    ///
    /// Returns `Ok(true)` once the value is available through [`get`](Self::get),
    /// `Ok(false)` if `buf` ran out first. Partial progress is kept.
    pub fn read<B: Buf>(&mut self, buf: &mut B) -> Result<bool, HpackError> {
        debug_assert!(self.state != State::New, "read before configure");

        if self.state == State::Configured {
            if !buf.has_remaining() {
                return Ok(false);
            }
            let max = (1u64 << self.prefix_bits) - 1;
            let prefix = u64::from(buf.get_u8()) & max;
            if prefix < max {
                self.value = prefix;
                self.state = State::Done;
                return Ok(true);
            }
            self.value = max;
            self.state = State::FirstByteRead;
        }

        if self.state == State::FirstByteRead {
            while buf.has_remaining() {
                if self.shift > MAX_SHIFT {
                    return Err(HpackError::IntegerOverflow);
                }
                let b = buf.get_u8();
                self.value += u64::from(b & 0x7f) << self.shift;
                if self.value > MAX_VALUE {
                    return Err(HpackError::IntegerOverflow);
                }
                self.shift += 7;
                if b & 0x80 == 0 {
                    self.state = State::Done;
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        Ok(self.state == State::Done)
    }

    /// The decoded value. Only meaningful after [`read`](Self::read) returned `true`.
    pub fn get(&self) -> usize {
        debug_assert!(self.state == State::Done, "integer not fully read");
        self.value as usize
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Append `value` as an N-bit prefixed integer, with `pattern` in the
/// bits above the prefix.
#[cfg(test)]
pub(crate) fn encode_prefix_int(buf: &mut Vec<u8>, value: u64, prefix_bits: u8, pattern: u8) {
    let max = (1u64 << prefix_bits) - 1;
    if value < max {
        buf.push(pattern | value as u8);
    } else {
        buf.push(pattern | max as u8);
        let mut remaining = value - max;
        while remaining >= 128 {
            buf.push(0x80 | (remaining & 0x7f) as u8);
            remaining >>= 7;
        }
        buf.push(remaining as u8);
    }
}
