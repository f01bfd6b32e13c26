//! Streaming HPACK decoder (RFC 7541 Section 6).
//!
//! A header block may arrive in any number of chunks, split at arbitrary
//! byte positions. [`Decoder::decode`] consumes what it is given and keeps
//! the partially read instruction for the next call.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Buf;

use crate::callback::{DecodingCallback, HeaderList};
use crate::config::DecoderConfig;
use crate::error::HpackError;
use crate::integer::IntegerReader;
use crate::metrics;
use crate::string::StringReader;
use crate::table::{HeaderField, HeaderTable, entry_size};

static DECODER_IDS: AtomicU64 = AtomicU64::new(0);

/// Representation selected by the first byte of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instruction {
    /// `1xxxxxxx`
    Indexed,
    /// `01xxxxxx`
    LiteralWithIndexing,
    /// `001xxxxx`
    SizeUpdate,
    /// `0001xxxx`
    LiteralNeverIndexed,
    /// `0000xxxx`
    Literal,
}

const INSTRUCTIONS: [Instruction; 256] = classify_all();

const fn classify_all() -> [Instruction; 256] {
    let mut table = [Instruction::Literal; 256];
    let mut b = 0;
    while b < 256 {
        table[b] = if b & 0x80 != 0 {
            Instruction::Indexed
        } else if b & 0x40 != 0 {
            Instruction::LiteralWithIndexing
        } else if b & 0x20 != 0 {
            Instruction::SizeUpdate
        } else if b & 0x10 != 0 {
            Instruction::LiteralNeverIndexed
        } else {
            Instruction::Literal
        };
        b += 1;
    }
    table
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Indexed,
    Literal,
    LiteralWithIndexing,
    LiteralNeverIndexed,
    SizeUpdate,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Ready => "ready",
            State::Indexed => "indexed",
            State::Literal => "literal",
            State::LiteralWithIndexing => "literal with indexing",
            State::LiteralNeverIndexed => "literal never indexed",
            State::SizeUpdate => "size update",
        }
    }
}

/// HPACK decoder for one direction of one connection.
///
/// Owns the dynamic table. Decoding errors are fatal: after the first one
/// every call to [`decode`](Self::decode) fails with [`HpackError::Poisoned`].
#[derive(Debug)]
pub struct Decoder {
    id: u64,
    table: HeaderTable,
    state: State,
    integer: IntegerReader,
    string: StringReader,

    // Scratch for the instruction in progress.
    name: String,
    value: String,
    int_value: usize,
    first_value_read: bool,
    first_value_index: bool,
    name_huffman: bool,
    value_huffman: bool,

    /// Ceiling for size updates, agreed out of band.
    capacity: usize,
    max_header_list_size: Option<usize>,
    max_literal_with_indexing: Option<usize>,

    // Per-block accounting.
    header_list_size: usize,
    literals_with_indexing: usize,
    accept_size_update: bool,

    poisoned: bool,
}

impl Decoder {
    /// Create a decoder whose dynamic table starts at, and may grow up to,
    /// `capacity` octets.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(DecoderConfig::with_header_table_size(capacity))
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        let id = DECODER_IDS.fetch_add(1, Ordering::Relaxed) + 1;
        let capacity = config.header_table_size;
        tracing::debug!(
            decoder = id,
            capacity,
            max_header_list_size = ?config.max_header_list_size,
            max_literal_with_indexing = ?config.max_literal_with_indexing,
            "decoder created"
        );
        Self {
            id,
            table: HeaderTable::new(capacity),
            state: State::Ready,
            integer: IntegerReader::new(),
            string: StringReader::new(),
            name: String::new(),
            value: String::new(),
            int_value: 0,
            first_value_read: false,
            first_value_index: false,
            name_huffman: false,
            value_huffman: false,
            capacity,
            max_header_list_size: config.max_header_list_size,
            max_literal_with_indexing: config.max_literal_with_indexing,
            header_list_size: 0,
            literals_with_indexing: 0,
            accept_size_update: true,
            poisoned: false,
        }
    }

    /// Set the capacity ceiling (SETTINGS_HEADER_TABLE_SIZE).
    ///
    /// The table itself is only resized when the peer acknowledges the new
    /// limit with a dynamic table size update.
    pub fn set_max_capacity(&mut self, capacity: usize) {
        tracing::debug!(decoder = self.id, capacity, "max capacity set");
        self.capacity = capacity;
    }

    pub fn max_capacity(&self) -> usize {
        self.capacity
    }

    pub fn table(&self) -> &HeaderTable {
        &self.table
    }

    /// Whether a previous error made this decoder unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Decode as much of `buf` as possible, calling `callback` for each
    /// complete instruction.
    ///
    /// `end_of_block` marks `buf` as the final chunk of the header block;
    /// the block must then end on an instruction boundary.
    pub fn decode<B: Buf, C: DecodingCallback>(
        &mut self,
        buf: &mut B,
        end_of_block: bool,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        if self.poisoned {
            return Err(HpackError::Poisoned.into());
        }
        let result = self.decode_chunk(buf, end_of_block, callback);
        if result.is_err() {
            self.poisoned = true;
            metrics::DECODE_ERRORS.increment();
            tracing::debug!(decoder = self.id, state = self.state.name(), "decode failed");
        }
        result
    }

    /// Decode one complete header block into a list of fields.
    pub fn decode_block(&mut self, mut block: &[u8]) -> Result<Vec<HeaderField>, HpackError> {
        let mut list = HeaderList::new();
        self.decode(&mut block, true, &mut list)?;
        Ok(list.into_fields())
    }

    fn decode_chunk<B: Buf, C: DecodingCallback>(
        &mut self,
        buf: &mut B,
        end_of_block: bool,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        while buf.has_remaining() {
            match self.state {
                State::Ready => self.resume_ready(buf)?,
                State::Indexed => self.resume_indexed(buf, callback)?,
                State::Literal | State::LiteralWithIndexing | State::LiteralNeverIndexed => {
                    self.resume_literal(buf, callback)?
                }
                State::SizeUpdate => self.resume_size_update(buf, callback)?,
            }
        }

        if end_of_block {
            if self.state != State::Ready {
                return Err(HpackError::UnexpectedEndOfBlock {
                    state: self.state.name(),
                }
                .into());
            }
            self.header_list_size = 0;
            self.literals_with_indexing = 0;
            self.accept_size_update = true;
            metrics::BLOCKS_DECODED.increment();
        }
        Ok(())
    }

    fn resume_ready<B: Buf>(&mut self, buf: &mut B) -> Result<(), HpackError> {
        let b = buf.chunk()[0];
        let instruction = INSTRUCTIONS[b as usize];
        let (state, prefix_bits) = match instruction {
            Instruction::Indexed => (State::Indexed, 7),
            Instruction::LiteralWithIndexing => (State::LiteralWithIndexing, 6),
            Instruction::SizeUpdate => {
                if !self.accept_size_update {
                    return Err(HpackError::UnexpectedSizeUpdate);
                }
                (State::SizeUpdate, 5)
            }
            Instruction::LiteralNeverIndexed => (State::LiteralNeverIndexed, 4),
            Instruction::Literal => (State::Literal, 4),
        };
        if instruction != Instruction::SizeUpdate {
            self.accept_size_update = false;
        }

        self.state = state;
        let mask = (1u8 << prefix_bits) - 1;
        self.first_value_index = b & mask != 0;
        let literal = !matches!(state, State::Indexed | State::SizeUpdate);
        if literal && !self.first_value_index {
            // A new name follows; the first byte carries nothing else.
            buf.advance(1);
        } else {
            // The integer reader consumes the first byte itself.
            self.integer.configure(prefix_bits);
        }
        Ok(())
    }

    fn resume_indexed<B: Buf, C: DecodingCallback>(
        &mut self,
        buf: &mut B,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        if !self.integer.read(buf)? {
            return Ok(());
        }
        let index = self.integer.get();
        self.integer.reset();
        self.state = State::Ready;

        let field = self.table.get(index)?;
        tracing::trace!(decoder = self.id, index, "indexed field");
        account_field(
            &mut self.header_list_size,
            self.max_header_list_size,
            field.size(),
            callback,
        )?;
        callback.on_indexed(index, field.name(), field.value())?;
        metrics::FIELDS_DECODED.increment();
        Ok(())
    }

    fn resume_literal<B: Buf, C: DecodingCallback>(
        &mut self,
        buf: &mut B,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        if !self.complete_reading(buf)? {
            return Ok(());
        }
        let kind = self.state;
        self.state = State::Ready;

        let index = self.first_value_index.then_some(self.int_value);
        if let Some(index) = index {
            let field = self.table.get(index)?;
            self.name.clear();
            self.name.push_str(field.name());
        }
        tracing::trace!(decoder = self.id, ?index, kind = kind.name(), "literal field");

        if kind == State::LiteralWithIndexing {
            self.literals_with_indexing += 1;
            if let Some(max) = self
                .max_literal_with_indexing
                .filter(|&max| self.literals_with_indexing > max)
            {
                callback.on_max_literal_with_indexing_reached(self.literals_with_indexing, max)?;
            }
        }
        account_field(
            &mut self.header_list_size,
            self.max_header_list_size,
            entry_size(&self.name, &self.value),
            callback,
        )?;

        let (name, value) = (self.name.as_str(), self.value.as_str());
        let (name_huffman, value_huffman) = (self.name_huffman, self.value_huffman);
        match kind {
            State::Literal => {
                callback.on_literal(index, name, name_huffman, value, value_huffman)?;
            }
            State::LiteralNeverIndexed => {
                callback.on_literal_never_indexed(index, name, name_huffman, value, value_huffman)?;
            }
            _ => {
                callback.on_literal_with_indexing(index, name, name_huffman, value, value_huffman)?;
                self.table
                    .put(std::mem::take(&mut self.name), std::mem::take(&mut self.value));
            }
        }
        metrics::FIELDS_DECODED.increment();
        self.clear_scratch();
        Ok(())
    }

    fn resume_size_update<B: Buf, C: DecodingCallback>(
        &mut self,
        buf: &mut B,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        if !self.integer.read(buf)? {
            return Ok(());
        }
        let max_size = self.integer.get();
        self.integer.reset();
        self.state = State::Ready;

        if max_size > self.capacity {
            return Err(HpackError::SizeUpdateTooLarge {
                requested: max_size,
                capacity: self.capacity,
            }
            .into());
        }
        tracing::debug!(
            decoder = self.id,
            max_size,
            previous = self.table.max_size(),
            "dynamic table size update"
        );
        metrics::SIZE_UPDATES.increment();
        callback.on_size_update(max_size)?;
        self.table.set_max_size(max_size);
        Ok(())
    }

    /// Read the name (or name index) and then the value of a literal.
    /// Both halves may be spread over any number of calls.
    fn complete_reading<B: Buf>(&mut self, buf: &mut B) -> Result<bool, HpackError> {
        if !self.first_value_read {
            if self.first_value_index {
                if !self.integer.read(buf)? {
                    return Ok(false);
                }
                self.int_value = self.integer.get();
                self.integer.reset();
            } else {
                if !self.string.read(buf, &mut self.name)? {
                    return Ok(false);
                }
                self.name_huffman = self.string.is_huffman_encoded();
                self.string.reset();
            }
            self.first_value_read = true;
        }

        if !self.string.read(buf, &mut self.value)? {
            return Ok(false);
        }
        self.value_huffman = self.string.is_huffman_encoded();
        self.string.reset();
        Ok(true)
    }

    fn clear_scratch(&mut self) {
        self.name.clear();
        self.value.clear();
        self.int_value = 0;
        self.first_value_read = false;
        self.first_value_index = false;
        self.name_huffman = false;
        self.value_huffman = false;
    }
}

/// Add a decoded field to the running header list size and report when it
/// goes over the limit.
fn account_field<C: DecodingCallback>(
    total: &mut usize,
    max: Option<usize>,
    size: usize,
    callback: &mut C,
) -> Result<(), C::Error> {
    *total = total.saturating_add(size);
    match max {
        Some(max) if *total > max => callback.on_max_header_list_size_reached(*total, max),
        _ => Ok(()),
    }
}
