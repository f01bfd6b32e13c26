//! HPACK header table (RFC 7541 Section 2.3).
//!
//! One index space over two regions:
//!
//! ```text
//!   <----------  Index Address Space ---------->
//!   <-- Static  Table -->  <-- Dynamic Table -->
//!   +---+-----------+---+  +---+-----------+---+
//!   | 1 |    ...    | 61|  | 62|    ...    | n |
//!   +---+-----------+---+  +---+-----------+---+
//!                          ^                   |
//!                          |                   V
//!                   Insertion Point      Dropping Point
//! ```
//!
//! Reverse lookups into the dynamic region do not shift anything on insert.
//! Every inserted entry is stamped with a monotonically increasing insertion
//! counter, and its current index is derived from the distance between that
//! stamp and the live counter. Insert, evict and lookup are all O(1)
//! amortized. The counter is a `u64` and is never recalibrated; wrapping it
//! would take 2^64 insertions.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::error::HpackError;
use crate::iso_8859_1;
use crate::metrics;
use crate::ring::CircularBuffer;
use crate::static_table::{self, STATIC_TABLE_LEN};

/// Per-entry overhead added to every dynamic table entry (RFC 7541 Section 4.1).
pub const ENTRY_OVERHEAD: usize = 32;

/// A single header name-value pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Size of this header field for dynamic table accounting.
    /// Size = len(name) + len(value) + 32, lengths in octets.
    pub fn size(&self) -> usize {
        entry_size(&self.name, &self.value)
    }

    pub fn into_parts(self) -> (String, String) {
        (self.name, self.value)
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

pub(crate) fn entry_size(name: &str, value: &str) -> usize {
    iso_8859_1::octet_len(name) + iso_8859_1::octet_len(value) + ENTRY_OVERHEAD
}

/// Result of a reverse lookup with [`HeaderTable::index_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMatch {
    /// Both name and value match the entry at this index.
    Exact(usize),
    /// Only the name matches the entry at this index.
    Name(usize),
    /// Nothing matches.
    None,
}

impl TableMatch {
    /// Signed form: positive for an exact match, negative for a name-only
    /// match, zero for none.
    pub fn to_signed(self) -> i64 {
        match self {
            Self::Exact(index) => index as i64,
            Self::Name(index) => -(index as i64),
            Self::None => 0,
        }
    }
}

/// Insertion stamps of the live dynamic entries sharing one name,
/// oldest at the front.
#[derive(Debug, Default)]
struct NameStamps {
    all: VecDeque<u64>,
    by_value: HashMap<String, VecDeque<u64>>,
}

/// Static plus dynamic table with a single 1-based index space.
#[derive(Debug)]
pub struct HeaderTable {
    entries: CircularBuffer<HeaderField>,
    stamps: HashMap<String, NameStamps>,
    /// Stamp the next inserted entry receives.
    counter: u64,
    size: usize,
    max_size: usize,
}

impl HeaderTable {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: CircularBuffer::with_capacity(slots_for(max_size)),
            stamps: HashMap::new(),
            counter: 0,
            size: 0,
            max_size,
        }
    }

    /// Get the field at a 1-based index.
    pub fn get(&self, index: usize) -> Result<&HeaderField, HpackError> {
        let out_of_range = HpackError::IndexOutOfRange {
            index,
            len: self.len(),
        };
        match index {
            0 => Err(out_of_range),
            1..=STATIC_TABLE_LEN => Ok(&static_table::fields()[index - 1]),
            _ => self
                .entries
                .get(index - STATIC_TABLE_LEN - 1)
                .ok_or(out_of_range),
        }
    }

    /// Insert a new entry at the front of the dynamic table.
    ///
    /// Entries are evicted from the back until the new one fits. An entry
    /// larger than the maximum size empties the table and is not added.
    ///
    /// `name` and `value` must be ISO-8859-1 text (no character above
    /// U+00FF), as every decoded literal is: sizes count one octet per
    /// character. Debug builds panic otherwise.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let field = HeaderField::new(name, value);
        debug_assert!(
            iso_8859_1::is_representable(&field.name) && iso_8859_1::is_representable(&field.value),
            "dynamic table entries must be ISO-8859-1 text"
        );
        let entry_size = field.size();
        if entry_size > self.max_size {
            tracing::trace!(
                entry_size,
                max_size = self.max_size,
                "header field larger than table, emptying"
            );
            self.clear();
            return;
        }
        while self.size + entry_size > self.max_size {
            self.evict_oldest();
        }

        let stamp = self.counter;
        self.counter += 1;
        let names = self.stamps.entry(field.name.clone()).or_default();
        names.all.push_back(stamp);
        names
            .by_value
            .entry(field.value.clone())
            .or_default()
            .push_back(stamp);

        self.entries.push(field);
        self.size += entry_size;
        metrics::TABLE_INSERTED.increment();
    }

    /// Set the maximum size, evicting oldest entries until the table fits.
    pub fn set_max_size(&mut self, max_size: usize) {
        let before = self.entries.len();
        while self.size > max_size {
            self.evict_oldest();
        }
        let evicted = before - self.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, max_size, "dynamic table shrunk");
        }
        self.max_size = max_size;
        self.entries.resize(slots_for(max_size));
    }

    /// Find the best index for `(name, value)`.
    ///
    /// Preference order: static exact, dynamic exact, static name, dynamic
    /// name. Among dynamic entries the most recent one wins.
    pub fn index_of(&self, name: &str, value: &str) -> TableMatch {
        let static_name = static_table::reverse_index().get(name);
        let dynamic_name = self.stamps.get(name);

        if let Some(&index) = static_name.and_then(|s| s.values.get(value)) {
            return TableMatch::Exact(index);
        }
        if let Some(&stamp) = dynamic_name
            .and_then(|d| d.by_value.get(value))
            .and_then(|stamps| stamps.back())
        {
            return TableMatch::Exact(self.index_of_stamp(stamp));
        }
        if let Some(s) = static_name {
            return TableMatch::Name(s.first);
        }
        if let Some(&stamp) = dynamic_name.and_then(|d| d.all.back()) {
            return TableMatch::Name(self.index_of_stamp(stamp));
        }
        TableMatch::None
    }

    /// Number of addressable entries, static and dynamic.
    pub fn len(&self) -> usize {
        STATIC_TABLE_LEN + self.entries.len()
    }

    /// Always false: the static table is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of entries in the dynamic table.
    pub fn dynamic_len(&self) -> usize {
        self.entries.len()
    }

    /// Accounted size of the dynamic table in octets.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn index_of_stamp(&self, stamp: u64) -> usize {
        STATIC_TABLE_LEN + (self.counter - stamp) as usize
    }

    fn evict_oldest(&mut self) {
        let oldest_stamp = self.counter - self.entries.len() as u64;
        let Some(field) = self.entries.pop_oldest() else {
            return;
        };
        self.size -= field.size();

        if let Some(names) = self.stamps.get_mut(&field.name) {
            let popped = names.all.pop_front();
            debug_assert_eq!(popped, Some(oldest_stamp));
            if let Some(values) = names.by_value.get_mut(&field.value) {
                values.pop_front();
                if values.is_empty() {
                    names.by_value.remove(&field.value);
                }
            }
            if names.all.is_empty() {
                self.stamps.remove(&field.name);
            }
        }
        metrics::TABLE_EVICTED.increment();
    }

    fn clear(&mut self) {
        while !self.entries.is_empty() {
            self.evict_oldest();
        }
    }
}

/// Ring slots needed for `max_size`: every entry costs at least 32 octets.
fn slots_for(max_size: usize) -> usize {
    max_size / ENTRY_OVERHEAD + 1
}
