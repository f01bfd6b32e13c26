//! HPACK decoder metrics.
//!
//! Process-wide counters across every decoder instance, exposed via
//! Prometheus when registered with the admin server.

use metriken::{Counter, metric};

// ── Decoding ─────────────────────────────────────────────────────

#[metric(
    name = "ringline/hpack/fields/decoded",
    description = "Total header fields decoded"
)]
pub static FIELDS_DECODED: Counter = Counter::new();

#[metric(
    name = "ringline/hpack/blocks/decoded",
    description = "Total header blocks decoded to completion"
)]
pub static BLOCKS_DECODED: Counter = Counter::new();

#[metric(
    name = "ringline/hpack/errors",
    description = "Total decode errors (each one poisons its decoder)"
)]
pub static DECODE_ERRORS: Counter = Counter::new();

// ── Dynamic table ────────────────────────────────────────────────

#[metric(
    name = "ringline/hpack/table/inserted",
    description = "Total entries inserted into a dynamic table"
)]
pub static TABLE_INSERTED: Counter = Counter::new();

#[metric(
    name = "ringline/hpack/table/evicted",
    description = "Total entries evicted from a dynamic table"
)]
pub static TABLE_EVICTED: Counter = Counter::new();

#[metric(
    name = "ringline/hpack/table/size_updates",
    description = "Total dynamic table size updates received"
)]
pub static SIZE_UPDATES: Counter = Counter::new();
