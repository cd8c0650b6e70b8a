//! A process-local generator of time-ordered, globally unique 128-bit identifiers
//!
//! ```rust
//! use tuid::tuid;
//!
//! let id = tuid();
//! println!("{}", id); // e.g. "599c6000-918e-11f1-ae81-9d27b10ef5d3"
//! println!("{:?}", id.as_bytes()); // as 16-byte big-endian array
//! ```
//!
//! Identifiers embed a fine-grained timestamp so they sort chronologically, and they stay
//! strictly increasing within a process even when the system clock steps backwards or when
//! bursts exceed the timestamp resolution.
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the standard time-based (version 1) layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |       time_high       |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |          node (47-32)         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          node (31-0)                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - `time_low`, `time_mid`, and `time_high` together hold a 60-bit count of 100-nanosecond
//!   ticks since 1582-10-15T00:00:00Z (the Gregorian reform date), low 32 bits first.
//! - The 4-bit `ver` field is set at `0001`.
//! - The 2-bit `var` field is set at `10`.
//! - The 14-bit `clock_seq` field holds a per-process value sampled once from a
//!   high-resolution timer, reducing the collision probability between processes whose node
//!   values coincide.
//! - The 48-bit `node` field holds a SHA-256 fingerprint of machine-identity signals
//!   (addresses, host names, platform strings, process identity) with the multicast bit
//!   forced on, so a derived node can never collide with a burned-in hardware address.
//!
//! Generation never returns two equal identifiers within one generator: the tick sequencer
//! is a lock-free compare-and-swap loop over the last issued tick, which spills into spare
//! sub-millisecond ticks during bursts and keeps counting up from the stale sequence while
//! the wall clock lags behind after a rollback.
//!
//! # Crate features
//!
//! - `global_gen` (default): enables the process-wide generator behind [`tuid()`].
//! - `serde`: serializes identifiers as canonical strings in human-readable formats and as
//!   opaque 16-byte values in compact binary formats.
//! - `uuid`: lossless conversions to and from [`uuid::Uuid`].

mod id;
pub use id::{ParseError, Tuid, Variant};

pub mod generator;
pub use generator::V1Generator;

pub mod timestamp;
pub use timestamp::InvalidFormat;

mod node;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::tuid;
