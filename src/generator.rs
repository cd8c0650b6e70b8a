//! Time-based identifier generator and related types.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::timestamp::{self, TICKS_PER_MILLI};
use crate::{node, Tuid};

/// A trait that defines the minimum wall-clock interface for [`V1Generator`].
pub trait TimeSource {
    /// Returns the current Unix time in milliseconds.
    fn unix_ts_ms(&self) -> i64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn unix_ts_ms(&self) -> i64 {
        (**self).unix_ts_ms()
    }
}

/// The default time source backed by [`SystemTime`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock may have gone backwards")
            .as_millis() as i64
    }
}

/// Represents a time-based identifier generator that guarantees strictly increasing
/// timestamp fields across every identifier it issues.
///
/// The generator owns the last-issued-tick cell, so the strict-increase guarantee spans
/// exactly the identifiers drawn from one instance; the process-wide [`tuid()`] entry point
/// funnels all callers through a single shared instance. Generation goes through `&self`
/// with a lock-free compare-and-swap loop, so an instance can be shared between threads
/// without a mutex. The time source is an injectable trait for deterministic tests.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use tuid::V1Generator;
///
/// let g = V1Generator::new();
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = &g;
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.generate(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
///
/// [`tuid()`]: crate::tuid
#[derive(Debug)]
pub struct V1Generator<T = StdSystemTime> {
    /// The last issued tick value, zero meaning "never issued".
    last_ticks: AtomicU64,
    clock_seq: u16,
    node: u64,

    /// The wall clock consulted by the generator.
    time_source: T,
}

impl V1Generator<StdSystemTime> {
    /// Creates a generator driven by the system clock.
    pub fn new() -> Self {
        Self::with_time_source(StdSystemTime)
    }
}

impl Default for V1Generator<StdSystemTime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TimeSource> V1Generator<T> {
    /// Creates a generator driven by a custom time source.
    pub fn with_time_source(time_source: T) -> Self {
        Self {
            last_ticks: AtomicU64::new(0),
            clock_seq: process_clock_seq(),
            node: node::node_id(),
            time_source,
        }
    }

    /// Generates a new time-based identifier.
    ///
    /// The timestamp field of each identifier is strictly greater than that of every
    /// identifier previously issued by this generator, even when the underlying clock reads
    /// the same millisecond repeatedly or steps backwards.
    pub fn generate(&self) -> Tuid {
        Tuid::from_fields_v1(self.next_ticks(), self.clock_seq, self.node)
    }

    /// Issues the next tick value, strictly greater than every tick issued before.
    ///
    /// Fresh wall-clock readings win directly. A reading at or behind the last issued tick
    /// either spills into the spare sub-millisecond ticks of the current bucket, or, when
    /// the clock has fallen a full millisecond behind (a real rollback), keeps counting up
    /// from the stale sequence until wall-clock time catches up again.
    fn next_ticks(&self) -> u64 {
        loop {
            let now = timestamp::ticks_from_unix_millis(self.time_source.unix_ts_ms());
            let last = self.last_ticks.load(Ordering::Relaxed);

            if now > last {
                if self
                    .last_ticks
                    .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
                {
                    return now;
                }
                continue;
            }

            let last_millis = last / TICKS_PER_MILLI;
            if now / TICKS_PER_MILLI < last_millis {
                return self.last_ticks.fetch_add(1, Ordering::Relaxed) + 1;
            }

            let candidate = last + 1;
            if candidate / TICKS_PER_MILLI == last_millis
                && self
                    .last_ticks
                    .compare_exchange(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            {
                return candidate;
            }
        }
    }
}

/// Supports operations as an infinite iterator that produces a new identifier for each call
/// of `next()`.
///
/// # Examples
///
/// ```rust
/// use tuid::V1Generator;
///
/// V1Generator::new()
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<T: TimeSource> Iterator for V1Generator<T> {
    type Item = Tuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<T: TimeSource> std::iter::FusedIterator for V1Generator<T> {}

/// Returns the 14-bit clock sequence of the running process, sampling a high-resolution
/// timer on first use.
fn process_clock_seq() -> u16 {
    static SEQ: OnceLock<u16> = OnceLock::new();
    *SEQ.get_or_init(|| {
        let sample = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock may have gone backwards")
            .as_nanos() as u64;
        (sample & 0x3fff) as u16
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::{TimeSource, V1Generator};
    use crate::timestamp::{self, TICKS_PER_MILLI};

    /// A time source pinned to an externally controlled millisecond value.
    struct ManualTime(AtomicI64);

    impl ManualTime {
        fn new(unix_ts_ms: i64) -> Self {
            Self(AtomicI64::new(unix_ts_ms))
        }

        fn set(&self, unix_ts_ms: i64) {
            self.0.store(unix_ts_ms, Ordering::Relaxed);
        }
    }

    impl TimeSource for ManualTime {
        fn unix_ts_ms(&self) -> i64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    /// A time source whose reading advances one millisecond per 10,000 samples, modeling a
    /// clock outpaced by a generation burst.
    struct SteppingTime {
        base: i64,
        samples: AtomicI64,
    }

    impl SteppingTime {
        fn new(unix_ts_ms: i64) -> Self {
            Self {
                base: unix_ts_ms,
                samples: AtomicI64::new(0),
            }
        }
    }

    impl TimeSource for SteppingTime {
        fn unix_ts_ms(&self) -> i64 {
            self.base + self.samples.fetch_add(1, Ordering::Relaxed) / 10_000
        }
    }

    /// Issues ticks matching a normally advancing clock
    #[test]
    fn issues_ticks_matching_a_normally_advancing_clock() {
        let clock = ManualTime::new(1_700_000_000_000);
        let g = V1Generator::with_time_source(&clock);

        let first = g.generate();
        assert_eq!(first.to_unix_millis(), Ok(1_700_000_000_000));

        clock.set(1_700_000_000_001);
        let second = g.generate();
        assert_eq!(second.to_unix_millis(), Ok(1_700_000_000_001));
        assert_eq!(
            second.timestamp().unwrap(),
            timestamp::ticks_from_unix_millis(1_700_000_000_001)
        );
    }

    /// Issues increasing ticks across a clock rollback and recovers
    #[test]
    fn issues_increasing_ticks_across_a_clock_rollback_and_recovers() {
        let t0 = 1_700_000_000_000;
        let clock = ManualTime::new(t0);
        let g = V1Generator::with_time_source(&clock);

        let mut prev = g.generate().timestamp().unwrap();

        clock.set(t0 - 5_000);
        for _ in 0..50_000 {
            let curr = g.generate().timestamp().unwrap();
            assert!(curr > prev);
            prev = curr;
        }

        // once wall-clock time exceeds the last issued tick, real time takes over again
        clock.set(t0 + 10_000);
        let resumed = g.generate();
        assert_eq!(resumed.to_unix_millis(), Ok(t0 + 10_000));
        assert!(resumed.timestamp().unwrap() > prev);
    }

    /// Fills spare sub-millisecond ticks within one millisecond bucket
    #[test]
    fn fills_spare_sub_millisecond_ticks_within_one_millisecond_bucket() {
        let t0 = 1_700_000_000_000;
        let clock = ManualTime::new(t0);
        let g = V1Generator::with_time_source(&clock);

        let first = g.generate().timestamp().unwrap();
        for expected in 1..1_000 {
            assert_eq!(g.generate().timestamp().unwrap(), first + expected);
        }
    }

    /// Spills into the next millisecond bucket when ticks exhaust
    #[test]
    fn spills_into_the_next_millisecond_bucket_when_ticks_exhaust() {
        let clock = SteppingTime::new(1_700_000_000_000);
        let g = V1Generator::with_time_source(&clock);

        let mut ticks = Vec::with_capacity(25_000);
        for _ in 0..25_000 {
            ticks.push(g.generate().timestamp().unwrap());
        }

        for pair in ticks.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        let first_bucket = ticks[0] / TICKS_PER_MILLI;
        let last_bucket = ticks[ticks.len() - 1] / TICKS_PER_MILLI;
        assert!(last_bucket > first_bucket);
    }

    /// Issues a million unique identifiers across eight threads
    #[test]
    fn issues_a_million_unique_identifiers_across_eight_threads() {
        use std::collections::HashSet;
        use std::thread;

        const THREADS: usize = 8;
        const PER_THREAD: usize = 125_000;

        let g = V1Generator::new();
        let batches: Vec<Vec<crate::Tuid>> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let g = &g;
                    s.spawn(move || {
                        let mut batch = Vec::with_capacity(PER_THREAD);
                        for _ in 0..PER_THREAD {
                            batch.push(g.generate());
                        }
                        batch
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for batch in &batches {
            for pair in batch.windows(2) {
                assert!(pair[0].timestamp().unwrap() < pair[1].timestamp().unwrap());
            }
        }

        let unique: HashSet<[u8; 16]> = batches
            .iter()
            .flatten()
            .map(|e| *e.as_bytes())
            .collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD);
    }
}
