//! Per-line work shared by every counting path
//!
//! A worker parses each line of a batch and marks the resulting address in
//! the shared set. Malformed lines either fail the batch or are skipped,
//! depending on the configured policy.

use crate::app::error::CountError;
use crate::app::options::{CountOptions, MalformedPolicy};
use crate::constants::SKIP_WARN_LIMIT;
use crate::domain::address_set::AddressSet;
use crate::domain::lines::Lines;
use crate::domain::parser::OctetMode;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Counters collected by one worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Batches fully processed
    pub batches: u64,
    /// Lines examined
    pub lines: u64,
    /// Malformed lines skipped
    pub skipped: u64,
}

impl WorkerStats {
    /// Combine counters from two workers
    pub fn merged(self, other: Self) -> Self {
        Self {
            batches: self.batches + other.batches,
            lines: self.lines + other.lines,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Run-wide tally of skipped lines
///
/// Shared by every worker of one run so that only the first
/// [`SKIP_WARN_LIMIT`] skipped lines are logged individually, however the
/// input is split.
#[derive(Debug, Default)]
pub struct SkipLog {
    seen: AtomicU64,
}

impl SkipLog {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one skipped line; returns true while it should still be logged
    pub fn record(&self) -> bool {
        self.seen.fetch_add(1, Ordering::Relaxed) < SKIP_WARN_LIMIT
    }

    /// Skipped lines recorded so far
    pub fn total(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    /// Emit the end-of-run warning if any line was skipped
    pub fn report(&self) {
        let skipped = self.total();
        if skipped > 0 {
            warn!(
                skipped,
                logged = skipped.min(SKIP_WARN_LIMIT),
                "skipped malformed lines"
            );
        }
    }
}

/// Parses lines and marks addresses in a shared [`AddressSet`]
#[derive(Clone, Copy)]
pub struct Worker<'a> {
    set: &'a AddressSet,
    skips: &'a SkipLog,
    octet_mode: OctetMode,
    on_malformed: MalformedPolicy,
}

impl<'a> Worker<'a> {
    /// Create a worker writing into `set` and tallying skips in `skips`
    pub fn new(set: &'a AddressSet, skips: &'a SkipLog, options: &CountOptions) -> Self {
        Self {
            set,
            skips,
            octet_mode: options.octet_mode,
            on_malformed: options.on_malformed,
        }
    }

    /// Process every line of one batch
    ///
    /// Under [`MalformedPolicy::Abort`] the first malformed line stops the
    /// batch; addresses marked before it stay marked.
    pub fn process(&self, lines: Lines<'_>, stats: &mut WorkerStats) -> Result<(), CountError> {
        for (offset, line) in lines {
            stats.lines += 1;
            match self.octet_mode.parse(line) {
                Ok(addr) => self.set.mark(addr),
                Err(source) => match self.on_malformed {
                    MalformedPolicy::Abort => {
                        return Err(CountError::malformed(offset, line, source));
                    }
                    MalformedPolicy::Skip => {
                        stats.skipped += 1;
                        if self.skips.record() {
                            warn!(
                                offset,
                                line = %String::from_utf8_lossy(line),
                                %source,
                                "skipping malformed line"
                            );
                        }
                    }
                },
            }
        }
        stats.batches += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_process_marks_addresses() {
        let set = AddressSet::new();
        let skips = SkipLog::new();
        let worker = Worker::new(&set, &skips, &CountOptions::default());
        let mut stats = WorkerStats::default();

        worker
            .process(Lines::new(0, b"1.2.3.4\n1.2.3.4\n5.6.7.8\n"), &mut stats)
            .unwrap();

        assert_eq!(set.count(), 2);
        assert!(set.contains(0x0102_0304));
        assert!(set.contains(0x0506_0708));
        assert_eq!(
            stats,
            WorkerStats {
                batches: 1,
                lines: 3,
                skipped: 0
            }
        );
    }

    #[test]
    #[serial]
    fn test_process_aborts_on_malformed() {
        let set = AddressSet::new();
        let skips = SkipLog::new();
        let worker = Worker::new(&set, &skips, &CountOptions::default());
        let mut stats = WorkerStats::default();

        let err = worker
            .process(Lines::new(40, b"1.1.1.1\n1.2.3\n2.2.2.2\n"), &mut stats)
            .unwrap_err();

        match err {
            CountError::MalformedAddress { offset, line, .. } => {
                assert_eq!(offset, 48);
                assert_eq!(line, "1.2.3");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stats.batches, 0);
        assert!(!set.contains(0x0202_0202));
    }

    #[test]
    #[serial]
    fn test_process_skips_when_configured() {
        let set = AddressSet::new();
        let skips = SkipLog::new();
        let options = CountOptions::default().with_malformed_policy(MalformedPolicy::Skip);
        let worker = Worker::new(&set, &skips, &options);
        let mut stats = WorkerStats::default();

        worker
            .process(Lines::new(0, b"1.2.3\n4.4.4.4\n\n"), &mut stats)
            .unwrap();

        assert_eq!(set.count(), 1);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.skipped, 2);
        assert_eq!(skips.total(), 2);
    }

    #[test]
    fn test_skip_log_caps_logged_lines() {
        let skips = SkipLog::new();
        let logged = (0..20).filter(|_| skips.record()).count() as u64;

        assert_eq!(logged, SKIP_WARN_LIMIT);
        assert_eq!(skips.total(), 20);
    }

    #[test]
    #[serial]
    fn test_skip_log_shared_across_workers() {
        let set = AddressSet::new();
        let skips = SkipLog::new();
        let options = CountOptions::default().with_malformed_policy(MalformedPolicy::Skip);
        let input = b"x\n".repeat(SKIP_WARN_LIMIT as usize);

        let mut total = WorkerStats::default();
        for _ in 0..2 {
            let worker = Worker::new(&set, &skips, &options);
            let mut stats = WorkerStats::default();
            worker.process(Lines::new(0, &input), &mut stats).unwrap();
            total = total.merged(stats);
        }

        assert_eq!(total.skipped, 2 * SKIP_WARN_LIMIT);
        assert_eq!(skips.total(), total.skipped);
        assert!(!skips.record());
    }

    #[test]
    fn test_stats_merge() {
        let a = WorkerStats {
            batches: 1,
            lines: 10,
            skipped: 2,
        };
        let b = WorkerStats {
            batches: 3,
            lines: 5,
            skipped: 0,
        };
        assert_eq!(
            a.merged(b),
            WorkerStats {
                batches: 4,
                lines: 15,
                skipped: 2
            }
        );
    }
}
