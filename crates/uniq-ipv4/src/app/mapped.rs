//! Memory-mapped count path
//!
//! Alternative to the streaming pipeline: the input is mapped, split into
//! line-aligned segments of about `buffer_size` bytes and the segments are
//! processed on a dedicated rayon pool of `worker_count` threads. Results and
//! errors match [`count_unique_with_summary`](crate::app::pipeline::count_unique_with_summary).

use crate::app::error::CountError;
use crate::app::options::CountOptions;
use crate::app::pipeline::CountSummary;
use crate::app::worker::{SkipLog, Worker, WorkerStats};
use crate::domain::address_set::AddressSet;
use crate::domain::lines::Lines;
use crate::infra::mapped_input::{MappedInput, line_aligned_segments};
use rayon::prelude::*;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Count distinct addresses in the file at `path` through a memory mapping
pub fn count_unique_mapped(
    path: impl AsRef<Path>,
    options: &CountOptions,
) -> Result<CountSummary, CountError> {
    options.validate()?;
    let path = path.as_ref();
    let input = MappedInput::open(path).map_err(|e| CountError::io(path, e))?;

    if input.is_empty() {
        debug!(path = %path.display(), "empty input, nothing to map");
        return Ok(CountSummary::default());
    }

    let data = input.as_bytes();
    let segments = line_aligned_segments(data, options.buffer_size);
    debug!(
        path = %path.display(),
        bytes = data.len(),
        segments = segments.len(),
        workers = options.worker_count,
        "mapped input split"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.worker_count)
        .thread_name(|i| format!("uniq-ipv4-mapped-{i}"))
        .build()
        .map_err(|e| CountError::Spawn(io::Error::other(e)))?;

    let set = AddressSet::new();
    let skips = SkipLog::new();
    let worker = Worker::new(&set, &skips, options);

    let stats = pool.install(|| {
        segments
            .par_iter()
            .map(|range| {
                let mut stats = WorkerStats::default();
                let lines = Lines::new(range.start as u64, &data[range.clone()]);
                worker.process(lines, &mut stats).map(|()| stats)
            })
            .try_reduce(WorkerStats::default, |a, b| Ok(a.merged(b)))
    })?;

    let summary = CountSummary {
        unique: set.count(),
        lines: stats.lines,
        skipped: stats.skipped,
        bytes: data.len() as u64,
    };
    info!(
        unique = summary.unique,
        lines = summary.lines,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "mapped count complete"
    );
    skips.report();

    Ok(summary)
}
