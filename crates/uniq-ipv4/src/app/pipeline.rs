//! Streaming count pipeline
//!
//! One producer (the calling thread) reads the input with a [`ChunkReader`]
//! and pushes chunks of whole lines into a bounded queue. `worker_count`
//! scoped worker threads drain the queue, parse every line and mark it in a
//! shared [`AddressSet`]. A full queue blocks the producer, which bounds the
//! memory held in flight.
//!
//! The set is only counted after every worker has been joined. Any failure
//! (I/O, malformed line, worker panic) stops the producer, lets the workers
//! abandon their remaining chunks and is returned instead of a count.

use crate::app::error::CountError;
use crate::app::options::CountOptions;
use crate::app::worker::{SkipLog, Worker, WorkerStats};
use crate::domain::address_set::AddressSet;
use crate::domain::lines::LineChunk;
use crate::infra::chunk_reader::ChunkReader;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{debug, info};

/// Result of a successful counting run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountSummary {
    /// Number of distinct addresses
    pub unique: u64,
    /// Number of lines examined
    pub lines: u64,
    /// Malformed lines skipped (always 0 under the abort policy)
    pub skipped: u64,
    /// Input bytes consumed
    pub bytes: u64,
}

/// Count distinct addresses in the file at `path`
pub fn count_unique(path: impl AsRef<Path>, options: &CountOptions) -> Result<u64, CountError> {
    count_unique_with_summary(path, options).map(|summary| summary.unique)
}

/// Count distinct addresses in the file at `path`, with run counters
pub fn count_unique_with_summary(
    path: impl AsRef<Path>,
    options: &CountOptions,
) -> Result<CountSummary, CountError> {
    options.validate()?;
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CountError::io(path, e))?;
    run(file, path, options)
}

/// Count distinct addresses read from an arbitrary source
pub fn count_unique_from_reader(
    source: impl Read,
    options: &CountOptions,
) -> Result<CountSummary, CountError> {
    options.validate()?;
    run(source, Path::new("<reader>"), options)
}

fn run<R: Read>(
    source: R,
    path: &Path,
    options: &CountOptions,
) -> Result<CountSummary, CountError> {
    debug!(
        path = %path.display(),
        workers = options.worker_count,
        buffer_size = options.buffer_size,
        queue_capacity = options.queue_capacity,
        "pipeline created"
    );

    let set = AddressSet::new();
    let skips = SkipLog::new();
    let abort = AtomicBool::new(false);
    let mut reader = ChunkReader::new(source, options.buffer_size);
    let (tx, rx) = bounded::<LineChunk>(options.queue_capacity);

    let (fed, joined) = thread::scope(|s| {
        let worker = Worker::new(&set, &skips, options);
        let mut handles = Vec::with_capacity(options.worker_count);
        let mut spawn_error = None;

        for worker_idx in 0..options.worker_count {
            let rx = rx.clone();
            let abort = &abort;
            let spawned = thread::Builder::new()
                .name(format!("uniq-ipv4-worker-{worker_idx}"))
                .spawn_scoped(s, move || drain(worker_idx, worker, rx, abort));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    spawn_error = Some(CountError::Spawn(e));
                    break;
                }
            }
        }

        // Workers hold the only receivers, so a send fails once all of them exit.
        drop(rx);

        let fed = match spawn_error {
            Some(e) => Err(e),
            None => {
                debug!("pipeline reading");
                feed(&mut reader, &tx, &abort).map_err(|e| CountError::io(path, e))
            }
        };
        if fed.is_err() {
            abort.store(true, Ordering::Relaxed);
        }
        drop(tx);

        let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
        (fed, joined)
    });

    let mut stats = WorkerStats::default();
    let mut worker_error = None;
    for result in joined {
        match result {
            Ok(Ok(worker_stats)) => stats = stats.merged(worker_stats),
            Ok(Err(e)) => {
                worker_error.get_or_insert(e);
            }
            Err(_) => {
                worker_error.get_or_insert(CountError::WorkerPanicked);
            }
        }
    }

    let chunks = match fed {
        Ok(chunks) => chunks,
        Err(e) => {
            debug!(error = %e, "pipeline failed");
            return Err(e);
        }
    };
    if let Some(e) = worker_error {
        debug!(error = %e, "pipeline failed");
        return Err(e);
    }
    debug!(chunks, batches = stats.batches, "pipeline joined");

    let summary = CountSummary {
        unique: set.count(),
        lines: stats.lines,
        skipped: stats.skipped,
        bytes: reader.bytes_consumed(),
    };
    info!(
        unique = summary.unique,
        lines = summary.lines,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "count complete"
    );
    skips.report();

    Ok(summary)
}

/// Push chunks until the input ends, the workers are gone or a failure is flagged
fn feed<R: Read>(
    reader: &mut ChunkReader<R>,
    tx: &Sender<LineChunk>,
    abort: &AtomicBool,
) -> std::io::Result<u64> {
    let mut chunks = 0u64;

    while !abort.load(Ordering::Relaxed) {
        let Some(chunk) = reader.next_chunk()? else {
            break;
        };
        if tx.send(chunk).is_err() {
            break;
        }
        chunks += 1;
    }

    Ok(chunks)
}

/// Worker loop: process chunks until the queue is closed and drained
fn drain(
    worker_idx: usize,
    worker: Worker<'_>,
    rx: Receiver<LineChunk>,
    abort: &AtomicBool,
) -> Result<WorkerStats, CountError> {
    let mut stats = WorkerStats::default();

    for chunk in rx.iter() {
        if abort.load(Ordering::Relaxed) {
            debug!(worker_idx, "worker abandoning queue");
            break;
        }
        if let Err(e) = worker.process(chunk.lines(), &mut stats) {
            abort.store(true, Ordering::Relaxed);
            return Err(e);
        }
    }

    debug!(
        worker_idx,
        batches = stats.batches,
        lines = stats.lines,
        skipped = stats.skipped,
        "worker finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::options::MalformedPolicy;
    use crate::domain::parser::OctetMode;
    use serial_test::serial;
    use std::io::{self, Cursor};

    fn count_bytes(input: &[u8], options: &CountOptions) -> Result<CountSummary, CountError> {
        count_unique_from_reader(Cursor::new(input.to_vec()), options)
    }

    /// Reader yielding some valid data, then failing
    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::other("device gone"));
            }
            self.sent = true;
            let data = b"1.1.1.1\n2.2.2.2\n";
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            Ok(n)
        }
    }

    #[test]
    #[serial]
    fn test_duplicates_counted_once() {
        let input = b"1.2.3.4\n1.2.3.4\n5.6.7.8\n";
        let summary = count_bytes(input, &CountOptions::default()).unwrap();
        assert_eq!(summary.unique, 2);
        assert_eq!(summary.lines, 3);
        assert_eq!(summary.bytes, 24);
    }

    #[test]
    #[serial]
    fn test_empty_input() {
        let summary = count_bytes(b"", &CountOptions::default()).unwrap();
        assert_eq!(summary, CountSummary::default());
    }

    #[test]
    #[serial]
    fn test_single_worker_tiny_buffer() {
        let options = CountOptions::default()
            .with_workers(1)
            .with_buffer_size(3)
            .with_queue_capacity(1);
        let summary = count_bytes(b"9.9.9.9\n8.8.8.8\n9.9.9.9", &options).unwrap();
        assert_eq!(summary.unique, 2);
        assert_eq!(summary.lines, 3);
    }

    #[test]
    #[serial]
    fn test_malformed_aborts_by_default() {
        let result = count_bytes(b"1.1.1.1\n1.2.3\n", &CountOptions::default());
        assert!(matches!(
            result,
            Err(CountError::MalformedAddress { offset: 8, .. })
        ));
    }

    #[test]
    #[serial]
    fn test_malformed_skipped_when_configured() {
        let options = CountOptions::default().with_malformed_policy(MalformedPolicy::Skip);
        let summary = count_bytes(b"1.2.3\n4.4.4.4\n", &options).unwrap();
        assert_eq!(summary.unique, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    #[serial]
    fn test_skips_tallied_across_workers() {
        let options = CountOptions::default()
            .with_workers(4)
            .with_buffer_size(8)
            .with_malformed_policy(MalformedPolicy::Skip);
        let input = b"1.2.3\n4.4.4.4\n".repeat(40);

        let summary = count_bytes(&input, &options).unwrap();
        assert_eq!(summary.unique, 1);
        assert_eq!(summary.skipped, 40);
        assert_eq!(summary.lines, 80);
    }

    #[test]
    #[serial]
    fn test_crlf_lines_counted() {
        let options = CountOptions::default().with_octet_mode(OctetMode::Wrapping);
        let summary = count_bytes(b"1.2.3.4\r\n1.2.3.5\n", &options).unwrap();
        assert_eq!(summary.unique, 2);

        let summary = count_bytes(b"1.2.3.4\r\n1.2.3.4\n", &CountOptions::default()).unwrap();
        assert_eq!(summary.unique, 1);
    }

    #[test]
    #[serial]
    fn test_read_error_is_reported() {
        let options = CountOptions::default().with_buffer_size(64);
        let result = count_unique_from_reader(BrokenReader { sent: false }, &options);
        match result {
            Err(CountError::Io { source, .. }) => assert_eq!(source.to_string(), "device gone"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let options = CountOptions::default().with_workers(0);
        assert!(matches!(
            count_bytes(b"1.1.1.1\n", &options),
            Err(CountError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = count_unique("/nonexistent/path/addresses.txt", &CountOptions::default());
        assert!(matches!(result, Err(CountError::Io { .. })));
    }
}
