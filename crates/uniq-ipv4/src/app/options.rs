//! Counting options
//!
//! Options are built once by the caller and passed by reference into the
//! pipeline; nothing is read from global state.

use crate::app::error::CountError;
use crate::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
use crate::domain::parser::OctetMode;

/// What to do with a line that is not a valid address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Fail the whole run with `CountError::MalformedAddress`
    #[default]
    Abort,
    /// Skip the line and keep counting; skips are reported in the summary
    Skip,
}

/// Options for a counting run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountOptions {
    /// Number of parsing workers
    pub worker_count: usize,
    /// Bytes requested per read call (segment size for the mapped reader)
    pub buffer_size: usize,
    /// Capacity of the reader -> worker queue, in chunks
    pub queue_capacity: usize,
    /// Handling of malformed lines
    pub on_malformed: MalformedPolicy,
    /// Octet validation mode
    pub octet_mode: OctetMode,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            buffer_size: DEFAULT_BUFFER_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            on_malformed: MalformedPolicy::Abort,
            octet_mode: OctetMode::Strict,
        }
    }
}

impl CountOptions {
    /// Set the number of workers
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the read buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the queue capacity
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Set the malformed line policy
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    /// Set the octet validation mode
    pub fn with_octet_mode(mut self, mode: OctetMode) -> Self {
        self.octet_mode = mode;
        self
    }

    /// Reject zero-sized settings
    pub fn validate(&self) -> Result<(), CountError> {
        if self.worker_count == 0 {
            return Err(CountError::InvalidOptions("worker_count must be > 0"));
        }
        if self.buffer_size == 0 {
            return Err(CountError::InvalidOptions("buffer_size must be > 0"));
        }
        if self.queue_capacity == 0 {
            return Err(CountError::InvalidOptions("queue_capacity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CountOptions::default();
        assert_eq!(options.worker_count, 6);
        assert_eq!(options.buffer_size, 1 << 20);
        assert_eq!(options.on_malformed, MalformedPolicy::Abort);
        assert_eq!(options.octet_mode, OctetMode::Strict);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let options = CountOptions::default()
            .with_workers(2)
            .with_buffer_size(64)
            .with_queue_capacity(3)
            .with_malformed_policy(MalformedPolicy::Skip)
            .with_octet_mode(OctetMode::Wrapping);

        assert_eq!(options.worker_count, 2);
        assert_eq!(options.buffer_size, 64);
        assert_eq!(options.queue_capacity, 3);
        assert_eq!(options.on_malformed, MalformedPolicy::Skip);
        assert_eq!(options.octet_mode, OctetMode::Wrapping);
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(matches!(
            CountOptions::default().with_workers(0).validate(),
            Err(CountError::InvalidOptions(_))
        ));
        assert!(matches!(
            CountOptions::default().with_buffer_size(0).validate(),
            Err(CountError::InvalidOptions(_))
        ));
        assert!(matches!(
            CountOptions::default().with_queue_capacity(0).validate(),
            Err(CountError::InvalidOptions(_))
        ));
    }
}
