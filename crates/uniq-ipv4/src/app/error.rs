//! Counting errors

use crate::constants::MAX_REPORTED_LINE_LEN;
use crate::domain::parser::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a counting run
#[derive(Debug, Error)]
pub enum CountError {
    /// The input could not be opened or read
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A line is not a dotted-decimal IPv4 address
    #[error("malformed address at byte {offset}: {line:?}: {source}")]
    MalformedAddress {
        /// Input offset of the start of the line
        offset: u64,
        /// Line content, lossily decoded and truncated
        line: String,
        #[source]
        source: ParseError,
    },
    /// Options failed validation
    #[error("invalid options: {0}")]
    InvalidOptions(&'static str),
    /// A worker thread could not be started
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] io::Error),
    /// A worker thread panicked
    #[error("worker thread panicked")]
    WorkerPanicked,
}

impl CountError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(offset: u64, line: &[u8], source: ParseError) -> Self {
        let shown = &line[..line.len().min(MAX_REPORTED_LINE_LEN)];
        Self::MalformedAddress {
            offset,
            line: String::from_utf8_lossy(shown).into_owned(),
            source,
        }
    }
}
