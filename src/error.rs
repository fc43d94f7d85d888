//! Hard failures that abort reading.
//!
//! Problems with the *content* of an entry (unknown tags, broken locations,
//! inconsistent qualifiers...) are never reported through this type; they are
//! collected as [`ValidationMessage`](crate::validation::ValidationMessage)s
//! and the partially populated entry is still returned. Only failures after
//! which the reader cannot safely continue end up here.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error that aborts reading of the whole input.
#[derive(Debug, Error)]
pub enum Error {
    /// io::Error
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A single physical line did not fit into the buffer and the
    /// [`BufPolicy`](crate::policy::BufPolicy) refused to let it grow.
    #[error("EMBL parse error: buffer limit reached at line {line}.")]
    BufferLimit {
        /// Line number (1-based) of the line that did not fit.
        line: u64,
    },

    /// The taxonomy collaborator supplied by the caller failed.
    #[error("taxonomy lookup failed for '{name}': {source}")]
    Lookup {
        /// Scientific name that was looked up
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
