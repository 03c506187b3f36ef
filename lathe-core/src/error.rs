//! Error taxonomy for parsing, execution, playback control and program I/O.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// The line does not start with a `G`/`M` command code.
    #[error("malformed instruction: {line:?}")]
    MalformedInstruction { line: String },

    /// An axis or feed word whose numeric part does not parse.
    #[error("invalid parameter: {token}")]
    InvalidParameter { token: String },

    /// Zero or negative feed on a feed-driven move.
    #[error("invalid feed rate: {feed}")]
    InvalidFeedRate { feed: f64 },

    #[error("no program selected")]
    NoProgramSelected,

    #[error("not a G-code file: {}", path.display())]
    WrongFileType { path: PathBuf },

    #[error("i/o failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

impl SimError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimError::Io {
            path: path.into(),
            source,
        }
    }
}
