use std::io;

/// Errors raised while framing, encoding or decoding sequence records
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// underlying file or buffer failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// record payload is not a valid protobuf message
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// record header or body runs past the end of the input
    #[error("Truncated record at offset {offset}")]
    Truncated {
        /// byte offset of the record start
        offset: u64,
    },

    /// checksum mismatch
    #[error("Corrupted record at offset {offset}: {reason}")]
    Corrupted {
        /// byte offset of the record start
        offset: u64,
        /// which checksum failed
        reason: String,
    },

    /// caller passed something unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// payload decoded but does not have the expected structure
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// record depth differs from the dataset depth
    #[error("Depth mismatch: expected {expected}, found {found}")]
    DepthMismatch {
        /// depth fixed for the dataset
        expected: usize,
        /// depth carried by the record
        found: usize,
    },

    /// a file without any record where at least one is required
    #[error("Empty record file: {0}")]
    EmptyFile(String),

    /// inputter configuration could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// shorthand for the error `make_features` raises without input
    pub(crate) fn missing_input() -> Self {
        Error::InvalidArgument("missing input".to_owned())
    }
}
