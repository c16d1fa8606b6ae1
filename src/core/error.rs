use std::fmt;

/// The closed set of ways an evaluator-side operation can fail (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing index file or truncated read.
    Io,
    /// A codec produced a malformed or over-long sequence.
    Decode,
    /// `encode` saw a value beyond the codec's declared range.
    Overflow,
    /// A vocabulary or postings record was malformed.
    Vocabulary,
    /// A query was cancelled cooperatively before it finished.
    Cancelled,
    /// A query hit its timeout and returned a partial top-k.
    Truncated,
    /// Bad CLI arguments (exit code 3 in §6); never raised by the evaluator itself.
    InvalidArgument,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error {
            kind,
            context: context.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::Vocabulary,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
