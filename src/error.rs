use thiserror::Error;

// Unified error type for pencil-decomp

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompError {
    #[error("domain error: {0}")]
    Domain(String),
    #[error("{what} {index} is out of range [0, {bound})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },
    #[error("invalid topology: {0}")]
    Topology(String),
    #[error("pencil pair {from} -> {to} is not an adjacent rotation")]
    PencilPair { from: &'static str, to: &'static str },
    #[error("buffer of rank {rank} holds {found} elements, expected {expected}")]
    BufferSize {
        rank: usize,
        expected: usize,
        found: usize,
    },
}

pub type DecompResult<T> = Result<T, DecompError>;
