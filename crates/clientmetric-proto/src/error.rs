//! Protocol error types.

use thiserror::Error;

/// Errors raised while reading a delta frame.
///
/// Offsets are byte positions within the frame being read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The frame ended in the middle of a record.
    #[error("unexpected end of frame at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// A varint byte was not a valid two-character hex pair.
    #[error("invalid hex at offset {offset}")]
    InvalidHex { offset: usize },

    /// A varint did not terminate within 64 bits.
    #[error("varint overflows 64 bits at offset {offset}")]
    VarintOverflow { offset: usize },

    /// A record started with a byte other than `N`, `S` or `I`.
    #[error("unknown record tag {tag:#04x} at offset {offset}")]
    UnknownRecord { tag: u8, offset: usize },

    /// A name record carried a name outside `[A-Za-z0-9_]+`.
    #[error("invalid metric name: {0:?}")]
    InvalidName(String),

    /// A name record carried a negative length.
    #[error("negative name length {0}")]
    NegativeLength(i64),

    /// A name record was not followed by a value or increment record.
    #[error("name record {0:?} is not followed by a value record")]
    DanglingName(String),
}
