//! Error types for excel-ole-core

use thiserror::Error;

use crate::variant::VariantKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in excel-ole-core
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row index out of bounds (rows are 1-based)
    #[error("Row {0} out of bounds (expected 1..={1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds (columns are 1-based)
    #[error("Column {0} out of bounds (expected 1..={1})")]
    ColumnOutOfBounds(u32, u32),

    /// A tagged value could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A tagged value whose payload does not match its tag.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{kind} payload must be {expected} bytes, got {actual}")]
    PayloadWidth {
        kind: VariantKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} payload is not valid UTF-16")]
    InvalidString { kind: VariantKind },

    #[error("{kind} carries an array payload")]
    UnexpectedArray { kind: VariantKind },

    #[error("{kind} requires an array payload")]
    ExpectedArray { kind: VariantKind },

    #[error("{kind} grid of {rows}x{cols} holds {len} elements")]
    GridShape {
        kind: VariantKind,
        rows: usize,
        cols: usize,
        len: usize,
    },

    #[error("{kind} serial {serial} is outside the representable date range")]
    DateOutOfRange { kind: VariantKind, serial: f64 },
}

impl DecodeError {
    /// The tag of the value that failed to decode.
    pub fn kind(&self) -> VariantKind {
        match self {
            DecodeError::PayloadWidth { kind, .. }
            | DecodeError::InvalidString { kind }
            | DecodeError::UnexpectedArray { kind }
            | DecodeError::ExpectedArray { kind }
            | DecodeError::GridShape { kind, .. }
            | DecodeError::DateOutOfRange { kind, .. } => *kind,
        }
    }
}
