use std::path::PathBuf;

/// The error kinds this engine surfaces to a caller.
///
/// `NumericalWarning` (a small LU pivot) and `NonConvergence` are
/// deliberately *not* variants here: spec.md §7 treats both as
/// recoverable outcomes reported inside the relevant result type
/// (`PivotStatus` on the LU report, `converged: bool` plus the final
/// error on an iterative result) rather than as faults. This mirrors
/// the original's `LUResult::SmallPivotEncountered`, which is returned
/// alongside the factorization, never thrown.
#[derive(Debug, thiserror::Error)]
pub enum DiffusionError {
    /// Malformed or out-of-range input, detected at construction.
    #[error("invalid `{field}`: {message} (got {value})")]
    InvalidInput {
        field: &'static str,
        value: String,
        message: String,
    },

    /// An input file could not be opened or read.
    #[error("could not read `{field}` from {path}: {source}")]
    IoFailure {
        path: PathBuf,
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A message-passing primitive failed; fatal to the whole process group.
    #[error("communication failure on rank {rank}: {message}")]
    CommunicationFailure { rank: usize, message: String },
}

impl DiffusionError {
    pub fn invalid(field: &'static str, value: impl std::fmt::Display, message: impl Into<String>) -> Self {
        DiffusionError::InvalidInput {
            field,
            value: value.to_string(),
            message: message.into(),
        }
    }
}

pub type DiffusionResult<T> = Result<T, DiffusionError>;
