use thiserror::Error;

/// Errors that may appear while building a coreset or running its sub-algorithms.
#[derive(Debug, Error)]
pub enum CoresetError {
    #[error("invalid configuration: {reason}")]
    /// A `CoresetConfig` value fails `CoresetConfig::validate()`
    InvalidConfig { reason: String },

    #[error("degenerate input data: {reason}")]
    /// The point matrix cannot support the requested algorithm, e.g. N=0 or all points identical
    DegenerateData { reason: String },

    #[error("invariant violation: {reason}")]
    /// A bug: an internal partitioning invariant (ring/group membership) did not hold
    InvariantViolation { reason: String },

    #[error("numerical error: {reason}")]
    /// Weights summed to zero or produced a non-finite value
    Numerical { reason: String },

    #[error("general I/O error occurred while reading an input file")]
    /// I/O error occurred while reading an input file
    Io(#[from] std::io::Error),

    #[error("error returned by the CSV parser")]
    /// Error returned by the CSV parser
    CsvError(#[from] csv::Error),
}
