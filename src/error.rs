//! Generation errors
//!
//! Two classes matter to callers: configuration errors, raised before any
//! draw is made, and invariant violations, raised for a single record and
//! aborting the run. Everything else is output plumbing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    /// Rejected configuration or duration bounds
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A record would break timestamp ordering or duration positivity
    #[error("invariant violated for {record}: {detail}")]
    Invariant { record: String, detail: String },

    /// Distribution parameters refused by the sampler
    #[error("bad distribution parameters: {0}")]
    Distribution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenError {
    pub fn config(detail: impl Into<String>) -> Self {
        GenError::Config(detail.into())
    }

    pub fn invariant(record: impl Into<String>, detail: impl Into<String>) -> Self {
        GenError::Invariant { record: record.into(), detail: detail.into() }
    }
}

pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_message_names_record() {
        let err = GenError::invariant("a1b2c3d4e5f6", "pack_end precedes pack_start");
        assert_eq!(
            err.to_string(),
            "invariant violated for a1b2c3d4e5f6: pack_end precedes pack_start"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GenError = io.into();
        assert!(matches!(err, GenError::Io(_)));
    }
}
