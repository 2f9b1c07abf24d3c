//! Crate-wide error type.

/// Errors raised by the distance model and both solvers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid engine parameters, detected before any computation.
    #[error("ConfigurationError: {0}")]
    Configuration(String),

    /// Distance metric tag that the distance model does not know.
    #[error("UnsupportedMetric: {0}")]
    UnsupportedMetric(String),

    /// Inconsistent instance data (sizes that disagree, empty input).
    #[error("DataError: {0}")]
    Data(String),

    /// The MIP backend failed or reported a status we do not recognize.
    #[error("SolverError: {0}")]
    Solver(String),

    /// A user progress callback failed; the run is aborted.
    #[error("CallbackError: {0}")]
    Callback(#[from] anyhow::Error),
}

impl Error {
    /// Whether this error belongs to the configuration class.
    ///
    /// Unsupported metric tags count as configuration errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::UnsupportedMetric(_))
    }
}

/// Shorthand for `Result<T, u_tsp::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_class() {
        assert!(Error::Configuration("x".into()).is_configuration());
        assert!(Error::UnsupportedMetric("ATT".into()).is_configuration());
        assert!(!Error::Data("x".into()).is_configuration());
        assert!(!Error::Solver("x".into()).is_configuration());
    }

    #[test]
    fn test_display_keeps_raw_message() {
        let err = Error::Solver("Not Solved".into());
        assert_eq!(err.to_string(), "SolverError: Not Solved");
    }

    #[test]
    fn test_callback_from_anyhow() {
        let err: Error = anyhow::anyhow!("snapshot failed").into();
        assert!(matches!(err, Error::Callback(_)));
        assert!(err.to_string().contains("snapshot failed"));
    }
}
