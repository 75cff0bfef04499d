//! Estimator error types

use contracts::ContractError;
use thiserror::Error;

/// Estimator-side errors
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// `track` called after `shutdown`
    #[error("estimator '{estimator}' already shut down")]
    ShutDown { estimator: String },

    /// Trajectory file could not be written
    #[error("failed to write trajectory '{path}': {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EstimatorError {
    pub fn shut_down(estimator: impl Into<String>) -> Self {
        Self::ShutDown {
            estimator: estimator.into(),
        }
    }
}

impl From<EstimatorError> for ContractError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::ShutDown { estimator } => {
                ContractError::estimator(estimator, "already shut down")
            }
            EstimatorError::Export { path, source } => ContractError::TrajectoryExport {
                path,
                message: source.to_string(),
            },
        }
    }
}
