use sca_client::ApiError;
use sca_core::error::CoreError;

/// Failure of a hook call: either the input was rejected locally or the
/// backend call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgencyError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type AgencyResult<T> = Result<T, AgencyError>;

impl AgencyError {
    pub fn as_validation(&self) -> Option<&CoreError> {
        match self {
            AgencyError::Validation(e) => Some(e),
            AgencyError::Api(_) => None,
        }
    }

    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            AgencyError::Api(e) => Some(e),
            AgencyError::Validation(_) => None,
        }
    }
}
