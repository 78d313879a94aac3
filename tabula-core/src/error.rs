use tabula_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<ModelError> for ViewError {
    fn from(err: ModelError) -> Self {
        ViewError::InvalidConfiguration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ViewError>;
