use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    ZeroActivePage,
    ZeroRowsOnPage,
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ZeroActivePage => {
                write!(f, "active page must be a positive integer")
            }
            ModelError::ZeroRowsOnPage => {
                write!(f, "rows on page must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
