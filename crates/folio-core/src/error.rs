use std::fmt;

use crate::form::Field;

#[derive(Debug, Clone, PartialEq)]
pub enum FolioError {
    /// A CSS-style root margin could not be parsed.
    InvalidMargin(String),
    /// Threshold outside `[0, 1]` or not finite.
    InvalidThreshold(f64),
    /// A required form field was blank.
    MissingField(Field),
    /// The email field does not look like an address.
    InvalidEmail(String),
}

impl fmt::Display for FolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolioError::InvalidMargin(raw) => write!(f, "invalid root margin: {raw:?}"),
            FolioError::InvalidThreshold(t) => {
                write!(f, "invalid visibility threshold {t} (expected 0.0..=1.0)")
            }
            FolioError::MissingField(field) => write!(f, "{field} is required"),
            FolioError::InvalidEmail(raw) => write!(f, "invalid email address: {raw:?}"),
        }
    }
}

impl std::error::Error for FolioError {}

pub type Result<T> = std::result::Result<T, FolioError>;
