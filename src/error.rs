// Error classes for the add / delete workflow
// Rejections are recovered locally and shown to the operator;
// store failures abort the operation and leave the listing as it was.

use thiserror::Error;

/// A request the workflow refused. The Display text is the exact message
/// shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("all fields are required")]
    MissingField,

    #[error("brand can only contain letters")]
    InvalidBrand,

    #[error("year and price must be numbers")]
    NotANumber,

    #[error("year must be between 1900 and 2026")]
    YearOutOfRange,

    #[error("this car already exists")]
    Duplicate,

    #[error("please select a car first")]
    NoSelection,
}

#[derive(Debug, Error)]
pub enum CarError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl CarError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, CarError::Rejected(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            CarError::Rejected(reason) => Some(*reason),
            CarError::Store(_) => None,
        }
    }
}

pub type CarResult<T> = Result<T, CarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::MissingField.to_string(), "all fields are required");
        assert_eq!(Rejection::InvalidBrand.to_string(), "brand can only contain letters");
        assert_eq!(Rejection::NotANumber.to_string(), "year and price must be numbers");
        assert_eq!(
            Rejection::YearOutOfRange.to_string(),
            "year must be between 1900 and 2026"
        );
        assert_eq!(Rejection::Duplicate.to_string(), "this car already exists");
        assert_eq!(Rejection::NoSelection.to_string(), "please select a car first");
    }

    #[test]
    fn test_rejected_error_displays_reason_only() {
        let err = CarError::from(Rejection::Duplicate);

        assert!(err.is_rejection());
        assert_eq!(err.rejection(), Some(Rejection::Duplicate));
        assert_eq!(err.to_string(), "this car already exists");
    }

    #[test]
    fn test_store_error_is_not_rejection() {
        let err = CarError::from(rusqlite::Error::InvalidQuery);

        assert!(!err.is_rejection());
        assert_eq!(err.rejection(), None);
        assert!(err.to_string().starts_with("database error"));
    }
}
