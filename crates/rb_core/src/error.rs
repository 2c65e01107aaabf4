use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Transformation failed: {0}")]
    TransformationFailed(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stable, payload-free discriminant of [`Error`], used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SourceUnavailable,
    TransformationFailed,
    PersistenceFailed,
    NotFound,
    ConfigurationInvalid,
    Serialization,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SourceUnavailable(_) => ErrorKind::SourceUnavailable,
            Error::TransformationFailed(_) => ErrorKind::TransformationFailed,
            Error::PersistenceFailed(_) => ErrorKind::PersistenceFailed,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::ConfigurationInvalid(_) => ErrorKind::ConfigurationInvalid,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn not_found(what: &str, id: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{} {}", what, id))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_alias_is_reexported() {
        let result: crate::Result<u8> = Err(Error::not_found("article", 7));
        let same: Result<u8> = result;
        assert!(matches!(same, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let err = Error::TransformationFailed("quota exhausted".to_string());
        assert_eq!(err.kind(), ErrorKind::TransformationFailed);
        assert_eq!(
            serde_json::to_string(&err.kind()).unwrap(),
            "\"transformation_failed\""
        );
    }

    #[test]
    fn test_display_names_stage() {
        let err = Error::SourceUnavailable("HTTP 429".to_string());
        assert_eq!(err.to_string(), "Source unavailable: HTTP 429");
    }
}
