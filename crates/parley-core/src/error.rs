use thiserror::Error;

/// Top-level error type for the Parley system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for ParleyError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParleyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge store error: {0}")]
    Knowledge(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, ParleyError>;

impl From<toml::de::Error> for ParleyError {
    fn from(err: toml::de::Error) -> Self {
        ParleyError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ParleyError {
    fn from(err: toml::ser::Error) -> Self {
        ParleyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(err: serde_json::Error) -> Self {
        ParleyError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ParleyError::Config("missing section".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing section");

        let err = ParleyError::Knowledge("table absent".to_string());
        assert_eq!(err.to_string(), "Knowledge store error: table absent");

        let err = ParleyError::Provider("quota exceeded".to_string());
        assert_eq!(err.to_string(), "LLM provider error: quota exceeded");

        let err = ParleyError::Persistence("write failed".to_string());
        assert_eq!(err.to_string(), "Persistence error: write failed");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ParleyError = io.into();
        assert!(matches!(err, ParleyError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err: ParleyError = bad.unwrap_err().into();
        assert!(matches!(err, ParleyError::Serialization(_)));
    }

    #[test]
    fn test_from_toml_error() {
        let bad = toml::from_str::<toml::Value>("= nope =");
        let err: ParleyError = bad.unwrap_err().into();
        assert!(matches!(err, ParleyError::Config(_)));
    }
}
