use std::fmt;
use std::io;

/// Crate-wide error type.
///
/// All fallible paths are construction-time: bad distribution or scenario
/// parameters, configuration that fails to parse, or logging setup. Sampling
/// itself never fails once an instance exists.
#[derive(Debug)]
pub enum DialysisError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    LoggingError(String),
    /// A construction-time precondition was violated. The message names the
    /// offending parameter and value.
    InvalidParameter(String),
}

impl From<io::Error> for DialysisError {
    fn from(error: io::Error) -> Self {
        DialysisError::IoError(error)
    }
}

impl From<serde_json::Error> for DialysisError {
    fn from(error: serde_json::Error) -> Self {
        DialysisError::JsonError(error)
    }
}

impl From<log::SetLoggerError> for DialysisError {
    fn from(error: log::SetLoggerError) -> Self {
        DialysisError::LoggingError(error.to_string())
    }
}

impl From<log4rs::config::runtime::ConfigErrors> for DialysisError {
    fn from(error: log4rs::config::runtime::ConfigErrors) -> Self {
        DialysisError::LoggingError(error.to_string())
    }
}

impl From<derive_builder::UninitializedFieldError> for DialysisError {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        DialysisError::InvalidParameter(format!("field is not initialized: {}", error.field_name()))
    }
}

impl fmt::Display for DialysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialysisError::IoError(error) => write!(f, "IO error: {error}"),
            DialysisError::JsonError(error) => write!(f, "JSON error: {error}"),
            DialysisError::LoggingError(message) => write!(f, "logging error: {message}"),
            DialysisError::InvalidParameter(message) => write!(f, "invalid parameter: {message}"),
        }
    }
}

impl std::error::Error for DialysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DialysisError::IoError(error) => Some(error),
            DialysisError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_names_the_offending_parameter() {
        let error = DialysisError::InvalidParameter("std must be non-negative, got -1".to_string());
        assert_eq!(
            error.to_string(),
            "invalid parameter: std must be non-negative, got -1"
        );
    }

    #[test]
    fn io_errors_convert_and_keep_a_source() {
        use std::error::Error;
        let error: DialysisError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(error.source().is_some());
    }
}
