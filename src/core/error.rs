use std::fmt;

/// Crate-level errors for the pipeline and its IO seams. Scanning and
/// parsing diagnostics are collected, not raised; this type covers the
/// few conditions that stop a run outright.
#[derive(Debug)]
pub enum CoreError {
    EmptySource,
    IoError(String),
    GeneralError(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::EmptySource => write!(f, "Error: source is empty, nothing to analyze"),
            CoreError::IoError(msg) => write!(f, "IO Error: {}", msg),
            CoreError::GeneralError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl CoreError {
    pub fn io_error(message: &str) -> Self {
        CoreError::IoError(message.to_string())
    }
    pub fn general_error(message: &str) -> Self {
        CoreError::GeneralError(message.to_string())
    }
}
