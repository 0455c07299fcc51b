use std::path::PathBuf;

use thiserror::Error;

/// Typed errors raised by the fitting core.
///
/// Statistical rejections are not errors: an out-of-support parameter vector
/// evaluates to `-inf`. Everything here is a configuration or input problem
/// that should abort a run.
#[derive(Debug, Error)]
pub enum FitError {
    /// Malformed text in an input (grid extension names, age labels, numbers).
    #[error("parse error: {0}")]
    Parse(String),

    /// A (metallicity, age) combination or column that should exist does not.
    #[error("lookup error: {0}")]
    Lookup(String),

    /// An argument outside the accepted vocabulary (e.g. extinction law names).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Internally inconsistent configuration (prior bounds, array shapes, coverage).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FitError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::Parse(_)
            | FitError::InvalidArgument(_)
            | FitError::InvalidConfiguration(_)
            | FitError::Io { .. } => 2,
            FitError::Lookup(_) => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
