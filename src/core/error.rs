//! Error types for the two failure domains (setup and run) plus the
//! collaborator-facing errors they wrap.

use thiserror::Error;

/// A rejection reported by the embedded runtime.
///
/// The runtime only ever hands back a description, so that is all we keep.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for RuntimeError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for RuntimeError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// A failure while touching the page (missing element, canvas context, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PageError(pub String);

impl From<String> for PageError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for PageError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config lists no packages")]
    NoPackages,
    #[error("`{0}` is not a valid R package name")]
    InvalidPackage(String),
    #[error("package `{0}` is listed more than once")]
    DuplicatePackage(String),
    #[error("element id for `{0}` is empty")]
    EmptyElementId(&'static str),
}

/// Any failure that aborts the boot sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("{0}")]
    Init(RuntimeError),
    #[error("installing package `{package}` failed: {source}")]
    Install {
        package: String,
        #[source]
        source: RuntimeError,
    },
    #[error("preparing the code editor failed: {0}")]
    Editor(PageError),
}

/// Any failure of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("could not create a result scope: {0}")]
    Scope(RuntimeError),
    #[error("{0}")]
    Capture(RuntimeError),
    #[error("could not draw plot: {0}")]
    Render(PageError),
    #[error("could not release R objects: {0}")]
    Release(RuntimeError),
}
