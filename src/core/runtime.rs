//! The embedded R runtime, seen from the outside.
//!
//! Language execution, package management and graphics capture all live in
//! the runtime; this crate only sequences calls into it. The traits here are
//! the seam the browser binding implements and the tests fake.

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// A rendered plot handed back by a capture.
pub trait PlotImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// One long-lived handle to the engine, shared by the boot sequence and every run.
#[allow(async_fn_in_trait)]
pub trait RRuntime {
    type Image: PlotImage;
    type Scope: Shelter<Image = Self::Image>;

    async fn init(&self) -> Result<(), RuntimeError>;

    /// Installs the named packages. Callers pass one name at a time to keep
    /// installs strictly sequential.
    async fn install_packages(&self, names: &[String]) -> Result<(), RuntimeError>;

    /// Opens a scope that owns every runtime-side object a run creates.
    async fn create_scope(&self) -> Result<Self::Scope, RuntimeError>;
}

/// A resource scope. Objects created through it are released together by `purge`.
#[allow(async_fn_in_trait)]
pub trait Shelter {
    type Image: PlotImage;

    async fn capture(
        &self,
        code: &str,
        options: &CaptureOptions,
    ) -> Result<Capture<Self::Image>, RuntimeError>;

    async fn purge(&self) -> Result<(), RuntimeError>;
}

/// Flags for a capture request. Serialises to the runtime's option object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    /// Print the value of top-level expressions, as the console would.
    pub with_autoprint: bool,
    pub capture_conditions: bool,
    pub capture_streams: bool,
    pub capture_graphics: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            with_autoprint: true,
            capture_conditions: true,
            capture_streams: true,
            capture_graphics: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
    Message,
    Warning,
    Error,
    Other,
}

impl OutputKind {
    pub fn parse(tag: &str) -> Self {
        match tag {
            "stdout" => OutputKind::Stdout,
            "stderr" => OutputKind::Stderr,
            "message" => OutputKind::Message,
            "warning" => OutputKind::Warning,
            "error" => OutputKind::Error,
            _ => OutputKind::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputKind::Stdout => "stdout",
            OutputKind::Stderr => "stderr",
            OutputKind::Message => "message",
            OutputKind::Warning => "warning",
            OutputKind::Error => "error",
            OutputKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutput {
    pub kind: OutputKind,
    pub text: String,
}

/// The result of one capture. Not retained past the run that produced it.
#[derive(Debug)]
pub struct Capture<I> {
    pub images: Vec<I>,
    pub output: Vec<CaptureOutput>,
}

impl<I> Default for Capture<I> {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            output: Vec::new(),
        }
    }
}
