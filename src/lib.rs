//! Host-testable core of the in-browser R plotting page.
//!
//! The embedded runtime and the page are reached only through the
//! [`runtime::RRuntime`] and [`view::PageView`] traits; the browser shell in
//! `crates/rplot_web` supplies the real implementations.

#[path = "core/bootstrap.rs"]
pub mod bootstrap;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/executor.rs"]
pub mod executor;

#[path = "core/progress.rs"]
pub mod progress;

#[path = "core/runtime.rs"]
pub mod runtime;

#[path = "core/view.rs"]
pub mod view;

pub(crate) mod time;

#[cfg(test)]
#[path = "core/fakes.rs"]
mod fakes;

pub use bootstrap::bootstrap;
pub use config::PlotConfig;
pub use executor::{Executor, RunOutcome};
