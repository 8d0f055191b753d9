//! The page regions the app drives, bundled behind one trait so the boot
//! sequence and the executor never look elements up themselves.

use crate::error::PageError;

pub const RUNNING_MESSAGE: &str = "Running analysis...";
pub const NO_PLOT_MESSAGE: &str = "No plot was generated";
pub const SETUP_ERROR_PREFIX: &str = "Error initializing WebR: ";
pub const RUN_ERROR_PREFIX: &str = "Error running analysis: ";

pub trait PageView {
    type Image;

    /// Updates both the percentage label and the bar width.
    fn set_progress(&self, percent: u8);

    /// Turns the code area into an editable input, seeded with `default_snippet`
    /// when it holds no code yet.
    fn prepare_editor(&self, default_snippet: &str) -> Result<(), PageError>;

    /// Hides the loading view and shows the main content.
    fn reveal_content(&self);

    fn set_run_enabled(&self, enabled: bool);

    /// Replaces the loading view's content with an error message.
    fn show_setup_error(&self, message: &str);

    /// Current contents of the code area, read fresh on every call.
    fn code(&self) -> String;

    /// Replaces the output area with a plain message.
    fn show_status(&self, message: &str);

    /// Clears the output area and draws one canvas per image, in order.
    fn show_plots(&self, images: &[Self::Image]) -> Result<(), PageError>;

    /// Replaces the output area with an error message.
    fn show_run_error(&self, message: &str);
}

pub fn setup_error_text(err: &impl std::fmt::Display) -> String {
    format!("{SETUP_ERROR_PREFIX}{err}")
}

pub fn run_error_text(err: &impl std::fmt::Display) -> String {
    format!("{RUN_ERROR_PREFIX}{err}")
}
