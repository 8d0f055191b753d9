//! In-memory doubles for the runtime and the page, shared by the flow tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::error::{PageError, RuntimeError};
use crate::runtime::{
    Capture, CaptureOptions, CaptureOutput, OutputKind, PlotImage, RRuntime, Shelter,
};
use crate::view::PageView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeImage {
    pub width: u32,
    pub height: u32,
}

impl FakeImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl PlotImage for FakeImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

type Hook = Box<dyn FnOnce()>;

/// State shared between a [`FakeRuntime`] and the scopes it hands out.
#[derive(Default)]
pub struct Journal {
    calls: RefCell<Vec<String>>,
    submissions: RefCell<Vec<(String, CaptureOptions)>>,
    fail_purge: RefCell<Option<String>>,
    during_capture: RefCell<Option<Hook>>,
}

impl Journal {
    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    pub journal: Rc<Journal>,
    pub fail_init: Option<String>,
    /// `(package, message)`: reject the install of that package.
    pub fail_install: Option<(String, String)>,
    pub fail_scope: Option<String>,
    /// One entry per scope; an empty queue yields an empty capture.
    pub captures: RefCell<VecDeque<Result<Vec<FakeImage>, String>>>,
}

impl FakeRuntime {
    pub fn push_capture(&self, result: Result<Vec<FakeImage>, &str>) {
        self.captures
            .borrow_mut()
            .push_back(result.map_err(str::to_string));
    }

    pub fn fail_purge(&self, message: &str) {
        *self.journal.fail_purge.borrow_mut() = Some(message.to_string());
    }

    /// Runs `hook` inside the next capture, while that run is still in flight.
    pub fn during_capture(&self, hook: impl FnOnce() + 'static) {
        *self.journal.during_capture.borrow_mut() = Some(Box::new(hook));
    }

    pub fn calls(&self) -> Vec<String> {
        self.journal.calls.borrow().clone()
    }

    pub fn submissions(&self) -> Vec<(String, CaptureOptions)> {
        self.journal.submissions.borrow().clone()
    }
}

impl RRuntime for FakeRuntime {
    type Image = FakeImage;
    type Scope = FakeShelter;

    async fn init(&self) -> Result<(), RuntimeError> {
        self.journal.record("init");
        match &self.fail_init {
            Some(msg) => Err(RuntimeError::new(msg.clone())),
            None => Ok(()),
        }
    }

    async fn install_packages(&self, names: &[String]) -> Result<(), RuntimeError> {
        self.journal.record(format!("install:{}", names.join(",")));
        if let Some((pkg, msg)) = &self.fail_install {
            if names.contains(pkg) {
                return Err(RuntimeError::new(msg.clone()));
            }
        }
        Ok(())
    }

    async fn create_scope(&self) -> Result<FakeShelter, RuntimeError> {
        self.journal.record("scope");
        if let Some(msg) = &self.fail_scope {
            return Err(RuntimeError::new(msg.clone()));
        }
        let capture = self
            .captures
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Ok(FakeShelter {
            journal: Rc::clone(&self.journal),
            capture: RefCell::new(Some(capture)),
        })
    }
}

pub struct FakeShelter {
    journal: Rc<Journal>,
    capture: RefCell<Option<Result<Vec<FakeImage>, String>>>,
}

impl Shelter for FakeShelter {
    type Image = FakeImage;

    async fn capture(
        &self,
        code: &str,
        options: &CaptureOptions,
    ) -> Result<Capture<FakeImage>, RuntimeError> {
        self.journal.record("capture");
        self.journal
            .submissions
            .borrow_mut()
            .push((code.to_string(), *options));
        let hook = self.journal.during_capture.borrow_mut().take();
        if let Some(hook) = hook {
            hook();
        }
        let scripted = self.capture.borrow_mut().take();
        match scripted.unwrap_or_else(|| Ok(Vec::new())) {
            Ok(images) => Ok(Capture {
                images,
                output: vec![CaptureOutput {
                    kind: OutputKind::Stdout,
                    text: "[1] 42".to_string(),
                }],
            }),
            Err(msg) => Err(RuntimeError::new(msg)),
        }
    }

    async fn purge(&self) -> Result<(), RuntimeError> {
        self.journal.record("purge");
        match self.journal.fail_purge.borrow().as_ref() {
            Some(msg) => Err(RuntimeError::new(msg.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Text(String),
    Canvas { width: u32, height: u32 },
    Error(String),
}

pub struct FakeView {
    pub progress: RefCell<Vec<u8>>,
    pub loading_text: RefCell<String>,
    pub content_visible: Cell<bool>,
    pub run_enabled: Cell<bool>,
    pub run_enabled_history: RefCell<Vec<bool>>,
    /// `None` while the code area is still the static display.
    pub editor: RefCell<Option<String>>,
    pub static_code: String,
    pub fail_editor: Option<String>,
    pub fail_render: Option<String>,
    pub output: RefCell<Vec<Output>>,
    pub events: RefCell<Vec<String>>,
}

impl Default for FakeView {
    fn default() -> Self {
        Self {
            progress: RefCell::new(Vec::new()),
            loading_text: RefCell::new("Loading WebR...".to_string()),
            content_visible: Cell::new(false),
            run_enabled: Cell::new(false),
            run_enabled_history: RefCell::new(Vec::new()),
            editor: RefCell::new(None),
            static_code: String::new(),
            fail_editor: None,
            fail_render: None,
            output: RefCell::new(vec![Output::Text("stale".to_string())]),
            events: RefCell::new(Vec::new()),
        }
    }
}

impl FakeView {
    pub fn with_editor(code: &str) -> Self {
        let view = Self::default();
        *view.editor.borrow_mut() = Some(code.to_string());
        view
    }

    pub fn type_code(&self, code: &str) {
        *self.editor.borrow_mut() = Some(code.to_string());
    }

    pub fn output(&self) -> Vec<Output> {
        self.output.borrow().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn event(&self, e: impl Into<String>) {
        self.events.borrow_mut().push(e.into());
    }
}

impl PageView for FakeView {
    type Image = FakeImage;

    fn set_progress(&self, percent: u8) {
        self.event(format!("progress:{percent}"));
        self.progress.borrow_mut().push(percent);
    }

    fn prepare_editor(&self, default_snippet: &str) -> Result<(), PageError> {
        self.event("editor");
        if let Some(msg) = &self.fail_editor {
            return Err(PageError::from(msg.as_str()));
        }
        let seed = if self.static_code.trim().is_empty() {
            default_snippet.to_string()
        } else {
            self.static_code.clone()
        };
        *self.editor.borrow_mut() = Some(seed);
        Ok(())
    }

    fn reveal_content(&self) {
        self.event("reveal");
        self.content_visible.set(true);
    }

    fn set_run_enabled(&self, enabled: bool) {
        self.event(format!("run_enabled:{enabled}"));
        self.run_enabled.set(enabled);
        self.run_enabled_history.borrow_mut().push(enabled);
    }

    fn show_setup_error(&self, message: &str) {
        self.event("setup_error");
        *self.loading_text.borrow_mut() = message.to_string();
    }

    fn code(&self) -> String {
        self.editor
            .borrow()
            .clone()
            .unwrap_or_else(|| self.static_code.clone())
    }

    fn show_status(&self, message: &str) {
        *self.output.borrow_mut() = vec![Output::Text(message.to_string())];
    }

    fn show_plots(&self, images: &[FakeImage]) -> Result<(), PageError> {
        let mut out = self.output.borrow_mut();
        out.clear();
        if let Some(msg) = &self.fail_render {
            return Err(PageError::from(msg.as_str()));
        }
        out.extend(images.iter().map(|img| Output::Canvas {
            width: img.width,
            height: img.height,
        }));
        Ok(())
    }

    fn show_run_error(&self, message: &str) {
        *self.output.borrow_mut() = vec![Output::Error(message.to_string())];
    }
}
