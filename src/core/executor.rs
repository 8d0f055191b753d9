//! One click, one run: read the code, submit it with the package preamble,
//! paint whatever plots come back.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use crate::config::PlotConfig;
use crate::error::RunError;
use crate::runtime::{Capture, PlotImage, RRuntime, Shelter};
use crate::time::Instant;
use crate::view::{run_error_text, PageView, NO_PLOT_MESSAGE, RUNNING_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// This many canvases were drawn.
    Plotted(usize),
    NoPlot,
    Failed,
    /// Another run was still in flight.
    Skipped,
}

/// Armed by a successful boot. Holds the shared runtime handle and the page
/// bundle; every call to [`Executor::run`] is an independent run.
pub struct Executor<R, V> {
    runtime: Rc<R>,
    view: Rc<V>,
    config: Rc<PlotConfig>,
    in_flight: Cell<bool>,
    runs: Cell<u64>,
}

impl<R, V> Executor<R, V>
where
    R: RRuntime,
    V: PageView<Image = R::Image>,
{
    pub fn new(runtime: Rc<R>, view: Rc<V>, config: Rc<PlotConfig>) -> Self {
        Self {
            runtime,
            view,
            config,
            in_flight: Cell::new(false),
            runs: Cell::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.get()
    }

    /// Number of runs started so far (skipped clicks excluded).
    pub fn runs_started(&self) -> u64 {
        self.runs.get()
    }

    pub async fn run(&self) -> RunOutcome {
        if self.in_flight.replace(true) {
            warn!("run requested while another is in flight; ignoring");
            return RunOutcome::Skipped;
        }
        let run_id = self.runs.get() + 1;
        self.runs.set(run_id);
        self.view.set_run_enabled(false);
        self.view.show_status(RUNNING_MESSAGE);

        let code = self.view.code();
        debug!(run_id, code = %code, "executing R code");
        let started = Instant::now();

        let outcome = match self.execute(&self.config.submission(&code)).await {
            Ok(0) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(run_id, elapsed_ms, "no images were captured");
                RunOutcome::NoPlot
            }
            Ok(n) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(run_id, elapsed_ms, "displayed {n} plot images");
                RunOutcome::Plotted(n)
            }
            Err(err) => {
                error!(run_id, "error running code: {err}");
                self.view.show_run_error(&run_error_text(&err));
                RunOutcome::Failed
            }
        };

        self.view.set_run_enabled(true);
        self.in_flight.set(false);
        outcome
    }

    /// Runs `source` in a fresh scope and renders the result. The scope is
    /// purged on every path once it exists.
    async fn execute(&self, source: &str) -> Result<usize, RunError> {
        let scope = self.runtime.create_scope().await.map_err(RunError::Scope)?;

        let rendered = match scope.capture(source, &self.config.capture).await {
            Ok(capture) => self.render(&capture),
            Err(err) => Err(RunError::Capture(err)),
        };

        match (rendered, scope.purge().await) {
            (Ok(n), Ok(())) => Ok(n),
            (Ok(_), Err(err)) => Err(RunError::Release(err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(purge_err)) => {
                warn!("purge after failed run also failed: {purge_err}");
                Err(err)
            }
        }
    }

    fn render(&self, capture: &Capture<R::Image>) -> Result<usize, RunError> {
        for out in &capture.output {
            debug!(kind = out.kind.label(), "{}", out.text);
        }
        if capture.images.is_empty() {
            self.view.show_status(NO_PLOT_MESSAGE);
            return Ok(0);
        }
        for (i, img) in capture.images.iter().enumerate() {
            debug!(index = i, width = img.width(), height = img.height(), "captured image");
        }
        self.view
            .show_plots(&capture.images)
            .map_err(RunError::Render)?;
        Ok(capture.images.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeImage, FakeRuntime, FakeView, Output};
    use crate::runtime::CaptureOptions;
    use crate::view::RUN_ERROR_PREFIX;
    use pollster::block_on;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tracing_test::traced_test;

    type Harness = (Rc<FakeRuntime>, Rc<FakeView>, Executor<FakeRuntime, FakeView>);

    fn executor(rt: FakeRuntime, view: FakeView) -> Harness {
        let rt = Rc::new(rt);
        let view = Rc::new(view);
        let exec = Executor::new(
            Rc::clone(&rt),
            Rc::clone(&view),
            Rc::new(PlotConfig::default()),
        );
        (rt, view, exec)
    }

    #[test]
    fn draws_one_canvas_per_image_in_order() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("plot(1)"));
        rt.push_capture(Ok(vec![FakeImage::new(10, 20), FakeImage::new(5, 5)]));

        assert_eq!(block_on(exec.run()), RunOutcome::Plotted(2));
        assert_eq!(
            view.output(),
            vec![
                Output::Canvas { width: 10, height: 20 },
                Output::Canvas { width: 5, height: 5 },
            ]
        );
        assert_eq!(rt.calls(), vec!["scope", "capture", "purge"]);
    }

    #[test]
    fn empty_capture_shows_no_plot_message() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("x <- 1"));
        rt.push_capture(Ok(vec![]));

        assert_eq!(block_on(exec.run()), RunOutcome::NoPlot);
        assert_eq!(view.output(), vec![Output::Text(NO_PLOT_MESSAGE.to_string())]);
        assert_eq!(rt.calls(), vec!["scope", "capture", "purge"]);
    }

    #[test]
    fn failed_capture_shows_error_and_still_purges() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("stop('boom')"));
        rt.push_capture(Err("boom"));

        assert_eq!(block_on(exec.run()), RunOutcome::Failed);
        let out = view.output();
        assert_eq!(out.len(), 1);
        match &out[0] {
            Output::Error(msg) => {
                assert!(msg.starts_with(RUN_ERROR_PREFIX), "{msg}");
                assert!(msg.contains("boom"), "{msg}");
            }
            other => panic!("expected error output, got {other:?}"),
        }
        assert!(!out.iter().any(|o| matches!(o, Output::Canvas { .. })));
        assert_eq!(rt.calls(), vec!["scope", "capture", "purge"]);
    }

    #[test]
    fn scope_failure_is_reported_without_capture() {
        let rt = FakeRuntime {
            fail_scope: Some("runtime gone".to_string()),
            ..FakeRuntime::default()
        };
        let (rt, view, exec) = executor(rt, FakeView::with_editor("1"));

        assert_eq!(block_on(exec.run()), RunOutcome::Failed);
        assert_eq!(rt.calls(), vec!["scope"]);
        assert!(matches!(&view.output()[0], Output::Error(m) if m.contains("runtime gone")));
    }

    #[test]
    fn purge_failure_after_success_fails_the_run() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("plot(1)"));
        rt.push_capture(Ok(vec![FakeImage::new(4, 4)]));
        rt.fail_purge("purge rejected");

        assert_eq!(block_on(exec.run()), RunOutcome::Failed);
        assert!(matches!(&view.output()[0], Output::Error(m) if m.contains("purge rejected")));
    }

    #[test]
    #[traced_test]
    fn purge_failure_after_failed_run_keeps_original_error() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("bad("));
        rt.push_capture(Err("unexpected end of input"));
        rt.fail_purge("purge rejected");

        assert_eq!(block_on(exec.run()), RunOutcome::Failed);
        let out = view.output();
        assert!(matches!(&out[0], Output::Error(m) if m.contains("unexpected end of input") && !m.contains("purge")));
        assert!(logs_contain("purge after failed run also failed"));
    }

    #[test]
    fn render_failure_is_a_run_failure() {
        let view = FakeView {
            fail_render: Some("no 2d context".to_string()),
            ..FakeView::with_editor("plot(1)")
        };
        let (rt, view, exec) = executor(FakeRuntime::default(), view);
        rt.push_capture(Ok(vec![FakeImage::new(1, 1)]));

        assert_eq!(block_on(exec.run()), RunOutcome::Failed);
        assert!(matches!(&view.output()[0], Output::Error(m) if m.contains("no 2d context")));
        assert_eq!(rt.calls(), vec!["scope", "capture", "purge"]);
    }

    #[test]
    fn code_is_read_fresh_and_wrapped_with_preamble() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("first()"));
        block_on(exec.run());
        view.type_code("second()");
        block_on(exec.run());

        let subs = rt.submissions();
        assert_eq!(subs.len(), 2);
        let cfg = PlotConfig::default();
        assert_eq!(subs[0].0, cfg.submission("first()"));
        assert_eq!(subs[1].0, cfg.submission("second()"));
        assert!(subs[1].0.starts_with("library(dplyr)\nlibrary(ggplot2)\n"));
        assert_eq!(subs[0].1, CaptureOptions::default());
        assert_eq!(exec.runs_started(), 2);
    }

    #[test]
    fn each_run_replaces_previous_output() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("p"));
        rt.push_capture(Ok(vec![FakeImage::new(3, 3), FakeImage::new(2, 2)]));
        rt.push_capture(Ok(vec![FakeImage::new(8, 6)]));

        block_on(exec.run());
        assert_eq!(block_on(exec.run()), RunOutcome::Plotted(1));
        assert_eq!(view.output(), vec![Output::Canvas { width: 8, height: 6 }]);
    }

    #[test]
    fn run_control_is_disabled_while_running() {
        let (_rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("p"));
        block_on(exec.run());
        assert_eq!(*view.run_enabled_history.borrow(), vec![false, true]);
        assert!(view.run_enabled.get());

        let view = FakeView::with_editor("p");
        let (rt, view, exec) = executor(FakeRuntime::default(), view);
        rt.push_capture(Err("boom"));
        block_on(exec.run());
        assert_eq!(*view.run_enabled_history.borrow(), vec![false, true]);
        assert!(!exec.is_running());
    }

    #[test]
    #[traced_test]
    fn overlapping_run_is_skipped() {
        let rt = Rc::new(FakeRuntime::default());
        let view = Rc::new(FakeView::with_editor("plot(1)"));
        let exec = Rc::new(Executor::new(
            Rc::clone(&rt),
            Rc::clone(&view),
            Rc::new(PlotConfig::default()),
        ));
        rt.push_capture(Ok(vec![FakeImage::new(2, 2)]));

        let nested: Rc<RefCell<Option<RunOutcome>>> = Rc::new(RefCell::new(None));
        {
            let exec = Rc::clone(&exec);
            let nested = Rc::clone(&nested);
            rt.during_capture(move || {
                assert!(exec.is_running());
                *nested.borrow_mut() = Some(block_on(exec.run()));
            });
        }

        assert_eq!(block_on(exec.run()), RunOutcome::Plotted(1));
        assert_eq!(*nested.borrow(), Some(RunOutcome::Skipped));
        assert_eq!(rt.calls(), vec!["scope", "capture", "purge"]);
        assert_eq!(exec.runs_started(), 1);
        assert!(logs_contain("another is in flight"));
    }

    #[test]
    fn shows_running_message_before_submitting() {
        let (rt, view, exec) = executor(FakeRuntime::default(), FakeView::with_editor("p"));
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let view = Rc::clone(&view);
            let seen = Rc::clone(&seen);
            rt.during_capture(move || *seen.borrow_mut() = view.output());
        }
        block_on(exec.run());
        assert_eq!(*seen.borrow(), vec![Output::Text(RUNNING_MESSAGE.to_string())]);
    }
}
