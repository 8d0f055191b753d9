//! The one-shot boot sequence: bring the runtime up, install packages one at a
//! time, hand the user an editor and arm the run control.

use std::rc::Rc;

use tracing::{error, info};

use crate::config::PlotConfig;
use crate::error::SetupError;
use crate::executor::Executor;
use crate::progress::{BootStep, ProgressPlan, ProgressTracker};
use crate::runtime::RRuntime;
use crate::time::Instant;
use crate::view::{setup_error_text, PageView};

/// Runs the boot sequence once. On success the content view is visible, the
/// run control is enabled and the returned [`Executor`] is ready for clicks.
///
/// Any failing step stops the sequence: the error replaces the loading view
/// and the content is never revealed.
pub async fn bootstrap<R, V>(
    runtime: Rc<R>,
    view: Rc<V>,
    config: Rc<PlotConfig>,
) -> Result<Executor<R, V>, SetupError>
where
    R: RRuntime,
    V: PageView<Image = R::Image>,
{
    let started = Instant::now();
    if let Err(err) = run_steps(&*runtime, &*view, &config).await {
        error!("error initializing WebR: {err}");
        view.show_setup_error(&setup_error_text(&err));
        return Err(err);
    }

    view.reveal_content();
    view.set_run_enabled(true);
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        packages = config.packages.len(),
        "ready"
    );
    Ok(Executor::new(runtime, view, config))
}

async fn run_steps<R, V>(runtime: &R, view: &V, config: &PlotConfig) -> Result<(), SetupError>
where
    R: RRuntime,
    V: PageView,
{
    let mut progress = ProgressTracker::new(ProgressPlan::for_packages(config.packages.len()));
    view.set_progress(progress.start());

    let t = Instant::now();
    runtime.init().await.map_err(SetupError::Init)?;
    step_done(&BootStep::Init, t, view, &mut progress);

    for (index, package) in config.packages.iter().enumerate() {
        let t = Instant::now();
        runtime
            .install_packages(std::slice::from_ref(package))
            .await
            .map_err(|source| SetupError::Install {
                package: package.clone(),
                source,
            })?;
        let step = BootStep::Install {
            index,
            package: package.clone(),
        };
        step_done(&step, t, view, &mut progress);
    }

    let t = Instant::now();
    view.prepare_editor(&config.default_snippet)
        .map_err(SetupError::Editor)?;
    step_done(&BootStep::PrepareEditor, t, view, &mut progress);
    Ok(())
}

fn step_done<V: PageView>(
    step: &BootStep,
    started: Instant,
    view: &V,
    progress: &mut ProgressTracker,
) {
    let percent = progress.complete_step();
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        percent, "{step} done"
    );
    view.set_progress(percent);
}
