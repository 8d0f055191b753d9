use std::rc::Rc;

use rplot::view::{setup_error_text, PageView};
use rplot::{bootstrap, Executor, PlotConfig};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::ui_model::{config_from_block, parse_log_level, CONFIG_ELEMENT_ID};

mod canvas;
mod logging;
mod page;
mod webr;

use page::DomPage;
use webr::WebRRuntime;

type PageExecutor = Executor<WebRRuntime, DomPage>;

/// Reads the page config, installs console logging and schedules the boot
/// sequence for the window `load` event (or right away if it already fired).
pub fn start() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let block = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content());
    let (config, config_err) = config_from_block(block.as_deref());
    logging::init(parse_log_level(&config.log_level));
    if let Some(e) = config_err {
        warn!("ignoring page config: {e}");
    }
    let config = Rc::new(config);

    if document.ready_state() == "complete" {
        spawn_local(boot(document, config));
        return;
    }

    let on_load = Closure::once(move |_ev: web_sys::Event| {
        spawn_local(boot(document, config));
    });
    if window
        .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
        .is_err()
    {
        error!("could not register the load handler");
    }
    on_load.forget();
}

async fn boot(document: web_sys::Document, config: Rc<PlotConfig>) {
    let view = match DomPage::lookup(&document, &config.elements) {
        Ok(v) => Rc::new(v),
        Err(e) => {
            error!("page is missing required elements: {e}");
            return;
        }
    };

    let runtime = match WebRRuntime::new() {
        Ok(rt) => Rc::new(rt),
        Err(e) => {
            error!("could not construct WebR: {e}");
            view.show_setup_error(&setup_error_text(&e));
            return;
        }
    };

    info!(packages = ?config.packages, "starting WebR");
    // Failures are logged and shown by the boot sequence itself.
    if let Ok(executor) = bootstrap(runtime, Rc::clone(&view), config).await {
        arm(&view, Rc::new(executor));
    }
}

fn arm(view: &DomPage, executor: Rc<PageExecutor>) {
    let on_click = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
        let executor = Rc::clone(&executor);
        spawn_local(async move {
            let outcome = executor.run().await;
            debug!(?outcome, "run finished");
        });
    }) as Box<dyn FnMut(_)>);

    if let Err(e) = view
        .run_button()
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
    {
        error!("could not arm the run button: {}", webr::js_error_message(&e));
    }
    on_click.forget();
}

