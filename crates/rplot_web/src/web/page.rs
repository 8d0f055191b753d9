use std::cell::RefCell;

use rplot::config::ElementIds;
use rplot::error::PageError;
use rplot::view::PageView;
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlTextAreaElement};

use super::canvas::bitmap_canvas;
use super::webr::Plot;
use crate::ui_model::{percent_text, ERROR_CLASS};

/// The named page regions, looked up once at boot.
pub(super) struct DomPage {
    document: Document,
    loading: HtmlElement,
    content: HtmlElement,
    progress: Element,
    progress_bar: HtmlElement,
    run_button: Element,
    plot_output: Element,
    /// Swapped for a `<textarea>` when the editor is prepared.
    code: RefCell<Element>,
}

impl DomPage {
    pub(super) fn lookup(document: &Document, ids: &ElementIds) -> Result<Self, String> {
        Ok(Self {
            document: document.clone(),
            loading: by_id(document, &ids.loading)?,
            content: by_id(document, &ids.content)?,
            progress: by_id(document, &ids.progress)?,
            progress_bar: by_id(document, &ids.progress_bar)?,
            run_button: by_id(document, &ids.run_button)?,
            plot_output: by_id(document, &ids.plot_output)?,
            code: RefCell::new(by_id(document, &ids.code_display)?),
        })
    }

    pub(super) fn run_button(&self) -> &Element {
        &self.run_button
    }

    fn paragraph(&self, text: &str, class: Option<&str>) -> Result<Element, String> {
        let p = self
            .document
            .create_element("p")
            .map_err(|_| "document: create_element(p) failed".to_string())?;
        p.set_text_content(Some(text));
        if let Some(class) = class {
            p.set_class_name(class);
        }
        Ok(p)
    }

    /// Replaces everything inside `target` with a single paragraph.
    fn replace_with_message(&self, target: &Element, text: &str, class: Option<&str>) {
        target.set_inner_html("");
        match self.paragraph(text, class) {
            Ok(p) => {
                if target.append_child(&p).is_err() {
                    target.set_text_content(Some(text));
                }
            }
            Err(e) => {
                warn!("{e}");
                target.set_text_content(Some(text));
            }
        }
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, String> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| format!("no element with id `{id}`"))?
        .dyn_into::<T>()
        .map_err(|_| format!("element `{id}` has an unexpected type"))
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    if el.style().set_property(property, value).is_err() {
        warn!("could not set {property} on #{}", el.id());
    }
}

impl PageView for DomPage {
    type Image = Plot;

    fn set_progress(&self, percent: u8) {
        let text = percent_text(percent);
        self.progress.set_text_content(Some(&text));
        set_style(&self.progress_bar, "width", &text);
    }

    fn prepare_editor(&self, default_snippet: &str) -> Result<(), PageError> {
        let current = self.code.borrow().clone();
        if let Some(area) = current.dyn_ref::<HtmlTextAreaElement>() {
            if area.value().trim().is_empty() {
                area.set_value(default_snippet);
            }
            return Ok(());
        }

        let existing = current.text_content().unwrap_or_default();
        let area = self
            .document
            .create_element("textarea")
            .map_err(|_| PageError::from("document: create_element(textarea) failed"))?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| PageError::from("document: textarea cast failed"))?;
        area.set_id(&current.id());
        area.set_class_name(&current.class_name());
        let _ = area.set_attribute("spellcheck", "false");
        area.set_value(if existing.trim().is_empty() {
            default_snippet
        } else {
            existing.as_str()
        });

        current
            .replace_with_with_node_1(&area)
            .map_err(|_| PageError::from("code area: replaceWith() threw"))?;
        *self.code.borrow_mut() = area.into();
        Ok(())
    }

    fn reveal_content(&self) {
        set_style(&self.loading, "display", "none");
        set_style(&self.content, "display", "block");
    }

    fn set_run_enabled(&self, enabled: bool) {
        let res = if enabled {
            self.run_button.remove_attribute("disabled")
        } else {
            self.run_button.set_attribute("disabled", "")
        };
        if res.is_err() {
            warn!("could not toggle the run button");
        }
    }

    fn show_setup_error(&self, message: &str) {
        self.replace_with_message(&self.loading, message, Some(ERROR_CLASS));
    }

    fn code(&self) -> String {
        let code = self.code.borrow();
        match code.dyn_ref::<HtmlTextAreaElement>() {
            Some(area) => area.value(),
            None => code.text_content().unwrap_or_default(),
        }
    }

    fn show_status(&self, message: &str) {
        self.replace_with_message(&self.plot_output, message, None);
    }

    fn show_plots(&self, images: &[Plot]) -> Result<(), PageError> {
        self.plot_output.set_inner_html("");
        for plot in images {
            let canvas = bitmap_canvas(&self.document, &plot.0)?;
            self.plot_output
                .append_child(&canvas)
                .map_err(|_| PageError::from("plot output: appendChild threw"))?;
        }
        Ok(())
    }

    fn show_run_error(&self, message: &str) {
        self.replace_with_message(&self.plot_output, message, Some(ERROR_CLASS));
    }
}
