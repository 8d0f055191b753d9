//! Binding to the WebR JavaScript module.

use rplot::error::RuntimeError;
use rplot::runtime::{
    Capture, CaptureOptions, CaptureOutput, OutputKind, PlotImage, RRuntime, Shelter,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(raw_module = "https://webr.r-wasm.org/latest/webr.mjs")]
extern "C" {
    type WebR;

    #[wasm_bindgen(constructor, catch)]
    fn new() -> Result<WebR, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn init(this: &WebR) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = installPackages)]
    fn install_packages(this: &WebR, packages: &js_sys::Array) -> Result<js_sys::Promise, JsValue>;

    /// The `Shelter` class bound to this instance; `new` on it yields a promise.
    #[wasm_bindgen(method, getter = Shelter)]
    fn shelter_class(this: &WebR) -> js_sys::Function;

    type JsShelter;

    #[wasm_bindgen(method, catch, js_name = captureR)]
    fn capture_r(this: &JsShelter, code: &str, options: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn purge(this: &JsShelter) -> Result<js_sys::Promise, JsValue>;
}

/// A plot captured from the graphics device.
pub(super) struct Plot(pub(super) web_sys::ImageBitmap);

impl PlotImage for Plot {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }
}

pub(super) struct WebRRuntime {
    webr: WebR,
}

impl WebRRuntime {
    pub(super) fn new() -> Result<Self, String> {
        let webr = WebR::new().map_err(|e| format!("new WebR() threw: {}", js_error_message(&e)))?;
        Ok(Self { webr })
    }
}

impl RRuntime for WebRRuntime {
    type Image = Plot;
    type Scope = WebRShelter;

    async fn init(&self) -> Result<(), RuntimeError> {
        let promise = self.webr.init().map_err(js_runtime_error)?;
        settle(promise).await.map(|_| ())
    }

    async fn install_packages(&self, names: &[String]) -> Result<(), RuntimeError> {
        let list: js_sys::Array = names.iter().map(|n| JsValue::from_str(n)).collect();
        let promise = self
            .webr
            .install_packages(&list)
            .map_err(js_runtime_error)?;
        settle(promise).await.map(|_| ())
    }

    async fn create_scope(&self) -> Result<WebRShelter, RuntimeError> {
        let class = self.webr.shelter_class();
        let pending = js_sys::Reflect::construct(&class, &js_sys::Array::new())
            .map_err(js_runtime_error)?;
        let shelter = match pending.dyn_into::<js_sys::Promise>() {
            Ok(promise) => settle(promise).await?,
            Err(ready) => ready,
        };
        Ok(WebRShelter {
            inner: shelter.unchecked_into(),
        })
    }
}

pub(super) struct WebRShelter {
    inner: JsShelter,
}

impl Shelter for WebRShelter {
    type Image = Plot;

    async fn capture(
        &self,
        code: &str,
        options: &CaptureOptions,
    ) -> Result<Capture<Plot>, RuntimeError> {
        let options = options_to_js(options)?;
        let promise = self
            .inner
            .capture_r(code, &options)
            .map_err(js_runtime_error)?;
        let result = settle(promise).await?;
        read_capture(&result).map_err(RuntimeError::from)
    }

    async fn purge(&self) -> Result<(), RuntimeError> {
        let promise = self.inner.purge().map_err(js_runtime_error)?;
        settle(promise).await.map(|_| ())
    }
}

async fn settle(promise: js_sys::Promise) -> Result<JsValue, RuntimeError> {
    JsFuture::from(promise).await.map_err(js_runtime_error)
}

fn options_to_js(options: &CaptureOptions) -> Result<JsValue, RuntimeError> {
    let json = serde_json::to_string(options)
        .map_err(|e| RuntimeError::new(format!("capture options: {e}")))?;
    js_sys::JSON::parse(&json).map_err(js_runtime_error)
}

fn read_capture(value: &JsValue) -> Result<Capture<Plot>, String> {
    let mut capture = Capture::default();

    let images = field(value, "images")?;
    if !images.is_undefined() && !images.is_null() {
        let images = images
            .dyn_into::<js_sys::Array>()
            .map_err(|_| "capture: images is not an array".to_string())?;
        for item in images.iter() {
            let bitmap = item
                .dyn_into::<web_sys::ImageBitmap>()
                .map_err(|_| "capture: image is not an ImageBitmap".to_string())?;
            capture.images.push(Plot(bitmap));
        }
    }

    let output = field(value, "output")?;
    if let Ok(output) = output.dyn_into::<js_sys::Array>() {
        for item in output.iter() {
            let kind = field(&item, "type")?.as_string().unwrap_or_default();
            // Stream lines carry a string; conditions carry an R object we do not unpack.
            let text = field(&item, "data")?.as_string().unwrap_or_default();
            capture.output.push(CaptureOutput {
                kind: OutputKind::parse(&kind),
                text,
            });
        }
    }

    Ok(capture)
}

fn field(value: &JsValue, name: &str) -> Result<JsValue, String> {
    js_sys::Reflect::get(value, &JsValue::from_str(name))
        .map_err(|_| format!("capture: reading `{name}` threw"))
}

fn js_runtime_error(err: JsValue) -> RuntimeError {
    RuntimeError::new(js_error_message(&err))
}

/// Best-effort description of a thrown JS value: `Error.message`, then the
/// value itself if it is a string, then any `message` property.
pub(super) fn js_error_message(err: &JsValue) -> String {
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    if let Some(s) = err.as_string() {
        return s;
    }
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}
