use wasm_bindgen::JsCast;

/// A fresh canvas sized to `bitmap`, with the bitmap drawn at the origin.
pub(super) fn bitmap_canvas(
    document: &web_sys::Document,
    bitmap: &web_sys::ImageBitmap,
) -> Result<web_sys::HtmlCanvasElement, String> {
    let canvas = document
        .create_element("canvas")
        .map_err(|_| "document: create_element(canvas) failed".to_string())?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| "document: canvas cast failed".to_string())?;
    canvas.set_width(bitmap.width());
    canvas.set_height(bitmap.height());

    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_image_bitmap(bitmap, 0.0, 0.0)
        .map_err(|_| "canvas: drawImage threw".to_string())?;
    Ok(canvas)
}

fn context_2d(
    canvas: &web_sys::HtmlCanvasElement,
) -> Result<web_sys::CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}
