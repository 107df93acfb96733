use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlImageElement, ImageData};

use drawarea_core::{Point, Size, SnapshotError, Surface, SurfaceError};

const SNAPSHOT_MIME: &str = "image/png";

fn backend(err: JsValue) -> SurfaceError {
    SurfaceError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scale: f64,
    importing: Rc<Cell<bool>>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let options = Object::new();
        Reflect::set(
            &options,
            &JsValue::from_str("willReadFrequently"),
            &JsValue::TRUE,
        )?;
        let ctx = canvas
            .get_context_with_context_options("2d", &options)?
            .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let surface = Self {
            canvas,
            ctx,
            scale: 1.0,
            importing: Rc::new(Cell::new(false)),
        };
        surface.apply_line_style();
        Ok(surface)
    }

    // Resizing a canvas resets its context state.
    fn apply_line_style(&self) {
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
    }
}

impl Surface for CanvasSurface {
    type Capture = ImageData;

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: &str,
        width: u32,
    ) -> Result<(), SurfaceError> {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
        self.ctx.close_path();
        Ok(())
    }

    fn fill_dot(&mut self, position: Point, size: u32, color: &str) -> Result<(), SurfaceError> {
        let size = size as f64;
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(position.x, position.y, size, size);
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: &str,
        font: &str,
    ) -> Result<(), SurfaceError> {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
        self.ctx
            .fill_text(text, position.x, position.y)
            .map_err(backend)
    }

    fn clear_region(&mut self, position: Point, width: f64, height: f64) {
        self.ctx.clear_rect(position.x, position.y, width, height);
    }

    fn export_snapshot(&self) -> Result<String, SurfaceError> {
        self.canvas
            .to_data_url_with_type(SNAPSHOT_MIME)
            .map_err(backend)
    }

    /// Decoding happens in the image element; the draw runs from its load
    /// callback once the canvas is known to still be in the document.
    fn import_snapshot(&mut self, snapshot: &str) -> Result<(), SurfaceError> {
        if !self.canvas.is_connected() {
            return Err(SurfaceError::Detached);
        }
        if !snapshot.starts_with("data:image/") {
            return Err(SnapshotError::InvalidData.into());
        }
        let image = HtmlImageElement::new().map_err(backend)?;
        let canvas = self.canvas.clone();
        let ctx = self.ctx.clone();
        let scale = self.scale;
        let loaded = image.clone();
        let load_done = self.importing.clone();
        let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
            load_done.set(false);
            if !canvas.is_connected() {
                tracing::warn!("canvas detached before snapshot decoded");
                return;
            }
            let width = loaded.natural_width() as f64 / scale;
            let height = loaded.natural_height() as f64 / scale;
            if let Err(err) =
                ctx.draw_image_with_html_image_element_and_dw_and_dh(&loaded, 0.0, 0.0, width, height)
            {
                tracing::warn!(error = ?err, "drawing snapshot failed");
            }
        });
        let error_done = self.importing.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            error_done.set(false);
            tracing::warn!("stored snapshot could not be decoded, starting blank");
        });
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
        self.importing.set(true);
        image.set_src(snapshot);
        Ok(())
    }

    fn is_importing(&self) -> bool {
        self.importing.get()
    }

    fn capture(&self) -> Result<ImageData, SurfaceError> {
        let width = self.canvas.width().max(1) as f64;
        let height = self.canvas.height().max(1) as f64;
        self.ctx
            .get_image_data(0.0, 0.0, width, height)
            .map_err(backend)
    }

    fn restore(&mut self, capture: &ImageData) -> Result<(), SurfaceError> {
        self.ctx
            .put_image_data(capture, 0.0, 0.0)
            .map_err(backend)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.scale = 1.0;
        self.apply_line_style();
    }

    fn set_device_scale(&mut self, factor: f64) {
        if let Err(err) = self.ctx.set_transform(factor, 0.0, 0.0, factor, 0.0, 0.0) {
            tracing::error!(error = ?err, "setting device scale failed");
            return;
        }
        self.scale = factor;
    }

    fn logical_size(&self) -> Size {
        Size::new(
            self.canvas.width() as f64 / self.scale,
            self.canvas.height() as f64 / self.scale,
        )
    }
}
