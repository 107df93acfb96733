use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSpanElement, MouseEvent,
    Window,
};

use drawarea_core::{Config, Cursor, Point, Size, TextPrompt};

pub const CONFIG_ATTRIBUTE: &str = "data-config";

pub fn find_element<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
}

pub fn find_canvas(document: &Document) -> Result<HtmlCanvasElement, JsValue> {
    document
        .query_selector("canvas")?
        .ok_or_else(|| JsValue::from_str("Missing canvas"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("Invalid element type: canvas"))
}

pub fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1") || search.contains("debug=true")
}

/// Defaults, overridden by a JSON object in the canvas's `data-config`.
pub fn read_config(canvas: &HtmlCanvasElement) -> Config {
    let Some(text) = canvas.get_attribute(CONFIG_ATTRIBUTE) else {
        return Config::default();
    };
    match Config::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "ignoring {CONFIG_ATTRIBUTE}");
            Config::default()
        }
    }
}

pub fn viewport_size(window: &Window) -> Size {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    Size::new(width, height)
}

pub fn update_size_label(input: &HtmlInputElement, value: &HtmlSpanElement) {
    value.set_text_content(Some(&input.value()));
}

pub fn set_cursor(canvas: &HtmlCanvasElement, cursor: &Cursor) {
    if let Ok(element) = canvas.clone().dyn_into::<HtmlElement>() {
        let _ = element.style().set_property("cursor", cursor.css());
    }
}

/// Pointer position relative to the canvas's top-left corner.
pub fn event_to_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> Point {
    let rect = canvas.get_bounding_client_rect();
    Point::new(
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    )
}

pub struct WindowPrompt {
    window: Window,
}

impl WindowPrompt {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TextPrompt for WindowPrompt {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.window.prompt_with_message(message).ok().flatten()
    }
}
