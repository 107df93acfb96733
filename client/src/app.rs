use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSpanElement, KeyboardEvent,
    PointerEvent, Window,
};

use drawarea_core::{
    Board, Key, PointerButton, PointerEvent as BoardEvent, PointerKind, ResultExt, Surface,
};

use crate::dom::{
    debug_enabled, event_to_point, find_canvas, find_element, read_config, set_cursor,
    update_size_label, viewport_size, WindowPrompt,
};
use crate::logging::configure_logging;
use crate::palette::{color_from_event, mark_selected, paint_swatches, swatches};
use crate::persistence::BrowserStore;
use crate::surface::CanvasSurface;

/// The single state object every listener borrows.
struct App {
    board: Board,
    surface: CanvasSurface,
    store: BrowserStore,
    prompt: WindowPrompt,
}

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn board_event(
    canvas: &HtmlCanvasElement,
    kind: PointerKind,
    event: &PointerEvent,
) -> Option<BoardEvent> {
    let button = match kind {
        PointerKind::Down => PointerButton::from_dom(event.button())?,
        _ => PointerButton::from_dom(event.button()).unwrap_or(PointerButton::Primary),
    };
    let position = event_to_point(canvas, event);
    Some(BoardEvent::new(kind, button, position).with_erase_modifier(event.ctrl_key()))
}

fn add_listener<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    name: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    if let Err(error) = configure_logging(debug_enabled(&window)) {
        web_sys::console::warn_1(&format!("Logging unavailable: {error}").into());
    }

    let started = Rc::new(Cell::new(false));
    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app(&window);
    }

    let onload_window = window.clone();
    add_listener(window.as_ref(), "load", move |_: Event| {
        if started.replace(true) {
            return;
        }
        if let Err(err) = start_app(&onload_window) {
            web_sys::console::error_1(&err);
        }
    })
}

fn start_app(window: &Window) -> Result<(), JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let canvas = find_canvas(&document)?;
    let config = read_config(&canvas);
    let store = BrowserStore::open(window);
    let board = Board::load(config, &store);
    let mut surface = CanvasSurface::new(canvas.clone())?;

    let scale = window.device_pixel_ratio();
    tracing::info!("Drawarea loaded");
    tracing::info!(scale, "device scale");
    board
        .resize(&mut surface, viewport_size(window), scale)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    board.restore(&mut surface, &store);

    let swatch_elements = swatches(&document);
    paint_swatches(&swatch_elements);
    mark_selected(&swatch_elements, &board.style().color);

    let size_input: Option<HtmlInputElement> = find_element(&document, "size");
    let size_value: Option<HtmlSpanElement> = find_element(&document, "sizeValue");
    if let Some(input) = &size_input {
        input.set_value(&board.style().stroke_width.to_string());
        if let Some(label) = &size_value {
            update_size_label(input, label);
        }
    }

    let app = Rc::new(RefCell::new(App {
        board,
        surface,
        store,
        prompt: WindowPrompt::new(window.clone()),
    }));

    add_listener(canvas.as_ref(), "contextmenu", |event: Event| {
        event.prevent_default();
    })?;

    for (name, kind) in [
        ("pointerdown", PointerKind::Down),
        ("pointermove", PointerKind::Move),
        ("pointerup", PointerKind::Up),
        ("pointerleave", PointerKind::Leave),
    ] {
        let app = app.clone();
        let canvas_cb = canvas.clone();
        add_listener(canvas.as_ref(), name, move |event: PointerEvent| {
            let Some(input) = board_event(&canvas_cb, kind, &event) else {
                return;
            };
            let mut app = app.borrow_mut();
            let App {
                board,
                surface,
                prompt,
                ..
            } = &mut *app;
            board.handle_pointer(surface, prompt, input).ok_or_log();
        })?;
    }

    {
        let app = app.clone();
        let canvas = canvas.clone();
        add_listener(document.as_ref(), "keydown", move |event: KeyboardEvent| {
            let key = Key::from_dom(&event.key());
            let mut app = app.borrow_mut();
            let App { board, surface, .. } = &mut *app;
            if let Some(cursor) = board.handle_key_down(surface, &key) {
                set_cursor(&canvas, &cursor);
            }
        })?;
    }

    {
        let app = app.clone();
        let canvas = canvas.clone();
        add_listener(document.as_ref(), "keyup", move |event: KeyboardEvent| {
            let key = Key::from_dom(&event.key());
            if let Some(cursor) = app.borrow_mut().board.handle_key_up(&key) {
                set_cursor(&canvas, &cursor);
            }
        })?;
    }

    {
        let app = app.clone();
        let window_cb = window.clone();
        add_listener(window.as_ref(), "resize", move |_: Event| {
            let mut app = app.borrow_mut();
            let App { board, surface, .. } = &mut *app;
            board
                .resize(surface, viewport_size(&window_cb), window_cb.device_pixel_ratio())
                .ok_or_log();
        })?;
    }

    for swatch in &swatch_elements {
        let app = app.clone();
        let swatch_elements: Vec<HtmlElement> = swatch_elements.clone();
        add_listener(swatch.as_ref(), "click", move |event: Event| {
            let Some(color) = color_from_event(&event) else {
                return;
            };
            let mut app = app.borrow_mut();
            let App { board, store, .. } = &mut *app;
            board.select_color(color, store).ok_or_log();
            mark_selected(&swatch_elements, &board.style().color);
        })?;
    }

    if let Some(input) = size_input {
        let app = app.clone();
        let input_cb = input.clone();
        add_listener(input.as_ref(), "input", move |_: Event| {
            let Ok(width) = input_cb.value().trim().parse::<u32>() else {
                return;
            };
            let mut app = app.borrow_mut();
            let App { board, store, .. } = &mut *app;
            board.select_width(width, store).ok_or_log();
            if let Some(label) = &size_value {
                update_size_label(&input_cb, label);
            }
        })?;
    }

    {
        let app = app.clone();
        let interval = app.borrow().board.persistence().interval();
        let onsave = Closure::<dyn FnMut()>::new(move || {
            let mut app = app.borrow_mut();
            let App {
                board,
                surface,
                store,
                ..
            } = &mut *app;
            board.save(&*surface, store).ok_or_log();
        });
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            onsave.as_ref().unchecked_ref(),
            interval.as_millis().min(i32::MAX as u128) as i32,
        )?;
        onsave.forget();
    }

    tracing::debug!(
        size = ?app.borrow().surface.logical_size(),
        "listeners attached"
    );
    Ok(())
}
