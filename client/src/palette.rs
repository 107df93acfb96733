use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement};

pub const COLOR_ATTRIBUTE: &str = "data-color";
const SELECTED_CLASS: &str = "selected";

pub fn swatches(document: &Document) -> Vec<HtmlElement> {
    let Ok(nodes) = document.query_selector_all(&format!("[{COLOR_ATTRIBUTE}]")) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

pub fn paint_swatches(swatches: &[HtmlElement]) {
    for swatch in swatches {
        if let Some(color) = swatch.get_attribute(COLOR_ATTRIBUTE) {
            let _ = swatch.style().set_property("background", &color);
        }
    }
}

pub fn mark_selected(swatches: &[HtmlElement], color: &str) {
    for swatch in swatches {
        let selected = swatch
            .get_attribute(COLOR_ATTRIBUTE)
            .is_some_and(|value| value.eq_ignore_ascii_case(color));
        let _ = swatch
            .class_list()
            .toggle_with_force(SELECTED_CLASS, selected);
    }
}

pub fn color_from_event(event: &Event) -> Option<String> {
    let mut current = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    while let Some(element) = current {
        if let Some(color) = element.get_attribute(COLOR_ATTRIBUTE) {
            return Some(color);
        }
        current = element.parent_element();
    }
    None
}
