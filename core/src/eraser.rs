use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::geometry::Point;
use crate::surface::Surface;

#[derive(Clone, Debug, PartialEq)]
pub enum Cursor {
    Default,
    Eraser(String),
}

impl Cursor {
    pub fn css(&self) -> &str {
        match self {
            Cursor::Default => "auto",
            Cursor::Eraser(css) => css,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EraserState {
    pub active: bool,
    pub size: u32,
}

impl EraserState {
    pub fn new(size: u32) -> Self {
        Self {
            active: false,
            size: size.max(1),
        }
    }

    /// Clears the square of side `size` centered on `position`.
    pub fn erase_at<S: Surface>(&self, surface: &mut S, position: Point) {
        let side = self.size as f64;
        let corner = position.offset(-side / 2.0, -side / 2.0);
        surface.clear_region(corner, side, side);
    }

    pub fn cursor(&self) -> Cursor {
        if self.active {
            Cursor::Eraser(eraser_cursor(self.size))
        } else {
            Cursor::Default
        }
    }
}

/// CSS cursor value showing a square outline of the erase size, hotspot centered.
pub fn eraser_cursor(size: u32) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{size}' height='{size}'><rect width='{size}' height='{size}' fill='transparent' stroke='white' stroke-width='4'/></svg>"
    );
    let hotspot = size / 2;
    format!(
        "url(\"data:image/svg+xml;base64,{}\") {hotspot} {hotspot}, auto",
        STANDARD.encode(svg)
    )
}
