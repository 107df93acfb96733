use tracing::{debug, warn};

use crate::config::Config;
use crate::persistence::{Store, StoreError};

pub const MIN_STROKE_WIDTH: u32 = 1;
pub const MAX_STROKE_WIDTH: u32 = 60;
const MAX_COLOR_LEN: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct StyleState {
    pub color: String,
    pub stroke_width: u32,
    pub font: String,
}

pub fn sanitize_color(mut color: String, fallback: &str) -> String {
    color = color.trim().to_string();
    if color.is_empty() {
        return fallback.to_string();
    }
    if color.len() > MAX_COLOR_LEN {
        let mut end = MAX_COLOR_LEN;
        while !color.is_char_boundary(end) {
            end -= 1;
        }
        color.truncate(end);
    }
    color
}

pub fn sanitize_width(width: u32) -> u32 {
    width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}

impl StyleState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            color: config.default_color.clone(),
            stroke_width: sanitize_width(config.default_stroke_width),
            font: config.font.clone(),
        }
    }

    /// Loads the last persisted color and width, falling back to defaults.
    pub fn restore(store: &impl Store, config: &Config) -> Self {
        let mut style = Self::from_config(config);
        match store.get(&config.keys.color) {
            Ok(Some(color)) => style.color = sanitize_color(color, &config.default_color),
            Ok(None) => {}
            Err(err) => warn!(%err, "reading stored color failed"),
        }
        match store.get(&config.keys.stroke_width) {
            Ok(Some(width)) => match width.trim().parse::<u32>() {
                Ok(width) => style.stroke_width = sanitize_width(width),
                Err(_) => warn!(value = %width, "ignoring stored stroke width"),
            },
            Ok(None) => {}
            Err(err) => warn!(%err, "reading stored stroke width failed"),
        }
        debug!(color = %style.color, width = style.stroke_width, "style restored");
        style
    }

    /// The in-memory value changes even when persisting it fails.
    pub fn set_color(
        &mut self,
        color: String,
        store: &mut impl Store,
        config: &Config,
    ) -> Result<(), StoreError> {
        self.color = sanitize_color(color, &config.default_color);
        store.set(&config.keys.color, &self.color)
    }

    pub fn set_stroke_width(
        &mut self,
        width: u32,
        store: &mut impl Store,
        config: &Config,
    ) -> Result<(), StoreError> {
        self.stroke_width = sanitize_width(width);
        store.set(&config.keys.stroke_width, &self.stroke_width.to_string())
    }
}
