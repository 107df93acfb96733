#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Control,
    Backspace,
    Delete,
    Other(String),
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Control" => Key::Control,
            "Backspace" => Key::Backspace,
            "Delete" | "Del" => Key::Delete,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn is_erase_modifier(&self) -> bool {
        matches!(self, Key::Control)
    }

    pub fn clears_surface(&self) -> bool {
        matches!(self, Key::Backspace | Key::Delete)
    }
}
