use std::collections::VecDeque;

use crate::board::TextPrompt;
use crate::geometry::{Point, Size};
use crate::surface::{Surface, SurfaceError};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Line {
        from: Point,
        to: Point,
        color: String,
        width: u32,
    },
    Dot {
        position: Point,
        size: u32,
        color: String,
    },
    Text {
        text: String,
        position: Point,
        color: String,
        font: String,
    },
    Clear {
        position: Point,
        width: f64,
        height: f64,
    },
    Import(String),
    Restore,
    Resize(u32, u32),
    Scale(f64),
}

/// Surface that only records what it was asked to do.
pub struct Recorder {
    pub calls: Vec<Call>,
    pub size: Size,
    pub importing: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            size: Size::new(800.0, 600.0),
            importing: false,
        }
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn lines(&self) -> usize {
        self.count(|call| matches!(call, Call::Line { .. }))
    }

    pub fn dots(&self) -> usize {
        self.count(|call| matches!(call, Call::Dot { .. }))
    }

    pub fn clears(&self) -> usize {
        self.count(|call| matches!(call, Call::Clear { .. }))
    }

    pub fn texts(&self) -> usize {
        self.count(|call| matches!(call, Call::Text { .. }))
    }
}

impl Surface for Recorder {
    type Capture = ();

    fn draw_line(
        &mut self,
        from: Point,
        to: Point,
        color: &str,
        width: u32,
    ) -> Result<(), SurfaceError> {
        self.calls.push(Call::Line {
            from,
            to,
            color: color.to_string(),
            width,
        });
        Ok(())
    }

    fn fill_dot(&mut self, position: Point, size: u32, color: &str) -> Result<(), SurfaceError> {
        self.calls.push(Call::Dot {
            position,
            size,
            color: color.to_string(),
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        position: Point,
        color: &str,
        font: &str,
    ) -> Result<(), SurfaceError> {
        self.calls.push(Call::Text {
            text: text.to_string(),
            position,
            color: color.to_string(),
            font: font.to_string(),
        });
        Ok(())
    }

    fn clear_region(&mut self, position: Point, width: f64, height: f64) {
        self.calls.push(Call::Clear {
            position,
            width,
            height,
        });
    }

    fn export_snapshot(&self) -> Result<String, SurfaceError> {
        Ok("recorded".to_string())
    }

    fn import_snapshot(&mut self, snapshot: &str) -> Result<(), SurfaceError> {
        self.calls.push(Call::Import(snapshot.to_string()));
        Ok(())
    }

    fn is_importing(&self) -> bool {
        self.importing
    }

    fn capture(&self) -> Result<(), SurfaceError> {
        Ok(())
    }

    fn restore(&mut self, _capture: &()) -> Result<(), SurfaceError> {
        self.calls.push(Call::Restore);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Resize(width, height));
    }

    fn set_device_scale(&mut self, factor: f64) {
        self.calls.push(Call::Scale(factor));
    }

    fn logical_size(&self) -> Size {
        self.size
    }
}

/// Answers text prompts from a script and remembers how often it was asked.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Option<String>>,
    pub asked: usize,
}

impl ScriptedPrompt {
    pub fn answering(answers: impl IntoIterator<Item = Option<&'static str>>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|answer| answer.map(str::to_string))
                .collect(),
            asked: 0,
        }
    }
}

impl TextPrompt for ScriptedPrompt {
    fn prompt(&mut self, _message: &str) -> Option<String> {
        self.asked += 1;
        self.answers.pop_front().flatten()
    }
}
