use tracing::trace;

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Maps `MouseEvent.button`.
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(PointerButton::Primary),
            1 => Some(PointerButton::Middle),
            2 => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub button: PointerButton,
    pub position: Point,
    pub erase_modifier: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, button: PointerButton, position: Point) -> Self {
        Self {
            kind,
            button,
            position,
            erase_modifier: false,
        }
    }

    pub fn down(position: Point) -> Self {
        Self::new(PointerKind::Down, PointerButton::Primary, position)
    }

    pub fn moved(position: Point) -> Self {
        Self::new(PointerKind::Move, PointerButton::Primary, position)
    }

    pub fn up(position: Point) -> Self {
        Self::new(PointerKind::Up, PointerButton::Primary, position)
    }

    pub fn with_erase_modifier(mut self, held: bool) -> Self {
        self.erase_modifier = held;
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StrokeState {
    #[default]
    Idle,
    Stroking,
}

/// Stroke state plus the last two pointer samples.
///
/// Samples are tracked on every move, stroking or not, so `previous` is always
/// the sample immediately before `current`.
#[derive(Clone, Debug, Default)]
pub struct PointerMachine {
    state: StrokeState,
    current: Point,
    previous: Point,
}

impl PointerMachine {
    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_stroking(&self) -> bool {
        self.state == StrokeState::Stroking
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn previous(&self) -> Point {
        self.previous
    }

    pub fn begin(&mut self, position: Point) {
        self.previous = position;
        self.current = position;
        self.state = StrokeState::Stroking;
        trace!(?position, "stroke begin");
    }

    /// Records a sample; returns the segment to draw while stroking.
    pub fn track(&mut self, position: Point) -> Option<(Point, Point)> {
        self.previous = self.current;
        self.current = position;
        match self.state {
            StrokeState::Stroking => Some((self.previous, self.current)),
            StrokeState::Idle => None,
        }
    }

    pub fn end(&mut self) {
        if self.state == StrokeState::Stroking {
            trace!(position = ?self.current, "stroke end");
        }
        self.state = StrokeState::Idle;
    }
}
