use tracing::{debug, info};

use crate::config::Config;
use crate::eraser::{Cursor, EraserState};
use crate::geometry::{normalize_point, Point, Size};
use crate::keys::Key;
use crate::persistence::{PersistenceCycle, SaveError, Store, StoreError};
use crate::pointer::{PointerButton, PointerEvent, PointerKind, PointerMachine};
use crate::style::StyleState;
use crate::surface::{Surface, SurfaceError};

pub const TEXT_PROMPT: &str = "Text:";

/// Asks the user for a line of text. `None` means cancelled.
pub trait TextPrompt {
    fn prompt(&mut self, message: &str) -> Option<String>;
}

/// All session state. Handlers take the collaborators they need explicitly.
pub struct Board {
    config: Config,
    style: StyleState,
    pointer: PointerMachine,
    eraser: EraserState,
    persistence: PersistenceCycle,
}

impl Board {
    pub fn new(config: Config) -> Self {
        let style = StyleState::from_config(&config);
        Self::with_style(config, style)
    }

    /// A board whose style comes from the last persisted values.
    pub fn load(config: Config, store: &impl Store) -> Self {
        let style = StyleState::restore(store, &config);
        Self::with_style(config, style)
    }

    fn with_style(config: Config, style: StyleState) -> Self {
        Self {
            eraser: EraserState::new(config.erase_size),
            persistence: PersistenceCycle::new(&config),
            pointer: PointerMachine::default(),
            style,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn pointer(&self) -> &PointerMachine {
        &self.pointer
    }

    pub fn eraser(&self) -> &EraserState {
        &self.eraser
    }

    pub fn persistence(&self) -> &PersistenceCycle {
        &self.persistence
    }

    pub fn cursor(&self) -> Cursor {
        self.eraser.cursor()
    }

    pub fn handle_pointer<S: Surface>(
        &mut self,
        surface: &mut S,
        prompt: &mut impl TextPrompt,
        event: PointerEvent,
    ) -> Result<(), SurfaceError> {
        let Some(position) = normalize_point(event.position) else {
            return Ok(());
        };
        match event.kind {
            PointerKind::Down => match event.button {
                PointerButton::Secondary => self.place_text(surface, prompt, position),
                PointerButton::Middle => Ok(()),
                PointerButton::Primary if event.erase_modifier => {
                    self.pointer.track(position);
                    self.eraser.erase_at(surface, position);
                    Ok(())
                }
                PointerButton::Primary => {
                    self.pointer.begin(position);
                    surface.fill_dot(position, self.style.stroke_width, &self.style.color)
                }
            },
            PointerKind::Move => {
                let segment = self.pointer.track(position);
                if event.erase_modifier {
                    self.eraser.erase_at(surface, position);
                    return Ok(());
                }
                match segment {
                    Some((from, to)) => {
                        surface.draw_line(from, to, &self.style.color, self.style.stroke_width)
                    }
                    None => Ok(()),
                }
            }
            PointerKind::Up | PointerKind::Leave => {
                self.pointer.end();
                Ok(())
            }
        }
    }

    fn place_text<S: Surface>(
        &mut self,
        surface: &mut S,
        prompt: &mut impl TextPrompt,
        position: Point,
    ) -> Result<(), SurfaceError> {
        let Some(text) = prompt.prompt(TEXT_PROMPT) else {
            return Ok(());
        };
        if text.trim().is_empty() {
            return Ok(());
        }
        surface.draw_text(&text, position, &self.style.color, &self.style.font)
    }

    /// Returns the new cursor when the eraser toggles on.
    pub fn handle_key_down<S: Surface>(&mut self, surface: &mut S, key: &Key) -> Option<Cursor> {
        if key.clears_surface() {
            debug!(?key, "clearing surface");
            surface.clear();
            return None;
        }
        if key.is_erase_modifier() && !self.eraser.active {
            self.eraser.active = true;
            return Some(self.eraser.cursor());
        }
        None
    }

    /// Returns the default cursor when the eraser toggles off.
    pub fn handle_key_up(&mut self, key: &Key) -> Option<Cursor> {
        if key.is_erase_modifier() && self.eraser.active {
            self.eraser.active = false;
            return Some(self.eraser.cursor());
        }
        None
    }

    pub fn select_color(&mut self, color: String, store: &mut impl Store) -> Result<(), StoreError> {
        self.style.set_color(color, store, &self.config)
    }

    pub fn select_width(&mut self, width: u32, store: &mut impl Store) -> Result<(), StoreError> {
        self.style.set_stroke_width(width, store, &self.config)
    }

    /// Resizes the backing bitmap for `logical` at `device_scale`, keeping
    /// existing content anchored at the origin.
    pub fn resize<S: Surface>(
        &self,
        surface: &mut S,
        logical: Size,
        device_scale: f64,
    ) -> Result<(), SurfaceError> {
        let scale = if device_scale.is_finite() && device_scale > 0.0 {
            device_scale
        } else {
            1.0
        };
        let saved = surface.capture()?;
        let (width, height) = logical.scaled(scale);
        surface.resize(width, height);
        surface.set_device_scale(scale);
        surface.restore(&saved)?;
        info!(width, height, scale, "surface resized");
        Ok(())
    }

    pub fn save<S: Surface>(&self, surface: &S, store: &mut impl Store) -> Result<(), SaveError> {
        self.persistence.tick(surface, store)
    }

    pub fn restore<S: Surface>(&self, surface: &mut S, store: &impl Store) -> bool {
        self.persistence.restore(surface, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::raster::{Raster, TRANSPARENT};
    use crate::testing::{Call, Recorder, ScriptedPrompt};

    fn board() -> Board {
        Board::new(Config::default())
    }

    fn right_click(position: Point) -> PointerEvent {
        PointerEvent::new(PointerKind::Down, PointerButton::Secondary, position)
    }

    #[test]
    fn stroke_issues_one_dot_and_one_line_per_move() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::new(10.0, 10.0)))
            .unwrap();
        for step in 1..=5 {
            let at = Point::new(10.0 + step as f64, 10.0);
            board
                .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(at))
                .unwrap();
        }
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::up(Point::new(15.0, 10.0)))
            .unwrap();

        assert_eq!(surface.dots(), 1);
        assert_eq!(surface.lines(), 5);
        assert_eq!(surface.calls.len(), 6);
        assert_eq!(
            surface.calls[0],
            Call::Dot {
                position: Point::new(10.0, 10.0),
                size: 3,
                color: "Ivory".to_string(),
            }
        );
    }

    #[test]
    fn lines_connect_consecutive_samples() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();
        let samples = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 1.0),
            Point::new(3.0, 1.0),
            Point::new(9.0, 4.0),
        ];

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(samples[0]))
            .unwrap();
        for sample in &samples[1..] {
            board
                .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(*sample))
                .unwrap();
        }

        let segments: Vec<(Point, Point)> = surface
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        let expected: Vec<(Point, Point)> = samples.windows(2).map(|w| (w[0], w[1])).collect();
        assert_eq!(segments, expected);
    }

    #[test]
    fn moves_after_release_draw_nothing() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::up(Point::ORIGIN))
            .unwrap();
        let before = surface.calls.len();
        for x in 1..10 {
            board
                .handle_pointer(
                    &mut surface,
                    &mut prompt,
                    PointerEvent::moved(Point::new(x as f64, 0.0)),
                )
                .unwrap();
        }
        assert_eq!(surface.calls.len(), before);
    }

    #[test]
    fn leaving_the_surface_ends_the_stroke() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::new(PointerKind::Leave, PointerButton::Primary, Point::ORIGIN),
            )
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(4.0, 4.0)))
            .unwrap();
        assert_eq!(surface.lines(), 0);
        assert!(!board.pointer().is_stroking());
    }

    #[test]
    fn resumed_stroke_starts_from_its_own_dot() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::up(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(50.0, 50.0)))
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::new(20.0, 20.0)))
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(21.0, 20.0)))
            .unwrap();

        assert_eq!(
            surface.calls.last(),
            Some(&Call::Line {
                from: Point::new(20.0, 20.0),
                to: Point::new(21.0, 20.0),
                color: "Ivory".to_string(),
                width: 3,
            })
        );
    }

    #[test]
    fn erase_modifier_clears_instead_of_drawing() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        // while idle
        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::moved(Point::new(100.0, 100.0)).with_erase_modifier(true),
            )
            .unwrap();
        // while stroking
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::moved(Point::new(200.0, 100.0)).with_erase_modifier(true),
            )
            .unwrap();

        assert_eq!(surface.clears(), 2);
        assert_eq!(surface.lines(), 0);
        assert_eq!(surface.dots(), 1);
        assert_eq!(
            surface.calls[0],
            Call::Clear {
                position: Point::new(60.0, 60.0),
                width: 80.0,
                height: 80.0,
            }
        );
    }

    #[test]
    fn eraser_removes_pencil_ink_at_the_same_logical_point() {
        let mut board = board();
        let mut raster = Raster::with_device_scale(Size::new(100.0, 100.0), 2.0);
        let mut prompt = ScriptedPrompt::default();
        let point = Point::new(50.0, 50.0);

        board
            .handle_pointer(&mut raster, &mut prompt, PointerEvent::down(point))
            .unwrap();
        board
            .handle_pointer(&mut raster, &mut prompt, PointerEvent::moved(Point::new(60.0, 55.0)))
            .unwrap();
        assert_ne!(raster.pixel(100, 100), Some(TRANSPARENT));
        assert_ne!(raster.pixel(120, 110), Some(TRANSPARENT));

        board
            .handle_pointer(
                &mut raster,
                &mut prompt,
                PointerEvent::moved(point).with_erase_modifier(true),
            )
            .unwrap();

        assert_eq!(raster.pixel(100, 100), Some(TRANSPARENT));
        assert_eq!(raster.pixel(120, 110), Some(TRANSPARENT));
        assert!(raster.is_blank());
    }

    #[test]
    fn releasing_modifier_mid_stroke_links_adjacent_samples() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::moved(Point::new(30.0, 0.0)).with_erase_modifier(true),
            )
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(31.0, 0.0)))
            .unwrap();

        assert!(matches!(
            surface.calls.last(),
            Some(Call::Line { from, .. }) if *from == Point::new(30.0, 0.0)
        ));
    }

    #[test]
    fn erase_modifier_on_press_does_not_start_a_stroke() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::down(Point::new(40.0, 40.0)).with_erase_modifier(true),
            )
            .unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(41.0, 40.0)))
            .unwrap();

        assert_eq!(surface.clears(), 1);
        assert_eq!(surface.dots(), 0);
        assert_eq!(surface.lines(), 0);
    }

    #[test]
    fn blank_text_is_discarded() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::answering([Some(""), Some("   "), None]);

        for _ in 0..3 {
            board
                .handle_pointer(&mut surface, &mut prompt, right_click(Point::new(5.0, 5.0)))
                .unwrap();
        }
        assert_eq!(prompt.asked, 3);
        assert_eq!(surface.texts(), 0);
    }

    #[test]
    fn text_is_drawn_at_click_with_style() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut store = MemoryStore::new();
        let mut prompt = ScriptedPrompt::answering([Some("Hi")]);

        board.select_color("#ff8800".to_string(), &mut store).unwrap();
        board
            .handle_pointer(&mut surface, &mut prompt, right_click(Point::new(12.0, 34.0)))
            .unwrap();

        assert_eq!(
            surface.calls,
            vec![Call::Text {
                text: "Hi".to_string(),
                position: Point::new(12.0, 34.0),
                color: "#ff8800".to_string(),
                font: "30px Arial".to_string(),
            }]
        );
    }

    #[test]
    fn right_click_leaves_stroke_state_alone() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::answering([None]);

        board
            .handle_pointer(&mut surface, &mut prompt, right_click(Point::ORIGIN))
            .unwrap();
        assert!(!board.pointer().is_stroking());
        assert_eq!(surface.dots(), 0);
    }

    #[test]
    fn color_change_applies_to_later_draws_and_persists() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut store = MemoryStore::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        board.select_color("Tomato".to_string(), &mut store).unwrap();
        assert_eq!(store.get("drawarea.color").unwrap().as_deref(), Some("Tomato"));

        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::moved(Point::new(1.0, 1.0)))
            .unwrap();
        assert!(matches!(
            surface.calls.last(),
            Some(Call::Line { color, .. }) if color == "Tomato"
        ));
    }

    #[test]
    fn width_change_persists_and_applies() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut store = MemoryStore::new();
        let mut prompt = ScriptedPrompt::default();

        board.select_width(12, &mut store).unwrap();
        assert_eq!(store.get("drawarea.lineWidth").unwrap().as_deref(), Some("12"));
        board
            .handle_pointer(&mut surface, &mut prompt, PointerEvent::down(Point::ORIGIN))
            .unwrap();
        assert!(matches!(surface.calls[0], Call::Dot { size: 12, .. }));
    }

    #[test]
    fn load_restores_persisted_style() {
        let mut store = MemoryStore::new();
        store.set("drawarea.color", "#123456").unwrap();
        store.set("drawarea.lineWidth", "7").unwrap();
        let board = Board::load(Config::default(), &store);
        assert_eq!(board.style().color, "#123456");
        assert_eq!(board.style().stroke_width, 7);
    }

    #[test]
    fn control_toggles_eraser_cursor_once() {
        let mut board = board();
        let mut surface = Recorder::new();

        let cursor = board.handle_key_down(&mut surface, &Key::Control);
        assert!(matches!(cursor, Some(Cursor::Eraser(_))));
        assert!(board.eraser().active);
        // key repeat
        assert_eq!(board.handle_key_down(&mut surface, &Key::Control), None);

        assert_eq!(board.handle_key_up(&Key::from_dom("Shift")), None);
        assert_eq!(board.handle_key_up(&Key::Control), Some(Cursor::Default));
        assert!(!board.eraser().active);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn delete_clears_whole_surface() {
        let mut board = board();
        let mut surface = Recorder::new();

        board.handle_key_down(&mut surface, &Key::Delete);
        board.handle_key_down(&mut surface, &Key::Backspace);
        assert_eq!(
            surface.calls,
            vec![
                Call::Clear {
                    position: Point::ORIGIN,
                    width: 800.0,
                    height: 600.0,
                };
                2
            ]
        );
    }

    #[test]
    fn non_finite_positions_are_ignored() {
        let mut board = board();
        let mut surface = Recorder::new();
        let mut prompt = ScriptedPrompt::default();
        board
            .handle_pointer(
                &mut surface,
                &mut prompt,
                PointerEvent::down(Point::new(f64::NAN, 0.0)),
            )
            .unwrap();
        assert!(surface.calls.is_empty());
        assert!(!board.pointer().is_stroking());
    }

    #[test]
    fn resize_runs_capture_resize_scale_restore() {
        let board = board();
        let mut surface = Recorder::new();
        board
            .resize(&mut surface, Size::new(400.0, 300.0), 2.0)
            .unwrap();
        assert_eq!(
            surface.calls,
            vec![Call::Resize(800, 600), Call::Scale(2.0), Call::Restore]
        );
    }

    #[test]
    fn resize_to_larger_keeps_pixels() {
        let board = board();
        let mut raster = Raster::with_device_scale(Size::new(20.0, 10.0), 2.0);
        raster.fill_dot(Point::new(2.0, 2.0), 3, "white").unwrap();
        raster
            .draw_line(Point::new(0.0, 9.0), Point::new(19.0, 0.0), "red", 1)
            .unwrap();
        let before = raster.bitmap().clone();

        board
            .resize(&mut raster, Size::new(30.0, 25.0), 2.0)
            .unwrap();

        let after = raster.bitmap();
        assert_eq!((after.width, after.height), (60, 50));
        assert_eq!(raster.device_scale(), 2.0);
        for y in 0..before.height {
            for x in 0..before.width {
                let offset = ((y * before.width + x) * 4) as usize;
                assert_eq!(
                    raster.pixel(x, y).unwrap(),
                    before.pixels[offset..offset + 4],
                    "pixel {x},{y}"
                );
            }
        }
        assert_eq!(raster.pixel(59, 49), Some([0, 0, 0, 0]));
    }

    #[test]
    fn bad_device_scale_falls_back_to_one() {
        let board = board();
        let mut surface = Recorder::new();
        board.resize(&mut surface, Size::new(10.0, 10.0), 0.0).unwrap();
        assert_eq!(surface.calls[1], Call::Scale(1.0));
    }

    #[test]
    fn save_and_restore_round_trip_through_store() {
        let mut board = board();
        let mut raster = Raster::new(24, 24);
        let mut store = MemoryStore::new();
        let mut prompt = ScriptedPrompt::default();

        board
            .handle_pointer(&mut raster, &mut prompt, PointerEvent::down(Point::new(4.0, 4.0)))
            .unwrap();
        board
            .handle_pointer(&mut raster, &mut prompt, PointerEvent::moved(Point::new(18.0, 12.0)))
            .unwrap();
        board.save(&raster, &mut store).unwrap();

        let mut reopened = Raster::new(24, 24);
        assert!(board.restore(&mut reopened, &store));
        assert_eq!(reopened.bitmap(), raster.bitmap());
    }
}
