//! Platform abstraction layer
//!
//! Browser-independent pieces of the host loop:
//! - Frame clock (timestamp → frame-relative delta)
//! - Held input from keyboard and touch
//! - Key code bindings

use crate::consts::{FRAME_MS, MAX_DELTA};
use crate::sim::TickInput;

/// Turns animation-frame timestamps into frame-relative deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_DELTA)
    }
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_ms: None,
            max_delta,
        }
    }

    /// Delta since the previous frame, in 60 fps frames. The first frame after
    /// construction or `reset` yields 0.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last) / FRAME_MS).max(0.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta.min(self.max_delta)
    }

    /// Forget the baseline so the next frame starts from zero
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// Which held source a direction comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Held steering state. Keyboard and touch are tracked separately and OR'd.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    key_left: bool,
    key_right: bool,
    touch_left: bool,
    touch_right: bool,
}

impl InputState {
    pub fn set(&mut self, source: InputSource, direction: Direction, held: bool) {
        let slot = match (source, direction) {
            (InputSource::Keyboard, Direction::Left) => &mut self.key_left,
            (InputSource::Keyboard, Direction::Right) => &mut self.key_right,
            (InputSource::Touch, Direction::Left) => &mut self.touch_left,
            (InputSource::Touch, Direction::Right) => &mut self.touch_right,
        };
        *slot = held;
    }

    pub fn left(&self) -> bool {
        self.key_left || self.touch_left
    }

    pub fn right(&self) -> bool {
        self.key_right || self.touch_right
    }

    /// Release everything (pause, focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            left: self.left(),
            right: self.right(),
            ..Default::default()
        }
    }
}

/// What a physical key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Steer(Direction),
    TogglePause,
    ToggleSfx,
    ToggleMusic,
    Start,
}

/// Map a `KeyboardEvent.code` to its action
pub fn key_action(code: &str) -> Option<KeyAction> {
    match code {
        "ArrowLeft" | "KeyA" => Some(KeyAction::Steer(Direction::Left)),
        "ArrowRight" | "KeyD" => Some(KeyAction::Steer(Direction::Right)),
        "KeyP" => Some(KeyAction::TogglePause),
        "KeyM" => Some(KeyAction::ToggleSfx),
        "KeyN" => Some(KeyAction::ToggleMusic),
        "Space" => Some(KeyAction::Start),
        _ => None,
    }
}
