//! Per-frame simulation step
//!
//! Fixed order: lifecycle intents → entity simulation → collision resolution →
//! camera/score → recycling. The tick returns the events it produced, in order.

use super::state::{GameEvent, GameState, RunPhase};
use super::{camera, collision, lifecycle, physics};
use crate::consts::FRAME_SECS;

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move left held (any source)
    pub left: bool,
    /// Move right held (any source)
    pub right: bool,
    /// Start a run (ignored while one is in progress)
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Net steering direction; both held cancel out
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the game state by one frame. `delta` is frame-relative (1.0 = one
/// 60 fps frame) and is clamped to `[0, tuning.max_delta]`.
pub fn tick(state: &mut GameState, input: &TickInput, delta: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.start {
        lifecycle::start_run(state, &mut events);
    }
    if input.pause {
        lifecycle::toggle_pause(state, &mut events);
    }

    let delta = delta.clamp(0.0, state.tuning.max_delta);
    match state.phase {
        RunPhase::Running => step_running(state, input.direction(), delta, &mut events),
        RunPhase::Falling => step_falling(state, delta, &mut events),
        RunPhase::Idle | RunPhase::Paused | RunPhase::Ended => {}
    }

    events
}

fn advance_clock(state: &mut GameState, delta: f32) -> f32 {
    let secs = delta * FRAME_SECS;
    state.time_secs += secs;
    state.time_ticks += 1;
    secs
}

fn step_running(state: &mut GameState, direction: f32, delta: f32, events: &mut Vec<GameEvent>) {
    let secs = advance_clock(state, delta);

    // Entity simulation
    let previous_y = physics::update_player(&mut state.player, direction, delta, &state.tuning);
    physics::update_platforms(&mut state.registry, delta, secs, &state.tuning);
    physics::update_monsters(&mut state.registry, delta);
    if let Some(kind) = physics::update_power_up(&mut state.player, secs) {
        events.push(GameEvent::PowerUpExpired { kind });
    }

    // Collision & resolution
    if !collision::resolve(state, previous_y, events) {
        return;
    }

    // Camera, score, recycling
    camera::follow(state);
    camera::recycle(state);
}

fn step_falling(state: &mut GameState, delta: f32, events: &mut Vec<GameEvent>) {
    let secs = advance_clock(state, delta);
    physics::update_platforms(&mut state.registry, delta, secs, &state.tuning);
    physics::update_monsters(&mut state.registry, delta);
    if physics::update_falling(&mut state.player, delta, secs, &state.tuning) {
        lifecycle::end_run(state, events);
    }
}
