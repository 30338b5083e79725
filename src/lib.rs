//! Doodle Hop - an endless vertical platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, camera, run lifecycle)
//! - `tuning`: Data-driven game balance
//! - `platform`: Frame clock and held-input state shared by every host
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `audio`: Sound-trigger routing and the Web Audio backend
//! - `game`: Host-side controller driving the simulation once per frame

pub mod audio;
pub mod best_score;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use best_score::BestScore;
pub use game::{Game, Intent};
pub use settings::Settings;
pub use tuning::Tuning;

/// Default balance values. `Tuning::default()` is built from these.
pub mod consts {
    /// Nominal frame length the simulation is normalised to (60 fps)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Seconds covered by one unit of frame delta
    pub const FRAME_SECS: f32 = 1.0 / 60.0;
    /// Largest frame delta accepted after a stall
    pub const MAX_DELTA: f32 = 1.6;

    /// Visible world size in pixels
    pub const WORLD_WIDTH: f32 = 420.0;
    pub const WORLD_HEIGHT: f32 = 640.0;

    /// Player
    pub const PLAYER_WIDTH: f32 = 42.0;
    pub const PLAYER_HEIGHT: f32 = 54.0;
    pub const PLAYER_START_OFFSET: f32 = 140.0; // distance of the player top above the bottom edge
    pub const PLAYER_START_VELOCITY: f32 = -8.0;
    pub const GRAVITY: f32 = 0.35;
    pub const JUMP_VELOCITY: f32 = -11.2;
    pub const MOVE_ACCEL: f32 = 0.55;
    pub const MOVE_FRICTION: f32 = 0.92;
    pub const MAX_HORIZONTAL_SPEED: f32 = 6.0;
    /// Position advances by velocity * delta * MOTION_SCALE
    pub const MOTION_SCALE: f32 = 1.6;
    pub const FACING_THRESHOLD: f32 = 0.15;

    /// Platforms
    pub const PLATFORM_WIDTH: f32 = 68.0;
    pub const PLATFORM_HEIGHT: f32 = 14.0;
    pub const PLATFORM_MIN_GAP: f32 = 55.0;
    pub const PLATFORM_MAX_GAP: f32 = 95.0;
    pub const MOVING_PLATFORM_PROB: f32 = 0.18;
    pub const DEAD_PLATFORM_PROB: f32 = 0.22;
    pub const BREAKABLE_PLATFORM_PROB: f32 = 0.12;
    pub const MOVING_SPEED_MIN: f32 = 1.0;
    pub const MOVING_SPEED_MAX: f32 = 1.6;
    pub const PLATFORM_MOTION_SCALE: f32 = 1.2;
    pub const MAX_CONSECUTIVE_DEAD: u32 = 1;
    pub const MIN_PLATFORMS: usize = 12;
    /// Fraction of the analytic jump height a generated gap may use
    pub const REACH_MARGIN: f32 = 0.9;
    /// Seconds between landing on a breakable platform and its removal
    pub const BREAK_DELAY: f32 = 0.35;
    pub const GROUND_OFFSET: f32 = 20.0;

    /// Camera
    pub const ASCENT_THRESHOLD: f32 = 0.35; // fraction of world height

    /// Power-ups
    pub const POWER_UP_PROB: f32 = 0.06;
    pub const ROCKET_SHARE: f32 = 0.35;
    pub const PICKUP_SIZE: f32 = 26.0;
    pub const PICKUP_HOVER: f32 = 6.0;
    pub const PICKUP_PULSE_HZ: f32 = 1.5;

    /// Monsters
    pub const MONSTER_WIDTH: f32 = 36.0;
    pub const MONSTER_HEIGHT: f32 = 30.0;
    pub const MONSTER_BASE_PROB: f32 = 0.03;
    pub const MONSTER_PROB_PER_POINT: f32 = 0.00002;
    pub const MONSTER_MAX_PROB: f32 = 0.2;
    pub const MONSTER_BOTTOM_MARGIN: f32 = 120.0;
    pub const MONSTER_INITIAL_CEILING: f32 = 0.55; // fraction of world height
    pub const MONSTER_HOST_PADDING: f32 = 6.0;
    pub const SPRINTER_SHARE: f32 = 0.3;
    pub const WALKER_SPEED: (f32, f32) = (0.5, 1.0);
    pub const SPRINTER_SPEED: (f32, f32) = (1.4, 2.2);
    pub const STOMP_BONUS: f64 = 50.0;
    pub const STOMP_BOUNCE: f32 = 0.75;
    pub const STOMP_TOLERANCE: f32 = 8.0;

    /// Falling death animation
    pub const FALL_DURATION: f32 = 0.9;
    pub const FALL_SPIN: f32 = 7.0; // radians per second

    /// Number of landing sound variants rotated through
    pub const LANDING_VARIANTS: u8 = 6;
}

/// Wrap a horizontal position so an object leaving one edge re-enters at the other.
///
/// Leaving past the left edge (fully off-screen) lands at `world_width`; leaving
/// past the right edge lands at `-width`.
#[inline]
pub fn wrap_horizontal(x: f32, width: f32, world_width: f32) -> f32 {
    if x + width < 0.0 {
        world_width
    } else if x > world_width {
        -width
    } else {
        x
    }
}
