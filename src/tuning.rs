//! Data-driven game balance
//!
//! Every physics, generation and timing constant the simulation reads lives in
//! [`Tuning`]. Defaults come from [`crate::consts`]; a partial JSON document can
//! override any subset of fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::state::PowerUpKind;

/// Errors produced while loading a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Physics modifiers applied while a power-up is active
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpProfile {
    /// Seconds the effect lasts once collected
    pub duration: f32,
    pub gravity_multiplier: f32,
    pub jump_multiplier: f32,
    pub horizontal_multiplier: f32,
    /// Upper bound on rising speed (vy is kept >= -lift_cap)
    pub lift_cap: Option<f32>,
    /// Upper bound on falling speed (vy is kept <= fall_cap)
    pub fall_cap: Option<f32>,
}

impl PowerUpProfile {
    pub const ROCKET: Self = Self {
        duration: 2.2,
        gravity_multiplier: -1.4,
        jump_multiplier: 1.0,
        horizontal_multiplier: 1.2,
        lift_cap: Some(13.0),
        fall_cap: None,
    };

    pub const GLIDER: Self = Self {
        duration: 4.0,
        gravity_multiplier: 0.45,
        jump_multiplier: 1.1,
        horizontal_multiplier: 1.35,
        lift_cap: None,
        fall_cap: Some(2.2),
    };

    /// No active effect
    pub const IDENTITY: Self = Self {
        duration: 0.0,
        gravity_multiplier: 1.0,
        jump_multiplier: 1.0,
        horizontal_multiplier: 1.0,
        lift_cap: None,
        fall_cap: None,
    };
}

/// Complete balance sheet for one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    pub max_delta: f32,

    // === Player ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_start_offset: f32,
    pub player_start_velocity: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub move_accel: f32,
    pub move_friction: f32,
    pub max_horizontal_speed: f32,
    pub motion_scale: f32,
    pub facing_threshold: f32,

    // === Platforms ===
    pub platform_width: f32,
    pub platform_height: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    pub moving_prob: f32,
    pub dead_prob: f32,
    pub breakable_prob: f32,
    pub moving_speed_min: f32,
    pub moving_speed_max: f32,
    pub platform_motion_scale: f32,
    pub max_consecutive_dead: u32,
    pub min_platforms: usize,
    pub reach_margin: f32,
    pub break_delay: f32,
    pub ground_offset: f32,
    pub cull_buffer: f32,

    // === Camera ===
    pub ascent_threshold: f32,

    // === Power-ups ===
    pub power_up_prob: f32,
    pub rocket_share: f32,
    pub pickup_size: f32,
    pub pickup_hover: f32,
    pub pickup_pulse_hz: f32,
    pub rocket: PowerUpProfile,
    pub glider: PowerUpProfile,

    // === Monsters ===
    pub monster_width: f32,
    pub monster_height: f32,
    pub monster_base_prob: f32,
    pub monster_prob_per_point: f32,
    pub monster_max_prob: f32,
    pub monster_bottom_margin: f32,
    pub monster_initial_ceiling: f32,
    pub monster_host_padding: f32,
    pub sprinter_share: f32,
    pub walker_speed: (f32, f32),
    pub sprinter_speed: (f32, f32),
    pub stomp_bonus: f64,
    pub stomp_bounce: f32,
    pub stomp_tolerance: f32,

    // === Death ===
    pub fall_duration: f32,
    pub fall_spin: f32,

    // === Audio ===
    pub landing_variants: u8,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            max_delta: MAX_DELTA,

            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_start_offset: PLAYER_START_OFFSET,
            player_start_velocity: PLAYER_START_VELOCITY,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            move_accel: MOVE_ACCEL,
            move_friction: MOVE_FRICTION,
            max_horizontal_speed: MAX_HORIZONTAL_SPEED,
            motion_scale: MOTION_SCALE,
            facing_threshold: FACING_THRESHOLD,

            platform_width: PLATFORM_WIDTH,
            platform_height: PLATFORM_HEIGHT,
            min_gap: PLATFORM_MIN_GAP,
            max_gap: PLATFORM_MAX_GAP,
            moving_prob: MOVING_PLATFORM_PROB,
            dead_prob: DEAD_PLATFORM_PROB,
            breakable_prob: BREAKABLE_PLATFORM_PROB,
            moving_speed_min: MOVING_SPEED_MIN,
            moving_speed_max: MOVING_SPEED_MAX,
            platform_motion_scale: PLATFORM_MOTION_SCALE,
            max_consecutive_dead: MAX_CONSECUTIVE_DEAD,
            min_platforms: MIN_PLATFORMS,
            reach_margin: REACH_MARGIN,
            break_delay: BREAK_DELAY,
            ground_offset: GROUND_OFFSET,
            cull_buffer: PLATFORM_HEIGHT * 2.0,

            ascent_threshold: ASCENT_THRESHOLD,

            power_up_prob: POWER_UP_PROB,
            rocket_share: ROCKET_SHARE,
            pickup_size: PICKUP_SIZE,
            pickup_hover: PICKUP_HOVER,
            pickup_pulse_hz: PICKUP_PULSE_HZ,
            rocket: PowerUpProfile::ROCKET,
            glider: PowerUpProfile::GLIDER,

            monster_width: MONSTER_WIDTH,
            monster_height: MONSTER_HEIGHT,
            monster_base_prob: MONSTER_BASE_PROB,
            monster_prob_per_point: MONSTER_PROB_PER_POINT,
            monster_max_prob: MONSTER_MAX_PROB,
            monster_bottom_margin: MONSTER_BOTTOM_MARGIN,
            monster_initial_ceiling: MONSTER_INITIAL_CEILING,
            monster_host_padding: MONSTER_HOST_PADDING,
            sprinter_share: SPRINTER_SHARE,
            walker_speed: WALKER_SPEED,
            sprinter_speed: SPRINTER_SPEED,
            stomp_bonus: STOMP_BONUS,
            stomp_bounce: STOMP_BOUNCE,
            stomp_tolerance: STOMP_TOLERANCE,

            fall_duration: FALL_DURATION,
            fall_spin: FALL_SPIN,

            landing_variants: LANDING_VARIANTS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall generation or break the physics
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.min_gap <= 0.0 {
            return Err(invalid("min_gap", "must be positive"));
        }
        if self.max_gap < self.min_gap {
            return Err(invalid("max_gap", "must be at least min_gap"));
        }
        if self.world_width < self.platform_width {
            return Err(invalid("world_width", "must fit a platform"));
        }
        if self.world_height <= 0.0 {
            return Err(invalid("world_height", "must be positive"));
        }
        if self.gravity <= 0.0 || self.jump_velocity >= 0.0 {
            return Err(invalid(
                "gravity",
                "gravity must be positive and jump velocity negative",
            ));
        }
        if self.max_delta <= 0.0 || self.break_delay < 0.0 || self.fall_duration < 0.0 {
            return Err(invalid("max_delta", "timing values must be non-negative"));
        }
        for (field, size) in [
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("platform_width", self.platform_width),
            ("platform_height", self.platform_height),
            ("monster_width", self.monster_width),
            ("monster_height", self.monster_height),
            ("pickup_size", self.pickup_size),
        ] {
            if !(size > 0.0) {
                return Err(invalid(field, format!("size {size} must be positive")));
            }
        }
        for (field, duration) in [
            ("rocket.duration", self.rocket.duration),
            ("glider.duration", self.glider.duration),
        ] {
            if !(duration > 0.0) {
                return Err(invalid(field, format!("duration {duration} must be positive")));
            }
        }
        for (field, (lo, hi)) in [
            ("moving_speed_max", (self.moving_speed_min, self.moving_speed_max)),
            ("walker_speed", self.walker_speed),
            ("sprinter_speed", self.sprinter_speed),
        ] {
            if !(lo >= 0.0 && lo <= hi) {
                return Err(invalid(field, format!("range {lo}..={hi} is empty or negative")));
            }
        }
        if self.max_reach() < self.max_gap {
            return Err(invalid(
                "jump_velocity",
                format!(
                    "reachable height {:.1} is below max_gap {}",
                    self.max_reach(),
                    self.max_gap
                ),
            ));
        }
        if self.landing_variants == 0 {
            return Err(invalid("landing_variants", "need at least one variant"));
        }
        for (field, p) in [
            ("moving_prob", self.moving_prob),
            ("dead_prob", self.dead_prob),
            ("breakable_prob", self.breakable_prob),
            ("power_up_prob", self.power_up_prob),
            ("rocket_share", self.rocket_share),
            ("monster_base_prob", self.monster_base_prob),
            ("monster_max_prob", self.monster_max_prob),
            ("sprinter_share", self.sprinter_share),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(field, format!("probability {p} outside [0, 1]")));
            }
        }
        if self.dead_prob + self.breakable_prob > 1.0 {
            return Err(invalid("breakable_prob", "dead + breakable exceeds 1"));
        }
        Ok(())
    }

    /// Physics profile for a power-up kind
    pub fn profile(&self, kind: PowerUpKind) -> PowerUpProfile {
        match kind {
            PowerUpKind::Rocket => self.rocket,
            PowerUpKind::Glider => self.glider,
        }
    }

    /// Peak height of an unassisted jump, in pixels.
    ///
    /// Velocity decays by `gravity` per frame while position advances by
    /// `vy * motion_scale`, so the climb is the discrete sum of the decaying
    /// velocity series.
    pub fn max_jump_height(&self) -> f32 {
        let v0 = -self.jump_velocity;
        let frames = (v0 / self.gravity).floor();
        let climbed = frames * v0 - self.gravity * frames * (frames + 1.0) / 2.0;
        climbed.max(0.0) * self.motion_scale
    }

    /// Largest vertical distance a generated platform may sit above the last landable one
    pub fn max_reach(&self) -> f32 {
        self.max_jump_height() * self.reach_margin
    }

    /// Screen y above which the world scrolls instead of the player
    pub fn ascent_line(&self) -> f32 {
        self.world_height * self.ascent_threshold
    }

    /// Platforms whose top is at or below this y are recycled
    pub fn cull_line(&self) -> f32 {
        self.world_height + self.cull_buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{ "dead_prob": 0.5, "min_platforms": 20 }"#).unwrap();
        assert_eq!(tuning.dead_prob, 0.5);
        assert_eq!(tuning.min_platforms, 20);
        assert_eq!(tuning.gravity, GRAVITY);
    }

    #[test]
    fn test_rejects_inverted_gap() {
        let err = Tuning::from_json(r#"{ "min_gap": 100.0, "max_gap": 50.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "max_gap", .. }));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "moving_prob": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "moving_prob", .. }));
    }

    fn rejected_field(json: &str) -> &'static str {
        match Tuning::from_json(json) {
            Err(TuningError::Invalid { field, .. }) => field,
            other => panic!("expected rejection for {json}, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_inverted_speed_ranges() {
        assert_eq!(
            rejected_field(r#"{ "moving_prob": 1.0, "moving_speed_min": 2.0, "moving_speed_max": 1.0 }"#),
            "moving_speed_max"
        );
        assert_eq!(rejected_field(r#"{ "walker_speed": [1.0, 0.5] }"#), "walker_speed");
        assert_eq!(rejected_field(r#"{ "sprinter_speed": [3.0, 2.0] }"#), "sprinter_speed");
    }

    #[test]
    fn test_rejects_non_positive_sizes() {
        assert_eq!(rejected_field(r#"{ "player_width": 0.0 }"#), "player_width");
        assert_eq!(rejected_field(r#"{ "player_height": -1.0 }"#), "player_height");
        assert_eq!(rejected_field(r#"{ "platform_height": 0.0 }"#), "platform_height");
        assert_eq!(rejected_field(r#"{ "monster_width": 0.0 }"#), "monster_width");
        assert_eq!(rejected_field(r#"{ "monster_height": -3.0 }"#), "monster_height");
        assert_eq!(rejected_field(r#"{ "pickup_size": 0.0 }"#), "pickup_size");
    }

    #[test]
    fn test_rejects_non_positive_power_up_durations() {
        let mut tuning = Tuning::default();
        tuning.rocket.duration = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid { field: "rocket.duration", .. })
        ));

        let mut tuning = Tuning::default();
        tuning.glider.duration = -1.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::Invalid { field: "glider.duration", .. })
        ));
    }

    #[test]
    fn test_rejects_jump_too_weak_for_gaps() {
        assert_eq!(rejected_field(r#"{ "jump_velocity": -0.3 }"#), "jump_velocity");
        // A weaker jump is fine as long as the widest gap stays reachable
        let tuning = Tuning::from_json(r#"{ "jump_velocity": -8.0, "max_gap": 80.0 }"#).unwrap();
        assert!(tuning.max_reach() >= tuning.max_gap);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ nope"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_jump_height_covers_max_gap() {
        let tuning = Tuning::default();
        // 32 frames of climb: (32 * 11.2 - 0.35 * 528) * 1.6
        assert!((tuning.max_jump_height() - 277.76).abs() < 0.1);
        assert!(tuning.max_reach() > tuning.max_gap * 2.0);
    }
}
