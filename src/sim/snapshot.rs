//! Immutable per-frame view of the simulation for the presentation layer

use serde::{Deserialize, Serialize};

use super::state::{GameState, MonsterKind, PlatformKind, PowerUpKind, RunPhase};

/// Player pose, including the death-fall rotation and fade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub facing: f32,
    pub rotation: f32,
    /// 1 = fully visible, 0 = faded out
    pub opacity: f32,
    pub power_up: Option<PowerUpKind>,
    /// Remaining fraction of the active power-up, 0 when none
    pub power_up_left: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PlatformKind,
    pub break_progress: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: MonsterKind,
    /// +1 walking right, -1 walking left
    pub facing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub kind: PowerUpKind,
    /// Pulse phase in radians
    pub pulse: f32,
}

impl PickupView {
    /// Relative draw radius, breathing 8% around the nominal size
    pub fn pulse_scale(&self) -> f32 {
        1.0 + 0.08 * self.pulse.sin()
    }
}

/// Everything needed to draw one frame and the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub world_width: f32,
    pub world_height: f32,
    pub player: PlayerView,
    pub platforms: Vec<PlatformView>,
    pub monsters: Vec<MonsterView>,
    pub pickups: Vec<PickupView>,
    /// Total world scroll this run
    pub camera_offset: f64,
    pub score: u64,
    pub best: u64,
    pub final_score: Option<u64>,
    pub phase: RunPhase,
    pub running: bool,
    pub paused: bool,
    pub falling: bool,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let tuning = &state.tuning;
        let player = &state.player;
        let fall = player.fall.unwrap_or_default();
        let (power_up, power_up_left) = match player.power_up {
            Some(active) => {
                let duration = tuning.profile(active.kind).duration;
                let left = if duration > 0.0 {
                    (active.remaining / duration).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (Some(active.kind), left)
            }
            None => (None, 0.0),
        };

        let platforms = state
            .registry
            .platforms()
            .map(|p| PlatformView {
                x: p.rect.left(),
                y: p.rect.top(),
                width: p.rect.size.x,
                height: p.rect.size.y,
                kind: p.kind,
                break_progress: p.break_progress(tuning.break_delay),
            })
            .collect();

        let monsters = state
            .registry
            .monsters()
            .map(|m| MonsterView {
                x: m.rect.left(),
                y: m.rect.top(),
                width: m.rect.size.x,
                height: m.rect.size.y,
                kind: m.kind,
                facing: if m.vx < 0.0 { -1.0 } else { 1.0 },
            })
            .collect();

        let pickups = state
            .registry
            .platforms()
            .filter_map(|p| {
                let pickup = p.power_up.as_ref()?;
                let rect = pickup.rect(&p.rect, tuning.pickup_hover);
                Some(PickupView {
                    x: rect.left(),
                    y: rect.top(),
                    size: pickup.size,
                    kind: pickup.kind,
                    pulse: pickup.pulse,
                })
            })
            .collect();

        Self {
            world_width: tuning.world_width,
            world_height: tuning.world_height,
            player: PlayerView {
                x: player.rect.left(),
                y: player.rect.top(),
                width: player.rect.size.x,
                height: player.rect.size.y,
                facing: player.facing,
                rotation: fall.rotation,
                opacity: 1.0 - fall.progress,
                power_up,
                power_up_left,
            },
            platforms,
            monsters,
            pickups,
            camera_offset: state.scrolled,
            score: state.display_score(),
            best: state.best,
            final_score: state.final_score,
            phase: state.phase,
            running: state.phase.is_running(),
            paused: state.phase == RunPhase::Paused,
            falling: state.phase == RunPhase::Falling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_pickup_pulse_scale_follows_phase() {
        let view = |pulse| PickupView {
            x: 0.0,
            y: 0.0,
            size: 20.0,
            kind: PowerUpKind::Rocket,
            pulse,
        };
        // The phase is already in radians: a quarter turn is the peak
        assert!((view(FRAC_PI_2).pulse_scale() - 1.08).abs() < 1e-5);
        assert!((view(3.0 * FRAC_PI_2).pulse_scale() - 0.92).abs() < 1e-5);
        assert!((view(0.0).pulse_scale() - 1.0).abs() < 1e-6);
        assert!((view(PI).pulse_scale() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_capture_idle() {
        let state = GameState::new(4, 321);
        let snap = RenderSnapshot::capture(&state);
        assert_eq!(snap.phase, RunPhase::Idle);
        assert!(!snap.running);
        assert_eq!(snap.best, 321);
        assert_eq!(snap.platforms.len(), state.registry.len());
        assert_eq!(snap.monsters.len(), state.registry.monster_count());
        assert_eq!(snap.player.opacity, 1.0);
    }

    #[test]
    fn test_capture_flags_and_floor() {
        let mut state = GameState::new(4, 0);
        let mut events = Vec::new();
        lifecycle::start_run(&mut state, &mut events);
        state.score = 12.9;
        lifecycle::set_paused(&mut state, true, &mut events);
        let snap = RenderSnapshot::capture(&state);
        assert!(snap.running && snap.paused && !snap.falling);
        assert_eq!(snap.score, 12);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(4, 0);
        let json = serde_json::to_string(&RenderSnapshot::capture(&state)).unwrap();
        assert!(json.contains("\"platforms\""));
    }
}
