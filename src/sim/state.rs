//! Game state and core simulation types
//!
//! One [`GameState`] is a complete, self-contained simulation. Nothing here is
//! global, so any number of runs can exist side by side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::registry::Registry;
use super::spawn::SpawnPolicy;
use crate::tuning::Tuning;

/// Stable platform handle (never reused within a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Stable monster handle (never reused within a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Before the first start
    Idle,
    /// Active gameplay
    Running,
    /// Simulation frozen by the player
    Paused,
    /// Death animation after falling out of the world; input is ignored
    Falling,
    /// Run over, score frozen
    Ended,
}

impl RunPhase {
    /// True while a run is in progress (including paused and the death fall)
    pub fn is_running(self) -> bool {
        matches!(self, RunPhase::Running | RunPhase::Paused | RunPhase::Falling)
    }

    /// A new run may only be started when none is in progress
    pub fn can_start(self) -> bool {
        matches!(self, RunPhase::Idle | RunPhase::Ended)
    }
}

/// Behavioral category of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Static,
    /// Slides horizontally, bouncing off the screen edges
    Moving,
    /// Cannot be landed on
    Dead,
    /// Holds one landing, then crumbles
    Breakable,
}

/// Breakable platform sub-state. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BreakState {
    #[default]
    Intact,
    /// Landed on; `timer` seconds have passed since
    Breaking { timer: f32 },
    /// Timer elapsed, removed at the end of the platform update
    PendingRemoval,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Strong upward thrust for a short time
    Rocket,
    /// Slow, floaty descent with better air control
    Glider,
}

/// A collectible power-up resting on a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PowerUpKind,
    /// Horizontal offset from the host platform's left edge
    pub offset_x: f32,
    pub size: f32,
    /// Visual pulse phase in radians
    pub pulse: f32,
}

impl Pickup {
    /// World rect, hovering just above the host platform
    pub fn rect(&self, host: &Rect, hover: f32) -> Rect {
        Rect::new(
            host.left() + self.offset_x,
            host.top() - self.size - hover,
            self.size,
            self.size,
        )
    }
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub rect: Rect,
    pub kind: PlatformKind,
    /// Horizontal velocity (moving platforms only)
    pub vx: f32,
    pub power_up: Option<Pickup>,
    pub break_state: BreakState,
}

impl Platform {
    pub fn new(kind: PlatformKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            id: PlatformId(0),
            rect: Rect::new(x, y, width, height),
            kind,
            vx: 0.0,
            power_up: None,
            break_state: BreakState::Intact,
        }
    }

    /// Whether the player can currently land on this platform
    pub fn is_landable(&self) -> bool {
        self.kind != PlatformKind::Dead && self.break_state == BreakState::Intact
    }

    /// Whether a monster may stay on this platform
    pub fn can_host_monster(&self) -> bool {
        self.kind == PlatformKind::Static && self.break_state == BreakState::Intact
    }

    /// Break animation progress in [0, 1]
    pub fn break_progress(&self, break_delay: f32) -> f32 {
        match self.break_state {
            BreakState::Intact => 0.0,
            BreakState::Breaking { timer } if break_delay > 0.0 => {
                (timer / break_delay).clamp(0.0, 1.0)
            }
            BreakState::Breaking { .. } | BreakState::PendingRemoval => 1.0,
        }
    }
}

/// Monster types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Walker,
    Sprinter,
}

/// A hazard patrolling the top of its host platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: MonsterKind,
    /// Non-owning reference to the platform it stands on
    pub host: PlatformId,
    /// Horizontal offset from the host platform's left edge
    pub offset_x: f32,
    pub vx: f32,
    /// World rect, re-pinned to the host every tick
    pub rect: Rect,
}

impl Monster {
    /// Re-derive the world rect from the host platform
    pub fn pin_to(&mut self, host: &Rect) {
        self.rect.pos = Vec2::new(host.left() + self.offset_x, host.top() - self.rect.size.y);
    }
}

/// A power-up currently affecting the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    /// Seconds left
    pub remaining: f32,
    /// Seconds since collection
    pub elapsed: f32,
}

/// Death animation sub-state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FallAnimation {
    /// Seconds since the fall began
    pub timer: f32,
    /// 0 at the start, 1 when the run ends
    pub progress: f32,
    /// Sprite rotation in radians
    pub rotation: f32,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub vel: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub fall: Option<FallAnimation>,
    pub power_up: Option<ActivePowerUp>,
}

impl Player {
    /// Fresh player at the run start position
    pub fn spawn(tuning: &Tuning) -> Self {
        Self {
            rect: Rect::new(
                tuning.world_width / 2.0 - tuning.player_width / 2.0,
                tuning.world_height - tuning.player_start_offset,
                tuning.player_width,
                tuning.player_height,
            ),
            vel: Vec2::new(0.0, tuning.player_start_velocity),
            facing: 1.0,
            fall: None,
            power_up: None,
        }
    }

    /// Start (or restart) a power-up effect, replacing any active one
    pub fn activate_power_up(&mut self, kind: PowerUpKind, tuning: &Tuning) {
        self.power_up = Some(ActivePowerUp {
            kind,
            remaining: tuning.profile(kind).duration,
            elapsed: 0.0,
        });
    }
}

/// Outbound events emitted by a tick, in the order they happened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    /// Player dropped out of the world; death animation running
    FallStarted,
    RunEnded {
        final_score: u64,
        best: u64,
        new_best: bool,
    },
    /// Player bounced off a platform; `variant` picks the landing sound
    Landed { platform: PlatformId, variant: u8 },
    /// A breakable platform was landed on and started crumbling
    PlatformBreaking { platform: PlatformId },
    MonsterStomped { monster: MonsterId },
    MonsterHit { monster: MonsterId },
    PickupCollected { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Seeded platform/hazard generator (owns the RNG)
    pub spawner: SpawnPolicy,
    pub phase: RunPhase,
    pub player: Player,
    pub registry: Registry,
    /// Total upward world shift plus bonuses; never negative
    pub score: f64,
    /// Total upward world shift this run (camera offset)
    pub scrolled: f64,
    /// Best floored score across runs
    pub best: u64,
    /// Floored score of the last finished run
    pub final_score: Option<u64>,
    /// Next landing sound variant
    pub landing_variant: u8,
    /// Seconds of simulated running time this run
    pub time_secs: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create a new idle simulation with default tuning
    pub fn new(seed: u64, best: u64) -> Self {
        Self::with_tuning(seed, best, Tuning::default())
    }

    /// Create a new idle simulation. The world is populated straight away so
    /// the idle screen has platforms behind the start overlay.
    pub fn with_tuning(seed: u64, best: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            player: Player::spawn(&tuning),
            spawner: SpawnPolicy::new(seed),
            tuning,
            phase: RunPhase::Idle,
            registry: Registry::default(),
            score: 0.0,
            scrolled: 0.0,
            best,
            final_score: None,
            landing_variant: 0,
            time_secs: 0.0,
            time_ticks: 0,
        };
        state.populate();
        state
    }

    /// Fill the registry with a fresh starting layout
    pub fn populate(&mut self) {
        self.registry
            .populate(&mut self.spawner, &self.tuning, self.score);
    }

    /// Score as shown to the player
    pub fn display_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Take the next landing sound variant, rotating through the pool
    pub fn next_landing_variant(&mut self) -> u8 {
        let variant = self.landing_variant;
        self.landing_variant = (self.landing_variant + 1) % self.tuning.landing_variants.max(1);
        variant
    }
}
