//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-relative delta only, clamped
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod camera;
pub mod collision;
pub mod geom;
pub mod lifecycle;
pub mod physics;
pub mod registry;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::MonsterContact;
pub use geom::Rect;
pub use registry::Registry;
pub use snapshot::RenderSnapshot;
pub use spawn::{SpawnHistory, SpawnPolicy};
pub use state::{
    ActivePowerUp, BreakState, FallAnimation, GameEvent, GameState, Monster, MonsterId,
    MonsterKind, Pickup, Platform, PlatformId, PlatformKind, Player, PowerUpKind, RunPhase,
};
pub use tick::{TickInput, tick};
