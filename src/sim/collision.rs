//! Collision detection and resolution
//!
//! Runs after every entity has moved. Platform landings use a swept test on
//! the player's bottom edge so a fast fall can't tunnel through a thin
//! platform; monsters and pickups use plain overlap of the current boxes.

use super::geom::crossed_from_above;
use super::lifecycle;
use super::physics::active_profile;
use super::registry::Registry;
use super::state::{BreakState, GameEvent, GameState, MonsterId, Player, PlatformId, PlatformKind, PowerUpKind};
use crate::tuning::Tuning;

/// Outcome of checking the player against every monster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterContact {
    None,
    /// Landed on top of the monster and defeated it
    Stomp(MonsterId),
    /// Any other contact; the run is over
    Fatal(MonsterId),
}

/// Land the player on the first qualifying platform in collection order.
///
/// Only applies while falling. A landing snaps the player onto the platform,
/// launches a new jump, and starts the break sequence on breakable platforms.
pub fn land_on_platform(
    player: &mut Player,
    previous_y: f32,
    registry: &mut Registry,
    tuning: &Tuning,
) -> Option<PlatformId> {
    if player.vel.y <= 0.0 {
        return None;
    }
    let height = player.rect.size.y;
    let prev_bottom = previous_y + height;
    let curr_bottom = player.rect.bottom();
    let jump_multiplier = active_profile(player, tuning).jump_multiplier;

    let platform = registry.platforms_mut().find(|p| {
        p.is_landable()
            && player.rect.overlaps_x(&p.rect)
            && crossed_from_above(prev_bottom, curr_bottom, p.rect.top())
    })?;

    player.rect.pos.y = platform.rect.top() - height;
    player.vel.y = tuning.jump_velocity * jump_multiplier;
    if platform.kind == PlatformKind::Breakable {
        platform.break_state = BreakState::Breaking { timer: 0.0 };
    }
    Some(platform.id)
}

/// Check the player against every monster overlapping its current box.
///
/// `was_falling` and `previous_y` describe the player before this tick's
/// resolution, so a landing resolved earlier in the same tick doesn't turn a
/// stomp into a hit. A stomp removes the monster and bounces the player.
pub fn resolve_monsters(
    player: &mut Player,
    previous_y: f32,
    was_falling: bool,
    registry: &mut Registry,
    tuning: &Tuning,
) -> MonsterContact {
    let prev_bottom = previous_y + player.rect.size.y;
    let contact = registry
        .monsters()
        .find(|m| player.rect.overlaps(&m.rect))
        .map(|m| {
            if was_falling && prev_bottom <= m.rect.top() + tuning.stomp_tolerance {
                MonsterContact::Stomp(m.id)
            } else {
                MonsterContact::Fatal(m.id)
            }
        })
        .unwrap_or(MonsterContact::None);

    if let MonsterContact::Stomp(id) = contact {
        registry.remove_monster(id);
        player.vel.y = tuning.jump_velocity * tuning.stomp_bounce;
    }
    contact
}

/// Collect the first still-attached pickup overlapping the player. The pickup
/// is detached and its effect replaces whatever was active.
pub fn collect_pickup(player: &mut Player, registry: &mut Registry, tuning: &Tuning) -> Option<PowerUpKind> {
    let platform = registry.platforms_mut().find(|p| {
        p.power_up
            .as_ref()
            .is_some_and(|pickup| player.rect.overlaps(&pickup.rect(&p.rect, tuning.pickup_hover)))
    })?;
    let kind = platform.power_up.take()?.kind;
    player.activate_power_up(kind, tuning);
    Some(kind)
}

/// The player's top is more than one body height below the visible area
pub fn fell_out(player: &Player, tuning: &Tuning) -> bool {
    player.rect.top() > tuning.world_height + player.rect.size.y
}

/// Resolve every collision for this tick, in order: platform landing, monsters,
/// pickups, fall-out. Returns false if the run stopped running normally.
pub fn resolve(state: &mut GameState, previous_y: f32, events: &mut Vec<GameEvent>) -> bool {
    let was_falling = state.player.vel.y > 0.0;

    if let Some(id) = land_on_platform(&mut state.player, previous_y, &mut state.registry, &state.tuning) {
        let variant = state.next_landing_variant();
        events.push(GameEvent::Landed { platform: id, variant });
        if state
            .registry
            .platform(id)
            .is_some_and(|p| p.kind == PlatformKind::Breakable)
        {
            state.registry.prune_orphans();
            events.push(GameEvent::PlatformBreaking { platform: id });
        }
    }

    match resolve_monsters(
        &mut state.player,
        previous_y,
        was_falling,
        &mut state.registry,
        &state.tuning,
    ) {
        MonsterContact::None => {}
        MonsterContact::Stomp(monster) => {
            state.score += state.tuning.stomp_bonus;
            events.push(GameEvent::MonsterStomped { monster });
        }
        MonsterContact::Fatal(monster) => {
            events.push(GameEvent::MonsterHit { monster });
            lifecycle::end_run(state, events);
            return false;
        }
    }

    if let Some(kind) = collect_pickup(&mut state.player, &mut state.registry, &state.tuning) {
        events.push(GameEvent::PickupCollected { kind });
    }

    if fell_out(&state.player, &state.tuning) {
        lifecycle::begin_fall(state, events);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geom::Rect;
    use crate::sim::state::{Monster, MonsterKind, Pickup, Platform, RunPhase};

    fn player_box_at(x: f32, y: f32, tuning: &Tuning) -> Rect {
        Rect::new(x, y, tuning.player_width, tuning.player_height)
    }

    fn scene() -> GameState {
        let mut state = GameState::new(1, 0);
        state.registry.clear();
        state.phase = RunPhase::Running;
        state
    }

    fn falling_player_above(state: &mut GameState, surface: f32, x: f32) -> f32 {
        let tuning = &state.tuning;
        state.player.rect = player_box_at(x, surface - tuning.player_height + 5.0, tuning);
        state.player.vel.y = 6.0;
        // Previous top: bottom was 5px above the surface
        surface - tuning.player_height - 5.0
    }

    fn add_monster(state: &mut GameState, host: PlatformId) -> MonsterId {
        state
            .registry
            .insert_monster(
                host,
                Monster {
                    id: MonsterId(0),
                    kind: MonsterKind::Walker,
                    host,
                    offset_x: 16.0,
                    vx: 0.0,
                    rect: Rect::new(0.0, 0.0, 36.0, 30.0),
                },
            )
            .unwrap()
    }

    #[test]
    fn test_swept_landing_snaps_and_jumps() {
        let mut state = scene();
        let id = state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let prev = falling_player_above(&mut state, 300.0, 110.0);

        let landed = land_on_platform(&mut state.player, prev, &mut state.registry, &state.tuning);
        assert_eq!(landed, Some(id));
        assert_eq!(state.player.rect.bottom(), 300.0);
        assert_eq!(state.player.vel.y, state.tuning.jump_velocity);
    }

    #[test]
    fn test_no_landing_while_rising() {
        let mut state = scene();
        state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let prev = falling_player_above(&mut state, 300.0, 110.0);
        state.player.vel.y = -3.0;
        assert!(land_on_platform(&mut state.player, prev, &mut state.registry, &state.tuning).is_none());
    }

    #[test]
    fn test_dead_platform_is_ignored() {
        let mut state = scene();
        state
            .registry
            .insert_platform(Platform::new(PlatformKind::Dead, 100.0, 300.0, 68.0, 14.0));
        let prev = falling_player_above(&mut state, 300.0, 110.0);
        assert!(land_on_platform(&mut state.player, prev, &mut state.registry, &state.tuning).is_none());
    }

    #[test]
    fn test_first_platform_in_collection_order_wins() {
        let mut state = scene();
        let first = state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 302.0, 68.0, 14.0));
        state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let prev = falling_player_above(&mut state, 300.0, 110.0);
        let landed = land_on_platform(&mut state.player, prev, &mut state.registry, &state.tuning);
        assert_eq!(landed, Some(first));
    }

    #[test]
    fn test_breakable_becomes_unlandable() {
        let mut state = scene();
        let id = state
            .registry
            .insert_platform(Platform::new(PlatformKind::Breakable, 100.0, 300.0, 68.0, 14.0));
        let prev = falling_player_above(&mut state, 300.0, 110.0);
        let mut events = Vec::new();
        assert!(resolve(&mut state, prev, &mut events));
        assert!(!state.registry.platform(id).unwrap().is_landable());
        assert!(events.contains(&GameEvent::PlatformBreaking { platform: id }));
    }

    #[test]
    fn test_landing_variants_rotate() {
        let mut state = scene();
        state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let mut variants = Vec::new();
        for _ in 0..8 {
            let prev = falling_player_above(&mut state, 300.0, 110.0);
            let mut events = Vec::new();
            resolve(&mut state, prev, &mut events);
            for e in events {
                if let GameEvent::Landed { variant, .. } = e {
                    variants.push(variant);
                }
            }
        }
        assert_eq!(variants, vec![0, 1, 2, 3, 4, 5, 0, 1]);
    }

    #[test]
    fn test_stomp_removes_monster_and_scores() {
        let mut state = scene();
        let host = state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let monster = add_monster(&mut state, host);
        // Monster spans y 270..300; come down onto its head
        let prev = falling_player_above(&mut state, 270.0, 120.0);
        let score = state.score;
        let mut events = Vec::new();

        assert!(resolve(&mut state, prev, &mut events));
        assert!(state.registry.monster(monster).is_none());
        assert_eq!(state.registry.monster_count(), 0);
        assert_eq!(state.score, score + state.tuning.stomp_bonus);
        assert!(state.phase.is_running());
        assert!(state.player.vel.y < 0.0);
        assert!(events.contains(&GameEvent::MonsterStomped { monster }));
    }

    #[test]
    fn test_side_contact_is_fatal() {
        let mut state = scene();
        let host = state
            .registry
            .insert_platform(Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0));
        let monster = add_monster(&mut state, host);
        state.player.rect = player_box_at(90.0, 260.0, &state.tuning);
        state.player.vel.y = -4.0;
        let prev = 262.0;
        let mut events = Vec::new();

        assert!(!resolve(&mut state, prev, &mut events));
        assert!(!state.phase.is_running());
        assert_eq!(state.phase, RunPhase::Ended);
        assert!(events.contains(&GameEvent::MonsterHit { monster }));
    }

    #[test]
    fn test_pickup_replaces_active_effect() {
        let mut state = scene();
        let mut platform = Platform::new(PlatformKind::Static, 100.0, 300.0, 68.0, 14.0);
        platform.power_up = Some(Pickup {
            kind: PowerUpKind::Glider,
            offset_x: 21.0,
            size: 26.0,
            pulse: 0.0,
        });
        let id = state.registry.insert_platform(platform);
        state.player.activate_power_up(PowerUpKind::Rocket, &state.tuning);
        if let Some(active) = state.player.power_up.as_mut() {
            active.remaining = 0.1;
        }
        // Overlap the pickup (y 268..294) while rising
        state.player.rect = player_box_at(110.0, 250.0, &state.tuning);
        state.player.vel.y = -5.0;

        let kind = collect_pickup(&mut state.player, &mut state.registry, &state.tuning);
        assert_eq!(kind, Some(PowerUpKind::Glider));
        let active = state.player.power_up.unwrap();
        assert_eq!(active.kind, PowerUpKind::Glider);
        assert_eq!(active.remaining, state.tuning.glider.duration);
        assert!(state.registry.platform(id).unwrap().power_up.is_none());
    }

    #[test]
    fn test_fell_out_threshold() {
        let tuning = Tuning::default();
        let mut player = Player::spawn(&tuning);
        player.rect.pos.y = tuning.world_height + tuning.player_height;
        assert!(!fell_out(&player, &tuning));
        player.rect.pos.y += 0.5;
        assert!(fell_out(&player, &tuning));
    }
}
