//! Entity simulation: player kinematics, platform and monster motion, timers
//!
//! `delta` is frame-relative (1.0 = one 60 fps frame). `secs` is the same step
//! in seconds and drives every timer.

use std::f32::consts::TAU;

use super::registry::Registry;
use super::state::{BreakState, Player, PlatformKind, PowerUpKind};
use crate::tuning::{PowerUpProfile, Tuning};
use crate::wrap_horizontal;

/// Physics modifiers currently applied to the player
pub fn active_profile(player: &Player, tuning: &Tuning) -> PowerUpProfile {
    player
        .power_up
        .map(|p| tuning.profile(p.kind))
        .unwrap_or(PowerUpProfile::IDENTITY)
}

/// Apply one step of gravity, then the profile's lift and fall caps
pub fn apply_gravity(vy: f32, profile: &PowerUpProfile, delta: f32, tuning: &Tuning) -> f32 {
    let mut vy = vy + tuning.gravity * profile.gravity_multiplier * delta;
    if let Some(cap) = profile.fall_cap {
        vy = vy.min(cap);
    }
    if let Some(cap) = profile.lift_cap {
        vy = vy.max(-cap);
    }
    vy
}

/// Advance the player by one step. `direction` is -1, 0 or +1.
/// Returns the player's top y before the move (for swept collision tests).
pub fn update_player(player: &mut Player, direction: f32, delta: f32, tuning: &Tuning) -> f32 {
    let previous_y = player.rect.top();
    let profile = active_profile(player, tuning);
    let h_mult = profile.horizontal_multiplier;

    player.vel.x += direction * tuning.move_accel * h_mult * delta;
    player.vel.x *= tuning.move_friction;
    let max_speed = tuning.max_horizontal_speed * h_mult;
    player.vel.x = player.vel.x.clamp(-max_speed, max_speed);
    player.rect.pos.x += player.vel.x * delta * tuning.motion_scale;
    player.rect.pos.x = wrap_horizontal(player.rect.pos.x, player.rect.size.x, tuning.world_width);

    player.vel.y = apply_gravity(player.vel.y, &profile, delta, tuning);
    player.rect.pos.y += player.vel.y * delta * tuning.motion_scale;

    if player.vel.x.abs() > tuning.facing_threshold {
        player.facing = player.vel.x.signum();
    }

    previous_y
}

/// Advance the death fall. Returns true once the animation has finished.
pub fn update_falling(player: &mut Player, delta: f32, secs: f32, tuning: &Tuning) -> bool {
    player.vel.y = apply_gravity(player.vel.y, &PowerUpProfile::IDENTITY, delta, tuning);
    player.rect.pos.y += player.vel.y * delta * tuning.motion_scale;

    let fall = player.fall.get_or_insert_with(Default::default);
    fall.timer += secs;
    fall.rotation += tuning.fall_spin * secs * player.facing;
    fall.progress = if tuning.fall_duration > 0.0 {
        (fall.timer / tuning.fall_duration).min(1.0)
    } else {
        1.0
    };
    fall.progress >= 1.0
}

/// Tick the active power-up. Returns the kind that just expired, if any.
pub fn update_power_up(player: &mut Player, secs: f32) -> Option<PowerUpKind> {
    let active = player.power_up.as_mut()?;
    active.remaining -= secs;
    active.elapsed += secs;
    if active.remaining <= 0.0 {
        let kind = active.kind;
        player.power_up = None;
        Some(kind)
    } else {
        None
    }
}

/// Slide moving platforms, advance break timers and pickup pulses, then drop
/// platforms whose break timer elapsed. Returns how many were removed.
pub fn update_platforms(registry: &mut Registry, delta: f32, secs: f32, tuning: &Tuning) -> usize {
    for platform in registry.platforms_mut() {
        if platform.kind == PlatformKind::Moving {
            let max_x = tuning.world_width - platform.rect.size.x;
            platform.rect.pos.x += platform.vx * delta * tuning.platform_motion_scale;
            if platform.rect.pos.x < 0.0 || platform.rect.pos.x > max_x {
                platform.vx = -platform.vx;
                platform.rect.pos.x = platform.rect.pos.x.clamp(0.0, max_x);
            }
        }

        if let BreakState::Breaking { timer } = platform.break_state {
            let timer = timer + secs;
            platform.break_state = if timer >= tuning.break_delay {
                BreakState::PendingRemoval
            } else {
                BreakState::Breaking { timer }
            };
        }

        if let Some(pickup) = platform.power_up.as_mut() {
            pickup.pulse = (pickup.pulse + secs * TAU * tuning.pickup_pulse_hz) % TAU;
        }
    }

    registry.retain_platforms(|p| p.break_state != BreakState::PendingRemoval)
}

/// Patrol monsters along their host span and pin them to the host's top.
/// Monsters whose host is missing or invalid are removed.
pub fn update_monsters(registry: &mut Registry, delta: f32) -> usize {
    for (monster, host) in registry.monsters_with_hosts_mut() {
        let Some(host) = host else { continue };
        let span = (host.rect.size.x - monster.rect.size.x).max(0.0);
        monster.offset_x += monster.vx * delta;
        if monster.offset_x < 0.0 || monster.offset_x > span {
            monster.vx = -monster.vx;
            monster.offset_x = monster.offset_x.clamp(0.0, span);
        }
        monster.pin_to(&host.rect);
    }
    registry.prune_orphans()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geom::Rect;
    use crate::sim::state::{ActivePowerUp, Monster, MonsterId, MonsterKind, Platform, PlatformId};
    use proptest::prelude::*;

    fn player(tuning: &Tuning) -> Player {
        Player::spawn(tuning)
    }

    #[test]
    fn test_both_directions_cancel() {
        let tuning = Tuning::default();
        let mut p = player(&tuning);
        update_player(&mut p, 0.0, 1.0, &tuning);
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_horizontal_speed_clamped() {
        let tuning = Tuning::default();
        let mut p = player(&tuning);
        for _ in 0..200 {
            update_player(&mut p, 1.0, 1.6, &tuning);
        }
        assert!(p.vel.x <= tuning.max_horizontal_speed);
        assert_eq!(p.facing, 1.0);
    }

    #[test]
    fn test_power_up_scales_horizontal_cap() {
        let tuning = Tuning::default();
        let mut p = player(&tuning);
        p.vel.x = 100.0;
        p.activate_power_up(PowerUpKind::Glider, &tuning);
        update_player(&mut p, 0.0, 1.0, &tuning);
        let cap = tuning.max_horizontal_speed * tuning.glider.horizontal_multiplier;
        assert!((p.vel.x - cap).abs() < 1e-4);
    }

    #[test]
    fn test_wrap_right_to_left() {
        let tuning = Tuning::default();
        let mut p = player(&tuning);
        p.rect.pos.x = tuning.world_width + 0.5;
        p.vel.x = 0.0;
        update_player(&mut p, 0.0, 1.0, &tuning);
        assert_eq!(p.rect.pos.x, -p.rect.size.x);
    }

    #[test]
    fn test_glider_caps_fall() {
        let tuning = Tuning::default();
        let profile = tuning.glider;
        let vy = apply_gravity(20.0, &profile, 1.0, &tuning);
        assert_eq!(vy, profile.fall_cap.unwrap());
    }

    #[test]
    fn test_rocket_caps_lift() {
        let tuning = Tuning::default();
        let profile = tuning.rocket;
        let mut vy = 0.0;
        for _ in 0..500 {
            vy = apply_gravity(vy, &profile, 1.6, &tuning);
        }
        assert_eq!(vy, -profile.lift_cap.unwrap());
    }

    #[test]
    fn test_power_up_expires() {
        let tuning = Tuning::default();
        let mut p = player(&tuning);
        p.power_up = Some(ActivePowerUp {
            kind: PowerUpKind::Rocket,
            remaining: 0.05,
            elapsed: 2.0,
        });
        assert_eq!(update_power_up(&mut p, 0.02), None);
        assert_eq!(update_power_up(&mut p, 0.04), Some(PowerUpKind::Rocket));
        assert!(p.power_up.is_none());
        assert_eq!(active_profile(&p, &tuning), PowerUpProfile::IDENTITY);
    }

    #[test]
    fn test_moving_platform_reflects_at_edge() {
        let tuning = Tuning::default();
        let mut registry = Registry::default();
        let mut platform = Platform::new(PlatformKind::Moving, tuning.world_width - 69.0, 100.0, 68.0, 14.0);
        platform.vx = 1.5;
        let id = registry.insert_platform(platform);
        update_platforms(&mut registry, 1.0, 1.0 / 60.0, &tuning);
        let platform = registry.platform(id).unwrap();
        assert_eq!(platform.vx, -1.5);
        assert_eq!(platform.rect.right(), tuning.world_width);
    }

    #[test]
    fn test_breaking_platform_removed_after_delay() {
        let tuning = Tuning::default();
        let mut registry = Registry::default();
        let mut platform = Platform::new(PlatformKind::Breakable, 0.0, 100.0, 68.0, 14.0);
        platform.break_state = BreakState::Breaking { timer: 0.0 };
        let id = registry.insert_platform(platform);

        assert_eq!(update_platforms(&mut registry, 1.0, tuning.break_delay / 2.0, &tuning), 0);
        assert!(registry.platform(id).is_some());
        assert_eq!(update_platforms(&mut registry, 1.0, tuning.break_delay / 2.0, &tuning), 1);
        assert!(registry.platform(id).is_none());
    }

    #[test]
    fn test_monster_patrols_within_host() {
        let mut registry = Registry::default();
        let host = registry.insert_platform(Platform::new(PlatformKind::Static, 50.0, 200.0, 68.0, 14.0));
        let id = registry
            .insert_monster(
                host,
                Monster {
                    id: MonsterId(0),
                    kind: MonsterKind::Sprinter,
                    host: PlatformId(0),
                    offset_x: 30.0,
                    vx: 2.0,
                    rect: Rect::new(0.0, 0.0, 36.0, 30.0),
                },
            )
            .unwrap();
        for _ in 0..100 {
            update_monsters(&mut registry, 1.6);
            let m = registry.monster(id).unwrap();
            assert!(m.rect.left() >= 50.0 && m.rect.right() <= 118.0 + 1e-3);
            assert_eq!(m.rect.bottom(), 200.0);
        }
    }

    proptest! {
        #[test]
        fn prop_gravity_step(vy in -20.0f32..20.0, delta in 0.0f32..1.6, kind in 0u8..3) {
            let tuning = Tuning::default();
            let profile = match kind {
                0 => PowerUpProfile::IDENTITY,
                1 => tuning.rocket,
                _ => tuning.glider,
            };
            let mut expected = vy + tuning.gravity * profile.gravity_multiplier * delta;
            if let Some(cap) = profile.fall_cap { expected = expected.min(cap); }
            if let Some(cap) = profile.lift_cap { expected = expected.max(-cap); }
            prop_assert_eq!(apply_gravity(vy, &profile, delta, &tuning), expected);
        }

        #[test]
        fn prop_wrap_stays_in_bounds(x in -500.0f32..1000.0) {
            let tuning = Tuning::default();
            let wrapped = wrap_horizontal(x, tuning.player_width, tuning.world_width);
            prop_assert!(wrapped >= -tuning.player_width && wrapped <= tuning.world_width);
            // Wrapping an already wrapped position is a no-op
            prop_assert_eq!(wrap_horizontal(wrapped, tuning.player_width, tuning.world_width), wrapped);
        }
    }
}
