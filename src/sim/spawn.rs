//! Procedural platform and hazard generation
//!
//! All randomness in the simulation flows through the single seeded [`Pcg32`]
//! owned by [`SpawnPolicy`], so a seed fully determines a run's layout.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geom::Rect;
use super::state::{
    Monster, MonsterId, MonsterKind, Pickup, Platform, PlatformId, PlatformKind, PowerUpKind,
};
use crate::tuning::Tuning;

/// What the generator needs to know about the platforms already placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnHistory {
    /// Top y of the highest platform so far
    pub previous_y: f32,
    /// Top y of the highest platform that is not dead
    pub last_landable_y: f32,
    /// Dead platforms in a row at the top of the stack
    pub consecutive_dead: u32,
}

impl SpawnHistory {
    /// History for an empty world, anchored at the ground line
    pub fn ground(tuning: &Tuning) -> Self {
        let y = tuning.world_height - tuning.ground_offset;
        Self {
            previous_y: y,
            last_landable_y: y,
            consecutive_dead: 0,
        }
    }

    /// History after `platform` has been placed on top
    pub fn after(self, platform: &Platform) -> Self {
        let y = platform.rect.top();
        if platform.kind == PlatformKind::Dead {
            Self {
                previous_y: y,
                last_landable_y: self.last_landable_y,
                consecutive_dead: self.consecutive_dead + 1,
            }
        } else {
            Self {
                previous_y: y,
                last_landable_y: y,
                consecutive_dead: 0,
            }
        }
    }
}

/// Seeded generator for platforms, pickups and monsters
#[derive(Debug, Clone)]
pub struct SpawnPolicy {
    rng: Pcg32,
}

impl SpawnPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generate the next platform above `history.previous_y`.
    ///
    /// The gap is drawn uniformly from `[min_gap, max_gap]`, then clamped so the
    /// platform never sits further above the last landable platform than a jump
    /// can carry the player. The returned platform has no id yet.
    pub fn generate_next(&mut self, tuning: &Tuning, history: &SpawnHistory) -> Platform {
        let gap = self.rng.random_range(tuning.min_gap..=tuning.max_gap);
        let ceiling = history.last_landable_y - tuning.max_reach();
        let y = (history.previous_y - gap).max(ceiling);

        let mut kind = self.roll_kind(tuning, history);
        // A dead platform here must still leave room for a landable one after it
        if kind == PlatformKind::Dead && y - tuning.min_gap < ceiling {
            kind = PlatformKind::Static;
        }

        let x = self
            .rng
            .random_range(0.0..=(tuning.world_width - tuning.platform_width).max(0.0));
        let mut platform = Platform::new(kind, x, y, tuning.platform_width, tuning.platform_height);

        match kind {
            PlatformKind::Moving => {
                let speed = self
                    .rng
                    .random_range(tuning.moving_speed_min..=tuning.moving_speed_max);
                let dir = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
                platform.vx = speed * dir;
            }
            PlatformKind::Static => {
                platform.power_up = self.roll_power_up(tuning);
            }
            PlatformKind::Dead | PlatformKind::Breakable => {}
        }

        log::trace!("spawn {:?} at ({:.0}, {:.0}) gap {:.0}", kind, x, y, gap);
        platform
    }

    /// Moving first, then dead or breakable (mutually exclusive), else static.
    /// A dead roll past the run-length cap is downgraded to static.
    fn roll_kind(&mut self, tuning: &Tuning, history: &SpawnHistory) -> PlatformKind {
        if self.rng.random::<f32>() < tuning.moving_prob {
            return PlatformKind::Moving;
        }
        let roll = self.rng.random::<f32>();
        if roll < tuning.dead_prob {
            if history.consecutive_dead < tuning.max_consecutive_dead {
                PlatformKind::Dead
            } else {
                PlatformKind::Static
            }
        } else if roll < tuning.dead_prob + tuning.breakable_prob {
            PlatformKind::Breakable
        } else {
            PlatformKind::Static
        }
    }

    fn roll_power_up(&mut self, tuning: &Tuning) -> Option<Pickup> {
        if self.rng.random::<f32>() >= tuning.power_up_prob {
            return None;
        }
        let kind = if self.rng.random::<f32>() < tuning.rocket_share {
            PowerUpKind::Rocket
        } else {
            PowerUpKind::Glider
        };
        Some(Pickup {
            kind,
            offset_x: (tuning.platform_width - tuning.pickup_size) / 2.0,
            size: tuning.pickup_size,
            pulse: 0.0,
        })
    }

    /// Maybe place a monster on `host`. `initial` marks the population at run
    /// start, where low platforms are kept clear so nothing spawns on the player.
    pub fn roll_monster(
        &mut self,
        tuning: &Tuning,
        host: &Platform,
        score: f64,
        initial: bool,
    ) -> Option<Monster> {
        if !monster_eligible(tuning, host, initial) {
            return None;
        }
        if self.rng.random::<f32>() >= monster_chance(tuning, score) {
            return None;
        }

        let (kind, (lo, hi)) = if self.rng.random::<f32>() < tuning.sprinter_share {
            (MonsterKind::Sprinter, tuning.sprinter_speed)
        } else {
            (MonsterKind::Walker, tuning.walker_speed)
        };
        let speed = self.rng.random_range(lo..=hi);
        let dir = if self.rng.random_bool(0.5) { -1.0 } else { 1.0 };
        let span = (host.rect.size.x - tuning.monster_width).max(0.0);
        let offset_x = self.rng.random_range(0.0..=span);

        let mut monster = Monster {
            id: MonsterId(0),
            kind,
            host: PlatformId(0),
            offset_x,
            vx: speed * dir,
            rect: Rect::new(0.0, 0.0, tuning.monster_width, tuning.monster_height),
        };
        monster.pin_to(&host.rect);
        log::debug!("monster {:?} on platform at y {:.0}", kind, host.rect.top());
        Some(monster)
    }
}

/// Monster spawn chance, rising with score up to a cap
pub fn monster_chance(tuning: &Tuning, score: f64) -> f32 {
    (tuning.monster_base_prob + tuning.monster_prob_per_point * score.max(0.0) as f32)
        .min(tuning.monster_max_prob)
}

/// Static, wide enough, clear of the bottom edge, without a pickup, and during
/// the initial population high enough on screen to stay away from the player.
pub fn monster_eligible(tuning: &Tuning, host: &Platform, initial: bool) -> bool {
    if !host.can_host_monster() || host.power_up.is_some() {
        return false;
    }
    if host.rect.size.x < tuning.monster_width + 2.0 * tuning.monster_host_padding {
        return false;
    }
    let y = host.rect.top();
    if y > tuning.world_height - tuning.monster_bottom_margin {
        return false;
    }
    !(initial && y > tuning.world_height * tuning.monster_initial_ceiling)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn generate_stream(seed: u64, tuning: &Tuning, count: usize) -> Vec<Platform> {
        let mut policy = SpawnPolicy::new(seed);
        let mut history = SpawnHistory::ground(tuning);
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let platform = policy.generate_next(tuning, &history);
            history = history.after(&platform);
            out.push(platform);
        }
        out
    }

    #[test]
    fn test_same_seed_same_stream() {
        let tuning = Tuning::default();
        let a = generate_stream(7, &tuning, 50);
        let b = generate_stream(7, &tuning, 50);
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.rect, pb.rect);
            assert_eq!(pa.kind, pb.kind);
        }
    }

    #[test]
    fn test_dead_never_hosts() {
        let tuning = Tuning {
            dead_prob: 0.5,
            power_up_prob: 1.0,
            ..Tuning::default()
        };
        for p in generate_stream(3, &tuning, 300) {
            if p.kind != PlatformKind::Static {
                assert!(p.power_up.is_none());
            }
        }
        let dead = Platform::new(PlatformKind::Dead, 0.0, 100.0, 68.0, 14.0);
        assert!(!monster_eligible(&tuning, &dead, false));
    }

    #[test]
    fn test_moving_platforms_get_speed() {
        let tuning = Tuning {
            moving_prob: 1.0,
            ..Tuning::default()
        };
        for p in generate_stream(11, &tuning, 50) {
            assert_eq!(p.kind, PlatformKind::Moving);
            let speed = p.vx.abs();
            assert!(speed >= tuning.moving_speed_min && speed <= tuning.moving_speed_max);
        }
    }

    #[test]
    fn test_monster_chance_caps() {
        let tuning = Tuning::default();
        assert_eq!(monster_chance(&tuning, 0.0), tuning.monster_base_prob);
        assert_eq!(monster_chance(&tuning, 1.0e9), tuning.monster_max_prob);
    }

    #[test]
    fn test_monster_eligibility() {
        let tuning = Tuning::default();
        let high = Platform::new(PlatformKind::Static, 0.0, 100.0, 68.0, 14.0);
        let low = Platform::new(PlatformKind::Static, 0.0, 600.0, 68.0, 14.0);
        let mid = Platform::new(PlatformKind::Static, 0.0, 450.0, 68.0, 14.0);
        let narrow = Platform::new(PlatformKind::Static, 0.0, 100.0, 30.0, 14.0);
        assert!(monster_eligible(&tuning, &high, true));
        assert!(!monster_eligible(&tuning, &low, false));
        assert!(monster_eligible(&tuning, &mid, false));
        assert!(!monster_eligible(&tuning, &mid, true));
        assert!(!monster_eligible(&tuning, &narrow, false));
    }

    #[test]
    fn test_monster_stays_on_host() {
        let tuning = Tuning {
            monster_base_prob: 1.0,
            monster_max_prob: 1.0,
            ..Tuning::default()
        };
        let mut policy = SpawnPolicy::new(5);
        let host = Platform::new(PlatformKind::Static, 100.0, 200.0, 68.0, 14.0);
        let monster = policy.roll_monster(&tuning, &host, 0.0, false).unwrap();
        assert_eq!(monster.rect.bottom(), host.rect.top());
        assert!(monster.rect.left() >= host.rect.left());
        assert!(monster.rect.right() <= host.rect.right());
    }

    proptest! {
        #[test]
        fn prop_gap_within_range_or_reachable(seed in any::<u64>()) {
            let tuning = Tuning::default();
            let mut policy = SpawnPolicy::new(seed);
            let mut history = SpawnHistory::ground(&tuning);
            for _ in 0..200 {
                let p = policy.generate_next(&tuning, &history);
                let gap = history.previous_y - p.rect.top();
                let in_range = gap >= tuning.min_gap - 1e-3 && gap <= tuning.max_gap + 1e-3;
                let reach = history.last_landable_y - p.rect.top();
                prop_assert!(in_range || reach <= tuning.max_jump_height());
                history = history.after(&p);
            }
        }

        #[test]
        fn prop_dead_run_length_capped(seed in any::<u64>(), dead in 0.0f32..0.9) {
            let tuning = Tuning { dead_prob: dead, breakable_prob: 0.0, ..Tuning::default() };
            let mut run = 0;
            for p in generate_stream(seed, &tuning, 200) {
                if p.kind == PlatformKind::Dead {
                    run += 1;
                    prop_assert!(run <= tuning.max_consecutive_dead);
                } else {
                    run = 0;
                }
            }
        }

        #[test]
        fn prop_stream_is_completable(seed in any::<u64>()) {
            let tuning = Tuning { dead_prob: 0.8, breakable_prob: 0.1, ..Tuning::default() };
            let mut history = SpawnHistory::ground(&tuning);
            for p in generate_stream(seed, &tuning, 200) {
                if p.kind != PlatformKind::Dead {
                    prop_assert!(history.last_landable_y - p.rect.top() <= tuning.max_jump_height());
                }
                history = history.after(&p);
            }
        }

        #[test]
        fn prop_platforms_inside_world(seed in any::<u64>()) {
            let tuning = Tuning::default();
            for p in generate_stream(seed, &tuning, 100) {
                prop_assert!(p.rect.left() >= 0.0);
                prop_assert!(p.rect.right() <= tuning.world_width + 1e-3);
            }
        }
    }
}
