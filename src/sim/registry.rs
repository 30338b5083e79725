//! Live platform and monster arena
//!
//! Platforms and monsters are keyed by stable ids. Iteration follows id order,
//! which is creation order, so "first qualifying platform" is well defined and
//! identical between runs with the same seed.

use std::collections::BTreeMap;

use super::spawn::{SpawnHistory, SpawnPolicy};
use super::state::{Monster, MonsterId, Platform, PlatformId, PlatformKind};
use crate::tuning::Tuning;

/// Upper bound on platforms generated by a single refill
const MAX_SPAWNS_PER_REFILL: usize = 256;

/// Sole owner of every live platform (with attached pickups) and monster
#[derive(Debug, Clone, Default)]
pub struct Registry {
    platforms: BTreeMap<PlatformId, Platform>,
    monsters: BTreeMap<MonsterId, Monster>,
    next_id: u32,
}

impl Registry {
    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Drop everything. Ids keep counting so old handles never alias new entities.
    pub fn clear(&mut self) {
        self.platforms.clear();
        self.monsters.clear();
    }

    /// Number of live platforms
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    /// Take ownership of a platform and assign its id
    pub fn insert_platform(&mut self, mut platform: Platform) -> PlatformId {
        let id = PlatformId(self.allocate_id());
        platform.id = id;
        self.platforms.insert(id, platform);
        id
    }

    /// Attach a monster to `host`. Returns `None` if the host is gone.
    pub fn insert_monster(&mut self, host: PlatformId, mut monster: Monster) -> Option<MonsterId> {
        let host_rect = self.platforms.get(&host)?.rect;
        let id = MonsterId(self.allocate_id());
        monster.id = id;
        monster.host = host;
        monster.pin_to(&host_rect);
        self.monsters.insert(id, monster);
        Some(id)
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.get(&id)
    }

    pub fn platform_mut(&mut self, id: PlatformId) -> Option<&mut Platform> {
        self.platforms.get_mut(&id)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.values()
    }

    pub fn platforms_mut(&mut self) -> impl Iterator<Item = &mut Platform> {
        self.platforms.values_mut()
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    /// Monsters paired with their host platform (`None` if the host vanished)
    pub fn monsters_with_hosts_mut(
        &mut self,
    ) -> impl Iterator<Item = (&mut Monster, Option<&Platform>)> {
        let platforms = &self.platforms;
        self.monsters
            .values_mut()
            .map(move |m| {
                let host = platforms.get(&m.host);
                (m, host)
            })
    }

    /// Remove a platform together with any monster standing on it
    pub fn remove_platform(&mut self, id: PlatformId) -> Option<Platform> {
        let platform = self.platforms.remove(&id)?;
        self.monsters.retain(|_, m| m.host != id);
        Some(platform)
    }

    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        self.monsters.remove(&id)
    }

    /// Keep only platforms matching `keep`; returns how many were removed
    pub fn retain_platforms(&mut self, mut keep: impl FnMut(&Platform) -> bool) -> usize {
        let before = self.platforms.len();
        self.platforms.retain(|_, p| keep(p));
        let removed = before - self.platforms.len();
        if removed > 0 {
            self.prune_orphans();
        }
        removed
    }

    /// Drop monsters whose host is gone or can no longer carry them
    pub fn prune_orphans(&mut self) -> usize {
        let platforms = &self.platforms;
        let before = self.monsters.len();
        self.monsters.retain(|_, m| {
            platforms
                .get(&m.host)
                .is_some_and(|host| host.can_host_monster())
        });
        before - self.monsters.len()
    }

    /// Move the whole world down by `dy` (camera scroll)
    pub fn shift(&mut self, dy: f32) {
        for platform in self.platforms.values_mut() {
            platform.rect.pos.y += dy;
        }
        self.pin_monsters();
    }

    /// Re-derive every monster's position from its host
    pub fn pin_monsters(&mut self) {
        for (monster, host) in self.monsters_with_hosts_mut() {
            if let Some(host) = host {
                monster.pin_to(&host.rect);
            }
        }
    }

    /// Top y of the highest platform
    pub fn highest_y(&self) -> Option<f32> {
        self.platforms
            .values()
            .map(|p| p.rect.top())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Generation history derived from the live platforms, top first
    pub fn history(&self, tuning: &Tuning) -> SpawnHistory {
        let mut tops: Vec<&Platform> = self.platforms.values().collect();
        tops.sort_by(|a, b| a.rect.top().total_cmp(&b.rect.top()));

        let Some(top) = tops.first() else {
            return SpawnHistory::ground(tuning);
        };
        let consecutive_dead = tops
            .iter()
            .take_while(|p| p.kind == PlatformKind::Dead)
            .count() as u32;
        let last_landable_y = tops
            .iter()
            .find(|p| p.kind != PlatformKind::Dead)
            .map(|p| p.rect.top())
            .unwrap_or(tuning.world_height - tuning.ground_offset);

        SpawnHistory {
            previous_y: top.rect.top(),
            last_landable_y,
            consecutive_dead,
        }
    }

    /// Generate one platform on top of the stack, maybe with a monster
    pub fn spawn_next(
        &mut self,
        spawner: &mut SpawnPolicy,
        tuning: &Tuning,
        score: f64,
        initial: bool,
    ) -> PlatformId {
        let history = self.history(tuning);
        let platform = spawner.generate_next(tuning, &history);
        let monster = spawner.roll_monster(tuning, &platform, score, initial);
        let id = self.insert_platform(platform);
        if let Some(monster) = monster {
            self.insert_monster(id, monster);
        }
        id
    }

    /// Replace the world with a centred static ground platform and a column
    /// of generated platforms reaching half a screen above the top edge
    pub fn populate(&mut self, spawner: &mut SpawnPolicy, tuning: &Tuning, score: f64) {
        self.clear();
        let ground = Platform::new(
            PlatformKind::Static,
            tuning.world_width / 2.0 - tuning.platform_width / 2.0,
            tuning.world_height - tuning.ground_offset,
            tuning.platform_width,
            tuning.platform_height,
        );
        self.insert_platform(ground);

        let ceiling = -tuning.world_height * 0.5;
        let mut spawned = 0;
        while spawned < MAX_SPAWNS_PER_REFILL
            && (self.len() < tuning.min_platforms || self.highest_y().is_some_and(|y| y > ceiling))
        {
            self.spawn_next(spawner, tuning, score, true);
            spawned += 1;
        }
        log::debug!("populated {} platforms, {} monsters", self.len(), self.monster_count());
    }

    /// Generate until the minimum count is live and content exists above the
    /// visible area. Returns the number of platforms added.
    pub fn refill(&mut self, spawner: &mut SpawnPolicy, tuning: &Tuning, score: f64) -> usize {
        let mut spawned = 0;
        while self.len() < tuning.min_platforms || self.highest_y().is_none_or(|y| y > 0.0) {
            if spawned >= MAX_SPAWNS_PER_REFILL {
                log::warn!("refill stopped after {} platforms", spawned);
                break;
            }
            self.spawn_next(spawner, tuning, score, false);
            spawned += 1;
        }
        spawned
    }
}
