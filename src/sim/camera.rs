//! Camera scroll, recycling and score
//!
//! The camera never moves; the world does. When the player climbs above the
//! ascent line everything is pushed down by the same amount and that amount is
//! added to the score.

use super::state::GameState;

/// Pull the player back down to the ascent line. Returns the (non-negative)
/// shift applied; zero when the player is at or below the line.
pub fn follow(state: &mut GameState) -> f32 {
    let line = state.tuning.ascent_line();
    let y = state.player.rect.top();
    if y >= line {
        return 0.0;
    }

    let shift = line - y;
    state.player.rect.pos.y += shift;
    state.registry.shift(shift);
    state.score += f64::from(shift);
    state.scrolled += f64::from(shift);
    shift
}

/// Drop platforms (and their monsters) that scrolled below the cull line, then
/// generate new ones above. Returns `(removed, added)`.
pub fn recycle(state: &mut GameState) -> (usize, usize) {
    let cull = state.tuning.cull_line();
    let removed = state.registry.retain_platforms(|p| p.rect.top() < cull);
    let added = state
        .registry
        .refill(&mut state.spawner, &state.tuning, state.score);
    if removed > 0 || added > 0 {
        log::trace!("recycled {} platforms, spawned {}", removed, added);
    }
    (removed, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle;
    use crate::sim::state::GameEvent;

    fn running() -> GameState {
        let mut state = GameState::new(77, 0);
        let mut events: Vec<GameEvent> = Vec::new();
        lifecycle::start_run(&mut state, &mut events);
        state
    }

    #[test]
    fn test_no_shift_below_line() {
        let mut state = running();
        state.player.rect.pos.y = state.tuning.ascent_line() + 10.0;
        assert_eq!(follow(&mut state), 0.0);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_shift_moves_world_and_scores() {
        let mut state = running();
        let line = state.tuning.ascent_line();
        state.player.rect.pos.y = line - 30.0;
        let tops: Vec<f32> = state.registry.platforms().map(|p| p.rect.top()).collect();

        let shift = follow(&mut state);
        assert_eq!(shift, 30.0);
        assert_eq!(state.player.rect.top(), line);
        assert_eq!(state.score, 30.0);
        for (before, p) in tops.iter().zip(state.registry.platforms()) {
            assert_eq!(p.rect.top(), before + 30.0);
        }
        for monster in state.registry.monsters() {
            let host = state.registry.platform(monster.host).unwrap();
            assert_eq!(monster.rect.bottom(), host.rect.top());
        }
    }

    #[test]
    fn test_recycle_keeps_window_full() {
        let mut state = running();
        for _ in 0..40 {
            state.player.rect.pos.y = state.tuning.ascent_line() - 80.0;
            follow(&mut state);
            recycle(&mut state);
            assert!(state.registry.len() >= state.tuning.min_platforms);
            assert!(state.registry.highest_y().unwrap() <= 0.0);
            assert!(state
                .registry
                .platforms()
                .all(|p| p.rect.top() < state.tuning.cull_line()));
        }
        assert_eq!(state.score, 40.0 * 80.0);
    }
}
