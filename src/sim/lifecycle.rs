//! Run lifecycle: idle → running ⇄ paused, running → falling → ended → running
//!
//! Every transition emits its event into the tick's outbound list; nothing here
//! talks to audio or the page directly.

use super::state::{GameEvent, GameState, Player, RunPhase};

/// Start (or restart) a run. Ignored while a run is in progress.
pub fn start_run(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    if !state.phase.can_start() {
        return false;
    }

    state.score = 0.0;
    state.scrolled = 0.0;
    state.final_score = None;
    state.time_secs = 0.0;
    state.time_ticks = 0;
    state.player = Player::spawn(&state.tuning);
    state.populate();
    state.phase = RunPhase::Running;

    log::info!(
        "Run started (seed {}, {} platforms)",
        state.seed,
        state.registry.len()
    );
    events.push(GameEvent::RunStarted);
    true
}

/// Pause or resume. Only meaningful between `Running` and `Paused`; pausing
/// during the death fall or outside a run is refused.
pub fn set_paused(state: &mut GameState, paused: bool, events: &mut Vec<GameEvent>) -> bool {
    match (state.phase, paused) {
        (RunPhase::Running, true) => {
            state.phase = RunPhase::Paused;
            log::info!("Paused");
            events.push(GameEvent::Paused);
            true
        }
        (RunPhase::Paused, false) => {
            state.phase = RunPhase::Running;
            log::info!("Resumed");
            events.push(GameEvent::Resumed);
            true
        }
        _ => false,
    }
}

/// Flip between running and paused
pub fn toggle_pause(state: &mut GameState, events: &mut Vec<GameEvent>) -> bool {
    let paused = state.phase != RunPhase::Paused;
    set_paused(state, paused, events)
}

/// Enter the death fall; input is ignored until the run ends
pub fn begin_fall(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != RunPhase::Running {
        return;
    }
    state.phase = RunPhase::Falling;
    state.player.fall = Some(Default::default());
    state.player.power_up = None;
    events.push(GameEvent::FallStarted);
}

/// Freeze the score, update the best score and publish the summary
pub fn end_run(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.phase.is_running() {
        return;
    }
    let final_score = state.display_score();
    let new_best = final_score > state.best;
    state.best = state.best.max(final_score);
    state.final_score = Some(final_score);
    state.phase = RunPhase::Ended;

    log::info!(
        "Run ended: score {} (best {}{})",
        final_score,
        state.best,
        if new_best { ", new best" } else { "" }
    );
    events.push(GameEvent::RunEnded {
        final_score,
        best: state.best,
        new_best,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_from_idle() {
        let mut state = GameState::new(42, 0);
        let mut events = Vec::new();
        assert_eq!(state.phase, RunPhase::Idle);
        assert!(start_run(&mut state, &mut events));
        assert_eq!(state.phase, RunPhase::Running);
        assert_eq!(events, vec![GameEvent::RunStarted]);

        // Can't restart mid-run
        assert!(!start_run(&mut state, &mut events));
    }

    #[test]
    fn test_pause_rules() {
        let mut state = GameState::new(42, 0);
        let mut events = Vec::new();
        assert!(!toggle_pause(&mut state, &mut events)); // idle

        start_run(&mut state, &mut events);
        assert!(toggle_pause(&mut state, &mut events));
        assert_eq!(state.phase, RunPhase::Paused);
        assert!(!set_paused(&mut state, true, &mut events));
        assert!(toggle_pause(&mut state, &mut events));
        assert_eq!(state.phase, RunPhase::Running);

        begin_fall(&mut state, &mut events);
        assert!(!toggle_pause(&mut state, &mut events));
        assert_eq!(state.phase, RunPhase::Falling);
    }

    #[test]
    fn test_end_run_updates_best() {
        let mut state = GameState::new(42, 100);
        let mut events = Vec::new();
        start_run(&mut state, &mut events);
        state.score = 250.7;
        end_run(&mut state, &mut events);

        assert_eq!(state.phase, RunPhase::Ended);
        assert_eq!(state.best, 250);
        assert_eq!(state.final_score, Some(250));
        assert!(events.contains(&GameEvent::RunEnded {
            final_score: 250,
            best: 250,
            new_best: true
        }));
    }

    #[test]
    fn test_end_run_keeps_higher_best() {
        let mut state = GameState::new(42, 900);
        let mut events = Vec::new();
        start_run(&mut state, &mut events);
        state.score = 10.0;
        end_run(&mut state, &mut events);
        assert_eq!(state.best, 900);
        assert_eq!(state.final_score, Some(10));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut state = GameState::new(42, 0);
        let mut events = Vec::new();
        start_run(&mut state, &mut events);
        state.score = 500.0;
        state.player.rect.pos.y = 9999.0;
        end_run(&mut state, &mut events);

        assert!(start_run(&mut state, &mut events));
        assert_eq!(state.score, 0.0);
        assert_eq!(state.final_score, None);
        assert!(state.player.rect.top() < state.tuning.world_height);
        assert!(state.registry.len() >= state.tuning.min_platforms);
    }
}
