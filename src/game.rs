//! Host-side controller
//!
//! Owns everything around the simulation that a page needs: held input, the
//! frame clock, preferences, audio routing and persistence. The browser shell
//! forwards DOM events here and draws whatever `frame` returns.

use crate::audio::{AudioBackend, AudioMixer};
use crate::best_score::BestScore;
use crate::persistence::Storage;
use crate::platform::{Direction, FrameClock, InputSource, InputState, KeyAction, key_action};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, RenderSnapshot, RunPhase, lifecycle, tick};
use crate::tuning::Tuning;

/// Discrete requests from buttons, keys and the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Start a run (ignored while one is in progress)
    Start,
    TogglePause,
    Pause,
    Resume,
    ToggleSfxMute,
    ToggleMusicMute,
    /// Window blur or tab hidden
    FocusLost,
}

pub struct Game<B: AudioBackend, S: Storage> {
    state: GameState,
    input: InputState,
    clock: FrameClock,
    settings: Settings,
    best: BestScore,
    audio: AudioMixer<B>,
    storage: S,
}

impl<B: AudioBackend, S: Storage> Game<B, S> {
    pub fn new(backend: B, storage: S, seed: u64) -> Self {
        Self::with_tuning(backend, storage, seed, Tuning::default())
    }

    pub fn with_tuning(backend: B, storage: S, seed: u64, tuning: Tuning) -> Self {
        let settings = Settings::load_from(&storage);
        let best = BestScore::load_from(&storage);
        let clock = FrameClock::new(tuning.max_delta);
        let audio = AudioMixer::new(backend, &settings);
        Self {
            state: GameState::with_tuning(seed, best.value(), tuning),
            input: InputState::default(),
            clock,
            settings,
            best,
            audio,
            storage,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioMixer<B> {
        &self.audio
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.state)
    }

    /// Apply a discrete intent immediately
    pub fn handle_intent(&mut self, intent: Intent) {
        let mut events = Vec::new();
        match intent {
            Intent::Start => {
                self.audio.unlock();
                lifecycle::start_run(&mut self.state, &mut events);
            }
            Intent::TogglePause => {
                lifecycle::toggle_pause(&mut self.state, &mut events);
            }
            Intent::Pause => {
                lifecycle::set_paused(&mut self.state, true, &mut events);
            }
            Intent::Resume => {
                lifecycle::set_paused(&mut self.state, false, &mut events);
            }
            Intent::ToggleSfxMute => {
                self.settings.sfx_muted = !self.settings.sfx_muted;
                self.audio.set_sfx_muted(self.settings.sfx_muted);
                self.save_settings();
            }
            Intent::ToggleMusicMute => {
                self.settings.music_muted = !self.settings.music_muted;
                self.audio.set_music_muted(self.settings.music_muted);
                self.save_settings();
            }
            Intent::FocusLost => {
                self.input.clear();
                if self.settings.pause_on_blur {
                    lifecycle::set_paused(&mut self.state, true, &mut events);
                }
            }
        }
        self.dispatch(&events);
    }

    /// Held steering from any source
    pub fn set_held(&mut self, source: InputSource, direction: Direction, held: bool) {
        self.input.set(source, direction, held);
    }

    /// Keyboard press by `KeyboardEvent.code`. Returns true when the key is bound.
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(action) = key_action(code) else {
            return false;
        };
        self.audio.unlock();
        match action {
            KeyAction::Steer(direction) => self.set_held(InputSource::Keyboard, direction, true),
            KeyAction::TogglePause => self.handle_intent(Intent::TogglePause),
            KeyAction::ToggleSfx => self.handle_intent(Intent::ToggleSfxMute),
            KeyAction::ToggleMusic => self.handle_intent(Intent::ToggleMusicMute),
            KeyAction::Start => {
                if !self.state.phase.is_running() {
                    self.handle_intent(Intent::Start);
                }
            }
        }
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        match key_action(code) {
            Some(KeyAction::Steer(direction)) => {
                self.set_held(InputSource::Keyboard, direction, false);
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// One display refresh: advance the simulation by the wall-clock delta,
    /// route its events and return what to draw
    pub fn frame(&mut self, now_ms: f64) -> RenderSnapshot {
        let delta = self.clock.delta(now_ms);
        let events = tick(&mut self.state, &self.input.to_tick_input(), delta);
        self.dispatch(&events);
        self.snapshot()
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            self.audio.handle(event);
            match event {
                GameEvent::Paused => self.input.clear(),
                GameEvent::Resumed | GameEvent::RunStarted => self.clock.reset(),
                GameEvent::RunEnded {
                    final_score,
                    new_best,
                    ..
                } => {
                    if *new_best && self.best.record(*final_score) {
                        if let Err(e) = self.best.save_to(&mut self.storage) {
                            log::warn!("Could not save best score: {}", e);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save_to(&mut self.storage) {
            log::warn!("Could not save settings: {}", e);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == RunPhase::Paused
    }
}
