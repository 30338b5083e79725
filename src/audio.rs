//! Audio
//!
//! The simulation only emits events. `AudioMixer` turns them into sound
//! triggers and music start/stop requests, applies the mute flags and hands the
//! rest to an `AudioBackend`. Playback is fire-and-forget: backend failures are
//! logged and dropped.
//!
//! On wasm32 `WebAudioBackend` synthesises the effects procedurally (no
//! external files) and streams the music track through an `<audio>` element.

use thiserror::Error;

use crate::settings::Settings;
use crate::sim::GameEvent;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output is unavailable")]
    Unavailable,
    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Bounce off a platform; the variant rotates per landing
    Landing(u8),
    /// Monster stomped
    MonsterDefeat,
    /// Run-ending monster collision
    MonsterHit,
    /// Power-up collected
    PickupCollect,
}

impl SoundEffect {
    /// The one-shot sound an event triggers, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Landed { variant, .. } => Some(SoundEffect::Landing(*variant)),
            GameEvent::MonsterStomped { .. } => Some(SoundEffect::MonsterDefeat),
            GameEvent::MonsterHit { .. } => Some(SoundEffect::MonsterHit),
            GameEvent::PickupCollected { .. } => Some(SoundEffect::PickupCollect),
            _ => None,
        }
    }
}

/// Whatever actually makes noise
pub trait AudioBackend {
    fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
    /// Flip the muted flag on every pooled effect voice
    fn set_effects_muted(&mut self, muted: bool);
    fn play_music(&mut self, volume: f32) -> Result<(), AudioError>;
    fn pause_music(&mut self);
    fn set_music_muted(&mut self, muted: bool);
    /// Browsers keep audio suspended until a user gesture
    fn unlock(&mut self) {}
}

/// Silent backend for native builds and headless runs
#[derive(Debug, Default)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play_effect(&mut self, _effect: SoundEffect, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
    fn set_effects_muted(&mut self, _muted: bool) {}
    fn play_music(&mut self, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
    fn pause_music(&mut self) {}
    fn set_music_muted(&mut self, _muted: bool) {}
}

/// Routes game events to a backend
pub struct AudioMixer<B: AudioBackend> {
    backend: B,
    sfx_muted: bool,
    music_muted: bool,
    sfx_volume: f32,
    music_volume: f32,
    /// A run is live and unpaused, so music should be audible
    music_wanted: bool,
}

impl<B: AudioBackend> AudioMixer<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        let mut mixer = Self {
            backend,
            sfx_muted: false,
            music_muted: false,
            sfx_volume: 0.0,
            music_volume: 0.0,
            music_wanted: false,
        };
        mixer.apply_settings(settings);
        mixer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sfx_muted(&self) -> bool {
        self.sfx_muted
    }

    pub fn music_muted(&self) -> bool {
        self.music_muted
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.sfx_gain();
        self.music_volume = settings.music_gain();
        self.set_sfx_muted(settings.sfx_muted);
        self.set_music_muted(settings.music_muted);
    }

    pub fn unlock(&mut self) {
        self.backend.unlock();
    }

    pub fn set_sfx_muted(&mut self, muted: bool) {
        self.sfx_muted = muted;
        self.backend.set_effects_muted(muted);
    }

    pub fn set_music_muted(&mut self, muted: bool) {
        self.music_muted = muted;
        self.backend.set_music_muted(muted);
        if muted {
            self.backend.pause_music();
        } else if self.music_wanted {
            self.start_music();
        }
    }

    /// Play a one-shot unless effects are muted
    pub fn play(&mut self, effect: SoundEffect) {
        if self.sfx_muted || self.sfx_volume <= 0.0 {
            return;
        }
        if let Err(e) = self.backend.play_effect(effect, self.sfx_volume) {
            log::debug!("Dropped {:?}: {}", effect, e);
        }
    }

    fn start_music(&mut self) {
        if self.music_muted {
            return;
        }
        if let Err(e) = self.backend.play_music(self.music_volume) {
            log::debug!("Music did not start: {}", e);
        }
    }

    /// React to one simulation event
    pub fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RunStarted | GameEvent::Resumed => {
                self.music_wanted = true;
                self.start_music();
            }
            GameEvent::Paused => {
                self.music_wanted = false;
                self.backend.pause_music();
            }
            _ => {}
        }
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioBackend;

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{AudioContext, GainNode, HtmlAudioElement, OscillatorNode, OscillatorType};

    use super::{AudioBackend, AudioError, SoundEffect};
    use crate::consts::LANDING_VARIANTS;

    /// Overlapping effects share a small round-robin pool of output voices
    const VOICE_COUNT: usize = 6;

    /// Base pitch per landing variant (a pentatonic-ish ladder)
    const LANDING_PITCHES: [f32; LANDING_VARIANTS as usize] =
        [392.0, 440.0, 494.0, 523.0, 587.0, 659.0];

    /// Await a playback promise in the background, logging a rejection
    fn settle(promise: js_sys::Promise, what: &'static str) {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::debug!("{} rejected: {:?}", what, e);
            }
        });
    }

    struct Voice {
        gain: GainNode,
        muted: bool,
    }

    pub struct WebAudioBackend {
        ctx: Option<AudioContext>,
        voices: Vec<Voice>,
        next_voice: usize,
        music: Option<HtmlAudioElement>,
    }

    impl WebAudioBackend {
        /// `music_src` is the URL of a looping background track, if any
        pub fn new(music_src: Option<&str>) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - effects disabled");
            }

            let voices = ctx
                .as_ref()
                .map(|ctx| {
                    (0..VOICE_COUNT)
                        .filter_map(|_| {
                            let gain = ctx.create_gain().ok()?;
                            gain.connect_with_audio_node(&ctx.destination()).ok()?;
                            Some(Voice { gain, muted: false })
                        })
                        .collect()
                })
                .unwrap_or_default();

            let music = music_src.and_then(|src| match HtmlAudioElement::new_with_src(src) {
                Ok(el) => {
                    el.set_loop(true);
                    Some(el)
                }
                Err(e) => {
                    log::warn!("Failed to create music element: {:?}", e);
                    None
                }
            });

            Self {
                ctx,
                voices,
                next_voice: 0,
                music,
            }
        }

        fn next_voice(&mut self) -> Option<&Voice> {
            if self.voices.is_empty() {
                return None;
            }
            let i = self.next_voice % self.voices.len();
            self.next_voice = (i + 1) % self.voices.len();
            self.voices.get(i)
        }

        /// Create an oscillator with its own envelope gain, routed into `out`
        fn create_osc(
            ctx: &AudioContext,
            out: &GainNode,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(out).ok()?;

            Some((osc, gain))
        }

        /// Landing - short upward chirp, pitch picked by variant
        fn play_landing(ctx: &AudioContext, out: &GainNode, variant: u8, vol: f32) {
            let base = LANDING_PITCHES[usize::from(variant) % LANDING_PITCHES.len()];
            let Some((osc, gain)) = Self::create_osc(ctx, out, base, OscillatorType::Triangle)
            else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(base, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(base * 1.6, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Stomp - squashy thump plus a bright pop
        fn play_defeat(ctx: &AudioContext, out: &GainNode, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = Self::create_osc(ctx, out, 220.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.18)
                    .ok();
                osc.frequency().set_value_at_time(220.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(70.0, t + 0.15)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.2).ok();
            }

            if let Some((osc, gain)) = Self::create_osc(ctx, out, 900.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.1).ok();
            }
        }

        /// Hit - harsh descending buzz
        fn play_hit(ctx: &AudioContext, out: &GainNode, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, out, 300.0, OscillatorType::Sawtooth)
            else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.45, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.6)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }

        /// Pickup - happy ding
        fn play_pickup(ctx: &AudioContext, out: &GainNode, vol: f32) {
            for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
                let delay = i as f64 * 0.08;
                if let Some((osc, gain)) = Self::create_osc(ctx, out, *freq, OscillatorType::Sine)
                {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }
    }

    impl AudioBackend for WebAudioBackend {
        fn play_effect(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            let ctx = self.ctx.clone().ok_or(AudioError::Unavailable)?;
            let voice = self.next_voice().ok_or(AudioError::Unavailable)?;
            if voice.muted {
                return Ok(());
            }
            let out = voice.gain.clone();

            match effect {
                SoundEffect::Landing(variant) => Self::play_landing(&ctx, &out, variant, volume),
                SoundEffect::MonsterDefeat => Self::play_defeat(&ctx, &out, volume),
                SoundEffect::MonsterHit => Self::play_hit(&ctx, &out, volume),
                SoundEffect::PickupCollect => Self::play_pickup(&ctx, &out, volume),
            }
            Ok(())
        }

        fn set_effects_muted(&mut self, muted: bool) {
            for voice in &mut self.voices {
                voice.muted = muted;
                voice.gain.gain().set_value(if muted { 0.0 } else { 1.0 });
            }
        }

        fn play_music(&mut self, volume: f32) -> Result<(), AudioError> {
            let music = self.music.as_ref().ok_or(AudioError::Unavailable)?;
            music.set_volume(f64::from(volume.clamp(0.0, 1.0)));
            let promise = music
                .play()
                .map_err(|e| AudioError::Rejected(format!("{:?}", e)))?;
            // Autoplay policy may reject later; nothing to retry
            settle(promise, "Music playback");
            Ok(())
        }

        fn pause_music(&mut self) {
            if let Some(music) = &self.music {
                music.pause().ok();
            }
        }

        fn set_music_muted(&mut self, muted: bool) {
            if let Some(music) = &self.music {
                music.set_muted(muted);
            }
        }

        fn unlock(&mut self) {
            if let Some(ctx) = &self.ctx {
                if ctx.state() == web_sys::AudioContextState::Suspended {
                    match ctx.resume() {
                        Ok(promise) => settle(promise, "Audio resume"),
                        Err(e) => log::debug!("Audio resume failed: {:?}", e),
                    }
                }
            }
        }
    }
}
