//! Doodle Hop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

    use doodle_hop::audio::WebAudioBackend;
    use doodle_hop::persistence::LocalStorage;
    use doodle_hop::platform::{Direction, InputSource};
    use doodle_hop::sim::{MonsterKind, PlatformKind, PowerUpKind, RenderSnapshot};
    use doodle_hop::{Game, Intent};

    type WebGame = Game<WebAudioBackend, LocalStorage>;

    const MUSIC_SRC: &str = "/music/untitled.wav";

    /// Page elements the loop writes to
    struct Hud {
        score: Option<HtmlElement>,
        best: Option<HtmlElement>,
        final_score: Option<HtmlElement>,
        overlay: Option<HtmlElement>,
        start_overlay: Option<HtmlElement>,
        pause_overlay: Option<HtmlElement>,
        pause_button: Option<HtmlElement>,
        mute_button: Option<HtmlElement>,
        music_button: Option<HtmlElement>,
    }

    impl Hud {
        fn new(document: &Document) -> Self {
            Self {
                score: select(document, "[data-score]"),
                best: select(document, "[data-best]"),
                final_score: select(document, "[data-final-score]"),
                overlay: select(document, "[data-overlay]"),
                start_overlay: select(document, "[data-start-overlay]"),
                pause_overlay: select(document, "[data-pause-overlay]"),
                pause_button: select(document, "[data-pause]"),
                mute_button: select(document, "[data-mute]"),
                music_button: select(document, "[data-music]"),
            }
        }

        fn update(&self, snap: &RenderSnapshot, sfx_muted: bool, music_muted: bool) {
            set_text(&self.score, &snap.score.to_string());
            set_text(&self.best, &snap.best.max(snap.score).to_string());
            if let Some(score) = snap.final_score {
                set_text(&self.final_score, &score.to_string());
            }
            set_hidden(&self.overlay, snap.final_score.is_none() || snap.running);
            set_hidden(
                &self.start_overlay,
                snap.running || snap.final_score.is_some(),
            );
            set_hidden(&self.pause_overlay, !snap.paused);
            set_text(&self.pause_button, if snap.paused { "Resume" } else { "Pause" });
            set_text(&self.mute_button, if sfx_muted { "Sound On" } else { "Mute" });
            set_text(
                &self.music_button,
                if music_muted { "Music On" } else { "Music Off" },
            );
        }
    }

    fn select(document: &Document, selector: &str) -> Option<HtmlElement> {
        let el = document.query_selector(selector).ok().flatten();
        if el.is_none() {
            log::debug!("No element for {}", selector);
        }
        el.and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn set_text(el: &Option<HtmlElement>, text: &str) {
        if let Some(el) = el {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_hidden(el: &Option<HtmlElement>, hidden: bool) {
        if let Some(el) = el {
            el.set_hidden(hidden);
        }
    }

    struct App {
        game: WebGame,
        ctx: CanvasRenderingContext2d,
        hud: Hud,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let snap = self.game.frame(time);
            draw(&self.ctx, &snap);
            let audio = self.game.audio();
            self.hud
                .update(&snap, audio.sfx_muted(), audio.music_muted());
        }
    }

    fn platform_color(kind: PlatformKind) -> &'static str {
        match kind {
            PlatformKind::Static => "#4caf50",
            PlatformKind::Moving => "#2196f3",
            PlatformKind::Dead => "#8d6e63",
            PlatformKind::Breakable => "#ff9800",
        }
    }

    fn draw(ctx: &CanvasRenderingContext2d, snap: &RenderSnapshot) {
        let (w, h) = (f64::from(snap.world_width), f64::from(snap.world_height));
        ctx.clear_rect(0.0, 0.0, w, h);
        ctx.set_fill_style_str("#fff7d6");
        ctx.fill_rect(0.0, 0.0, w, h);

        for p in &snap.platforms {
            ctx.set_global_alpha(f64::from(1.0 - p.break_progress));
            ctx.set_fill_style_str(platform_color(p.kind));
            ctx.fill_rect(
                f64::from(p.x),
                f64::from(p.y),
                f64::from(p.width),
                f64::from(p.height),
            );
            ctx.set_fill_style_str("#fff7d6");
            ctx.fill_rect(f64::from(p.x), f64::from(p.y), 6.0, f64::from(p.height));
        }
        ctx.set_global_alpha(1.0);

        for pickup in &snap.pickups {
            let r = f64::from(pickup.size) / 2.0;
            let grow = f64::from(pickup.pulse_scale());
            ctx.set_fill_style_str(match pickup.kind {
                PowerUpKind::Rocket => "#e53935",
                PowerUpKind::Glider => "#7e57c2",
            });
            ctx.begin_path();
            ctx.arc(
                f64::from(pickup.x) + r,
                f64::from(pickup.y) + r,
                r * grow,
                0.0,
                std::f64::consts::TAU,
            )
            .ok();
            ctx.fill();
        }

        for m in &snap.monsters {
            ctx.set_fill_style_str(match m.kind {
                MonsterKind::Walker => "#6a1b9a",
                MonsterKind::Sprinter => "#c62828",
            });
            ctx.fill_rect(
                f64::from(m.x),
                f64::from(m.y),
                f64::from(m.width),
                f64::from(m.height),
            );
            // Eye on the walking side
            let eye_x = if m.facing > 0.0 { m.x + m.width - 10.0 } else { m.x + 4.0 };
            ctx.set_fill_style_str("#ffffff");
            ctx.fill_rect(f64::from(eye_x), f64::from(m.y) + 6.0, 6.0, 6.0);
        }

        let p = &snap.player;
        ctx.save();
        ctx.set_global_alpha(f64::from(p.opacity.clamp(0.0, 1.0)));
        ctx.translate(
            f64::from(p.x + p.width / 2.0),
            f64::from(p.y + p.height / 2.0),
        )
        .ok();
        ctx.rotate(f64::from(p.rotation)).ok();
        ctx.scale(if p.facing < 0.0 { -1.0 } else { 1.0 }, 1.0).ok();
        ctx.set_fill_style_str(match p.power_up {
            Some(PowerUpKind::Rocket) => "#ff7043",
            Some(PowerUpKind::Glider) => "#9575cd",
            None => "#ffcb05",
        });
        let (pw, ph) = (f64::from(p.width), f64::from(p.height));
        ctx.fill_rect(-pw / 2.0, -ph / 2.0, pw, ph);
        ctx.set_fill_style_str("#222222");
        ctx.fill_rect(pw / 2.0 - 14.0, -ph / 2.0 + 10.0, 6.0, 6.0);
        ctx.restore();

        if p.power_up.is_some() {
            ctx.set_fill_style_str("#333333");
            ctx.fill_rect(8.0, 8.0, 80.0 * f64::from(p.power_up_left), 5.0);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {e}").into());
        }

        log::info!("Doodle Hop starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .query_selector("#game")?
            .ok_or("no #game canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(
            WebAudioBackend::new(Some(MUSIC_SRC)),
            LocalStorage::new(),
            seed,
        );
        let snap = game.snapshot();
        canvas.set_width(snap.world_width as u32);
        canvas.set_height(snap.world_height as u32);

        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            ctx,
            hud: Hud::new(&document),
        }));

        setup_keyboard(&window, app.clone())?;
        setup_touch(&document, app.clone())?;
        setup_buttons(&document, app.clone())?;
        setup_auto_pause(&window, &document, app.clone())?;

        request_animation_frame(app);

        log::info!("Doodle Hop running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if app.borrow_mut().game.key_down(&event.code()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            app.borrow_mut().game.key_up(&event.code());
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// On-screen left/right pads, held while touched
    fn setup_touch(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        for (selector, direction) in [
            ("[data-touch-left]", Direction::Left),
            ("[data-touch-right]", Direction::Right),
        ] {
            let Some(pad) = select(document, selector) else {
                continue;
            };
            for (name, held) in [
                ("touchstart", true),
                ("touchend", false),
                ("touchcancel", false),
            ] {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                    event.prevent_default();
                    app.borrow_mut()
                        .game
                        .set_held(InputSource::Touch, direction, held);
                });
                pad.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
                closure.forget();
            }
        }
        Ok(())
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        for (selector, intent) in [
            ("[data-start]", Intent::Start),
            ("[data-restart]", Intent::Start),
            ("[data-pause]", Intent::TogglePause),
            ("[data-resume]", Intent::Resume),
            ("[data-mute]", Intent::ToggleSfxMute),
            ("[data-music]", Intent::ToggleMusicMute),
        ] {
            let Some(btn) = select(document, selector) else {
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().game.handle_intent(intent);
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &Document,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    app.borrow_mut().game.handle_intent(Intent::FocusLost);
                    log::info!("Tab hidden");
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            app.borrow_mut().game.handle_intent(Intent::FocusLost);
            log::info!("Window blurred");
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Doodle Hop (native) starting...");
    log::info!("The playable build is the web version; running a headless demo run");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD00D1E);
    autopilot::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: steer toward the nearest platform above and report the score
#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use doodle_hop::audio::NullBackend;
    use doodle_hop::consts::FRAME_MS;
    use doodle_hop::persistence::MemoryStorage;
    use doodle_hop::platform::{Direction, InputSource};
    use doodle_hop::sim::{GameState, PlatformKind, RunPhase};
    use doodle_hop::{Game, Intent};

    /// Ten simulated minutes at 60 fps
    const MAX_FRAMES: usize = 60 * 60 * 10;

    fn steer(state: &GameState) -> Option<Direction> {
        let player = &state.player.rect;
        let feet = player.bottom();
        let center = player.pos.x + player.size.x / 2.0;
        let target = state
            .registry
            .platforms()
            .filter(|p| p.kind != PlatformKind::Dead && p.is_landable())
            .filter(|p| p.rect.top() > feet - state.tuning.max_reach() && p.rect.top() < feet)
            .max_by(|a, b| a.rect.top().total_cmp(&b.rect.top()))?;
        let goal = target.rect.pos.x + target.rect.size.x / 2.0;
        if (goal - center).abs() < 6.0 {
            None
        } else if goal < center {
            Some(Direction::Left)
        } else {
            Some(Direction::Right)
        }
    }

    pub fn run(seed: u64) {
        let mut game = Game::new(NullBackend, MemoryStorage::new(), seed);
        game.handle_intent(Intent::Start);

        for frame in 0..MAX_FRAMES {
            let wanted = steer(game.state());
            game.set_held(
                InputSource::Keyboard,
                Direction::Left,
                wanted == Some(Direction::Left),
            );
            game.set_held(
                InputSource::Keyboard,
                Direction::Right,
                wanted == Some(Direction::Right),
            );

            let snap = game.frame(frame as f64 * FRAME_MS);
            if frame % 600 == 0 {
                log::info!(
                    "t={}s score={} platforms={} monsters={}",
                    frame / 60,
                    snap.score,
                    snap.platforms.len(),
                    snap.monsters.len()
                );
            }
            if game.state().phase == RunPhase::Ended {
                break;
            }
        }

        let snap = game.snapshot();
        println!(
            "seed {}: final score {} (best {})",
            seed,
            snap.final_score.unwrap_or(snap.score),
            snap.best
        );
    }
}
