//! JavaScript-facing game handle
//!
//! The page owns the canvas, the DOM overlays and `requestAnimationFrame`; it
//! forwards pointer input and timestamps here and pulls snapshots and events
//! back out as JSON.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::audio::WebAudio;
use crate::config::{DifficultyMode, GameConfig};
use crate::host::{self, EventOutbox, RenderSnapshot};
use crate::sim::{GameState, QuestionPool};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Fruit Quiz starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    audio: WebAudio,
    /// Events already played, waiting for the page to collect them
    outbox: EventOutbox,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a game from optional JSON config and question bank.
    ///
    /// Without a config the seed comes from the clock; without a bank the
    /// built-in questions are used.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, questions_json: Option<String>) -> Result<WebGame, JsError> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json)?,
            None => GameConfig {
                seed: js_sys::Date::now() as u64,
                ..GameConfig::default()
            },
        };
        let bank = match questions_json {
            Some(json) => QuestionPool::from_json(&json)?,
            None => QuestionPool::builtin()?,
        };
        log::info!(
            "Game initialized with seed {} ({} questions)",
            config.seed,
            bank.len()
        );
        Ok(WebGame {
            state: GameState::new(config, Box::new(bank)),
            audio: WebAudio::new(),
            outbox: EventOutbox::default(),
        })
    }

    /// Advance one animation frame and play any resulting sounds
    pub fn frame(&mut self, now_ms: f64) {
        self.state.frame(now_ms);
        self.flush();
    }

    pub fn pointer_down(&mut self, x: f32, y: f32, at_ms: f64) {
        self.audio.resume();
        self.state.pointer_down(Vec2::new(x, y), at_ms);
    }

    /// Returns the points scored by this move
    pub fn pointer_move(&mut self, x: f32, y: f32, at_ms: f64) -> u32 {
        let outcome = self.state.pointer_move(Vec2::new(x, y), at_ms);
        self.flush();
        outcome.points as u32
    }

    pub fn pointer_up(&mut self) {
        self.state.pointer_up();
    }

    pub fn toggle_pause(&mut self) -> bool {
        let toggled = self.state.toggle_pause();
        self.flush();
        toggled
    }

    pub fn reset(&mut self) {
        self.audio.resume();
        self.state.reset();
        self.outbox.clear();
        self.flush();
    }

    pub fn quit(&mut self) -> bool {
        let quit = self.state.quit();
        self.flush();
        quit
    }

    /// Pick a quiz option; `undefined` if no question is waiting for one
    pub fn answer(&mut self, option: usize) -> Option<bool> {
        let correct = self.state.answer(option);
        self.flush();
        correct
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(width, height);
    }

    /// Change difficulty between runs. Unknown names fall back to easy.
    pub fn set_mode(&mut self, name: &str) -> bool {
        let mode = DifficultyMode::from_str(name).unwrap_or_default();
        self.state.set_mode(mode)
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    /// Master volume in 0.0 - 1.0
    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_master_volume(volume);
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.state.phase)
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(RenderSnapshot::capture(&self.state).to_json()?)
    }

    /// Drain events for the page's overlays and HUD.
    ///
    /// Only the most recent events are kept between calls, so poll this every
    /// frame.
    pub fn take_events_json(&mut self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.outbox.drain())?)
    }
}

impl WebGame {
    fn flush(&mut self) {
        let events = host::dispatch(&mut self.state, Some(&mut self.audio), None);
        self.outbox.extend(events);
    }
}
