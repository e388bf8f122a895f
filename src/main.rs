//! Fruit Quiz headless runner
//!
//! Plays one seeded run with a simple bot and prints the final report. The
//! browser build is driven from JavaScript through `fruit_quiz::web` instead.
//!
//! Usage: `fruit-quiz [easy|medium|hard|un] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use std::error::Error;

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use glam::Vec2;
    use rand::Rng;
    use rand_pcg::Pcg32;

    use fruit_quiz::host::{Hud, QuizView, UiHooks};
    use fruit_quiz::sim::{EntityKind, GamePhase, GameState, RunReport, slice_hits};

    /// Chance per frame that the bot reacts to a visible target
    const REACTION: f64 = 0.08;
    /// Chance the bot ignores bombs near its swipe
    const CARELESSNESS: f64 = 0.03;
    const QUIZ_ACCURACY: f64 = 0.6;

    /// Logs UI transitions instead of drawing them
    #[derive(Default)]
    pub struct LogUi {
        last_hud: Option<Hud>,
        pub report: Option<RunReport>,
    }

    impl UiHooks for LogUi {
        fn update_hud(&mut self, hud: &Hud) {
            if self.last_hud.is_some_and(|h| h.lives != hud.lives) {
                log::info!("Lives {}", hud.hearts());
            }
            log::debug!(
                "score={} combo={} level={}",
                hud.score,
                hud.combo,
                hud.level
            );
            self.last_hud = Some(*hud);
        }

        fn show_quiz(&mut self, quiz: &QuizView<'_>) {
            match quiz.correct.and_then(|i| quiz.options.get(i)) {
                None => log::info!("[{}] {} {:?}", quiz.title, quiz.prompt, quiz.options),
                Some(answer) => log::info!("Answer: {}", answer),
            }
        }

        fn show_game_over(&mut self, report: &RunReport) {
            self.report = Some(*report);
        }
    }

    /// Swipe through one visible fruit or power-up, steering clear of bombs
    pub fn swipe(state: &mut GameState, rng: &mut Pcg32, now_ms: f64) {
        let field = state.field;
        let target = state
            .entities
            .iter()
            .filter(|e| e.is_sliceable() && e.kind != EntityKind::Bomb)
            .filter(|e| e.pos.y > 0.0 && e.pos.y < field.y)
            .find(|_| rng.random_bool(REACTION))
            .map(|e| (e.pos, e.radius));
        let Some((pos, radius)) = target else {
            return;
        };

        let careless = rng.random_bool(CARELESSNESS);
        let reach = radius * 1.5;
        let candidates = [
            (pos - Vec2::new(reach, 0.0), pos + Vec2::new(reach, 0.0)),
            (pos - Vec2::new(0.0, reach), pos + Vec2::new(0.0, reach)),
        ];
        let safe = candidates.into_iter().find(|&(p1, p2)| {
            careless
                || !state
                    .entities
                    .iter()
                    .any(|e| e.kind == EntityKind::Bomb && slice_hits(p1, p2, e.pos, e.radius))
        });

        if let Some((p1, p2)) = safe {
            state.pointer_down(p1, now_ms);
            state.pointer_move(p2, now_ms);
            state.pointer_up();
        }
    }

    /// Pick a quiz option once the question is up
    pub fn answer(state: &mut GameState, rng: &mut Pcg32) {
        let Some(pending) = state.interrupt.as_ref() else {
            return;
        };
        if pending.answer.is_some() {
            return;
        }
        let pick = if rng.random_bool(QUIZ_ACCURACY) {
            pending.correct_index
        } else {
            (pending.correct_index + 1) % pending.options.len()
        };
        state.answer(pick);
    }

    pub fn is_finished(state: &GameState) -> bool {
        state.phase == GamePhase::GameOver
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn Error>> {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use fruit_quiz::host;
    use fruit_quiz::sim::{GamePhase, GameState, QuestionPool};
    use fruit_quiz::{DifficultyMode, GameConfig};

    const FRAME_MS: f64 = 16.0;
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode = match args.next() {
        Some(name) => DifficultyMode::from_str(&name).unwrap_or_else(|| {
            log::warn!("Unknown mode '{}', using easy", name);
            DifficultyMode::Easy
        }),
        None => DifficultyMode::Easy,
    };
    let seed = match args.next() {
        Some(s) => s.parse()?,
        None => GameConfig::default().seed,
    };

    let config = GameConfig::with_mode(mode, seed);
    config.validate()?;
    let bank = QuestionPool::builtin()?;
    log::info!("Fruit Quiz (native) starting: mode={}, seed={}", mode.as_str(), seed);

    let mut state = GameState::new(config, Box::new(bank));
    let mut bot = Pcg32::seed_from_u64(seed.wrapping_add(1));
    let mut ui = autoplay::LogUi::default();
    state.reset();

    let mut now = 0.0;
    for _ in 0..MAX_FRAMES {
        state.frame(now);
        match state.phase {
            GamePhase::Running => autoplay::swipe(&mut state, &mut bot, now),
            GamePhase::QuizInterrupt => autoplay::answer(&mut state, &mut bot),
            _ => {}
        }
        host::dispatch(&mut state, None, Some(&mut ui));
        if autoplay::is_finished(&state) {
            break;
        }
        now += FRAME_MS;
    }

    let report = ui.report.unwrap_or_else(|| state.report());
    if !autoplay::is_finished(&state) {
        log::info!("Time limit reached after {:.0}s", state.sim_time_ms / 1000.0);
    }
    println!(
        "mode={} score={} max_combo={} level={}",
        report.mode.as_str(),
        report.final_score,
        report.max_combo,
        report.level
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is fruit_quiz::web::start, this is just to satisfy the compiler
}
