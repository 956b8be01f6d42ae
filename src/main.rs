/// Entry point and frame loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::clock::{Clock, Millis, SystemClock};
use error::GameError;
use sim::event::GameEvent;
use sim::input;
use sim::save::{self, BestScoreStore, FileStore};
use sim::step;
use sim::world::GameState;
use ui::fireworks::Fireworks;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const LOG_FILE: &str = "reefcount.log";

fn main() {
    let data_dir = save::data_dir();
    init_logging(&data_dir);

    let config = GameConfig::load();
    let mut store = FileStore::in_data_dir();
    tracing::info!(path = %store.path().display(), "best score file");

    let rng = match config.seed {
        Some(seed) => {
            tracing::info!(seed, "seeded game");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let clock = SystemClock::new();
    let mut game = GameState::new(
        config.round.clone(),
        store.load_best_score(),
        rng,
        clock.now(),
    );

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut game, &mut store, &mut renderer, sound.as_ref(), &clock, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        tracing::error!("{e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Reef Count!");
    println!("Final Score: {}", game.ledger.total_score);
    println!("Best Score:  {}", game.ledger.best_score);
}

/// Log to a file in `dir`; the terminal belongs to the renderer.
/// `RUST_LOG` overrides the default `info` level.
fn init_logging(dir: &Path) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let path = dir.join(LOG_FILE);
    match File::create(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file))
                .try_init()
                .ok();
        }
        Err(e) => eprintln!("File logging disabled ({}): {e}", path.display()),
    }
}

fn game_loop(
    game: &mut GameState,
    store: &mut dyn BestScoreStore,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    clock: &dyn Clock,
    config: &GameConfig,
) -> Result<(), GameError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut fireworks = Fireworks::new();
    // Separate stream: effects never draw from the game rng.
    let mut fx_rng = StdRng::from_entropy();
    let frame_sleep = Duration::from_millis(config.frame_sleep_ms);

    loop {
        kb.drain_events(renderer.size());
        gp.update();

        if kb.quit_requested() || gp.quit_pressed() {
            tracing::info!(score = game.ledger.total_score, "quit");
            break;
        }
        for ev in gp.events() {
            kb.push(ev);
        }

        let now = clock.now();

        // Timeout check first: a round that ran out this frame is lost
        // even if the answer arrives in the same frame.
        let mut events = step::tick(game, store, now);
        for ev in kb.events() {
            events.extend(input::handle(game, ev, now));
        }

        process_events(&events, sound, &mut fireworks, &mut fx_rng, now);
        fireworks.update(now);

        renderer.render(&game.snapshot(now), &fireworks, now)?;
        std::thread::sleep(frame_sleep);
    }

    Ok(())
}

fn process_events(
    events: &[GameEvent],
    sound: Option<&SoundEngine>,
    fireworks: &mut Fireworks,
    rng: &mut StdRng,
    now: Millis,
) {
    for event in events {
        match event {
            GameEvent::RoundStarted { .. } => fireworks.clear(),
            GameEvent::Bonus { .. } => fireworks.spawn(rng, now),
            _ => {}
        }
        if let Some(sfx) = sound {
            sfx.play_event(event);
        }
    }
}
