//! Terminal Tetris runner (default binary).
//!
//! Environment:
//! - `TETRIS_*` game settings, see `GameConfig::from_env`
//! - `TETRIS_KEYMAP_PATH`: JSON key-binding file (defaults when missing)
//! - `TETRIS_LOG_PATH`: append debug logs to this file; no logging when unset

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{debug, info};

use cascade_tetris::core::{BoardEvent, Game, GameConfig};
use cascade_tetris::input::{handle_key_event, should_quit, KeyBindings};
use cascade_tetris::term::{BoardView, TerminalRenderer, Viewport};
use cascade_tetris::types::TICK_MS;

fn main() -> Result<()> {
    init_logging()?;

    let config = GameConfig::from_env();
    let bindings = match env_path("TETRIS_KEYMAP_PATH") {
        Some(path) => KeyBindings::load(&path)?,
        None => KeyBindings::default(),
    };
    info!(?config, "starting");

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, config, &bindings);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn init_logging() -> Result<()> {
    let Some(path) = env_path("TETRIS_LOG_PATH") else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| anyhow!("open log file {}: {}", path.display(), e))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, config: GameConfig, bindings: &KeyBindings) -> Result<()> {
    let mut game = Game::new(config);
    game.start();

    let view = BoardView::new();
    let tick_duration = Duration::from_millis(u64::from(TICK_MS));
    let mut last_tick = Instant::now();
    let mut level = game.level();

    loop {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        term.draw(&view.render(&game, Viewport::new(w, h)))?;

        // Input with timeout until next tick.
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    if should_quit(key) {
                        info!(score = game.score(), "quit");
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key, bindings) {
                        game.apply_action(action);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        let elapsed = last_tick.elapsed();
        if elapsed >= tick_duration {
            last_tick = Instant::now();
            game.update(elapsed.as_millis().min(u128::from(u32::MAX)) as u32);
        }

        for event in game.drain_events() {
            debug!(event = event.name(), "board event");
            if event == BoardEvent::GameOver {
                info!(score = game.score(), lines = game.lines(), "game over");
            }
        }
        if game.level() != level {
            level = game.level();
            debug!(level, interval_ms = game.drop_interval_ms(), "drop speed changed");
        }
    }
}
