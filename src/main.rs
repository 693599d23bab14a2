/// Entry point and frame loop.
///
/// The binary draws nothing. It samples the keyboard, advances the world once
/// per tick and reports game events through the log (`RUST_LOG=debug` shows
/// every patrol reversal). A game-over restarts the level.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::event::{
    KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};

use tilepatrol::config::GameConfig;
use tilepatrol::sim::clock::{FrameTimer, MonotonicClock};
use tilepatrol::sim::event::GameEvent;
use tilepatrol::sim::level::{load_level, resolve_level, restart_level, LevelDef};
use tilepatrol::sim::step;
use tilepatrol::sim::world::WorldState;
use tilepatrol::ui::input::InputState;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];

fn main() {
    env_logger::init();

    let config = GameConfig::load();

    let level = match resolve_level(&config) {
        Ok(level) => level,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let mut world = match load_level(&level, &config) {
        Ok(world) => world,
        Err(e) => {
            log::error!("level {:?}: {e}", level.name);
            std::process::exit(1);
        }
    };

    let mut input = InputState::new(&config.keys);
    let enhanced = match init_terminal() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            log::error!("terminal init failed: {e}");
            std::process::exit(1);
        }
    };
    input.honor_release = enhanced;

    let result = game_loop(&mut world, &mut input, &level, &config);

    if let Err(e) = cleanup_terminal(enhanced) {
        log::error!("terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }

    println!("Left {:?} after {} frames.", world.level_name, world.tick);
}

fn game_loop(
    world: &mut WorldState,
    input: &mut InputState,
    level: &LevelDef,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = MonotonicClock::new();
    let mut timer = FrameTimer::new(world.physics.max_frame_ms);
    let tick_rate = Duration::from_millis(config.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();

        if input.ctrl_c_pressed() || input.any_pressed(KEYS_QUIT) {
            break;
        }
        if input.any_pressed(KEYS_RESTART) {
            restart_level(world, level, config)?;
            timer.reset();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            let time = timer.tick(&clock);
            let events = step::step(world, input.take_directions(), time);
            if report_events(world, &events) {
                restart_level(world, level, config)?;
                timer.reset();
            }
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Log this frame's events. Returns true when the level should restart.
fn report_events(world: &WorldState, events: &[GameEvent]) -> bool {
    let mut restart = false;
    for event in events {
        match event {
            GameEvent::EnemyReversed { .. } => {}
            GameEvent::GameOver { enemy } => {
                if let Some(e) = world.enemy(*enemy) {
                    log::info!(
                        "caught by enemy {} at ({:.0}, {:.0}); restarting",
                        enemy.0, e.body.x, e.body.y,
                    );
                }
                restart = true;
            }
        }
    }
    restart
}

// ── Terminal ──

/// Raw mode, plus release events where the terminal supports them.
fn init_terminal() -> io::Result<bool> {
    terminal::enable_raw_mode()?;
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    Ok(enhanced)
}

fn cleanup_terminal(enhanced: bool) -> io::Result<()> {
    if enhanced {
        execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    terminal::disable_raw_mode()?;
    io::stdout().flush()
}
