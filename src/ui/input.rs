/// Keyboard input state tracker.
///
/// Tracks which keys are currently held down and folds them into the
/// per-frame `Directions` the simulation consumes.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// ## Key names (config.toml `[keys]`)
///   "up" "down" "left" "right" "space" "enter" "esc", or any single character.
///   Letters match both cases.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyBindings;
use crate::domain::entity::Directions;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Fresh presses since the last `take_directions`. Several drains can
    /// run between two simulation steps; a tap must survive all of them.
    pending_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for meta-key handling.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,

    up: Vec<KeyCode>,
    down: Vec<KeyCode>,
    left: Vec<KeyCode>,
    right: Vec<KeyCode>,
}

impl InputState {
    pub fn new(keys: &KeyBindings) -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            pending_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            up: parse_keys(&keys.up),
            down: parse_keys(&keys.down),
            left: parse_keys(&keys.left),
            right: parse_keys(&keys.right),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.start_drain();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Consume this step's movement intent. A key pressed since the last
    /// call counts even if it has already been released.
    pub fn take_directions(&mut self) -> Directions {
        let dirs = Directions {
            up: self.any_active(&self.up),
            down: self.any_active(&self.down),
            left: self.any_active(&self.left),
            right: self.any_active(&self.right),
        };
        self.pending_presses.clear();
        dirs
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn start_drain(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    fn record(&mut self, key: KeyEvent, at: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Enhancement not confirmed; the timeout handles release.
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, at);
                if !was_held {
                    self.fresh_presses.push(key.code);
                    self.pending_presses.push(key.code);
                }
            }
        }
    }

    fn any_active(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c) || self.pending_presses.contains(c))
    }
}

// ══════════════════════════════════════════════════════════════
// Key names
// ══════════════════════════════════════════════════════════════

/// Expand configured key names into key codes. Unknown names are skipped
/// with a warning.
pub fn parse_keys(names: &[String]) -> Vec<KeyCode> {
    let mut codes = Vec::with_capacity(names.len() * 2);
    for name in names {
        match parse_key(name) {
            Some(code) => {
                codes.push(code);
                if let KeyCode::Char(c) = code {
                    if c.is_alphabetic() {
                        let other = if c.is_lowercase() {
                            c.to_ascii_uppercase()
                        } else {
                            c.to_ascii_lowercase()
                        };
                        codes.push(KeyCode::Char(other));
                    }
                }
            }
            None => log::warn!("unknown key name {:?} in [keys], ignored", name),
        }
    }
    codes
}

pub fn parse_key(name: &str) -> Option<KeyCode> {
    match name.to_ascii_lowercase().as_str() {
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "space" => Some(KeyCode::Char(' ')),
        "enter" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}
