use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::game::Game;
use crate::runtime::AppEvent;
use crate::session::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Redraw,
    Quit,
}

/// Terminal-side wrapper around a [`Game`]: maps keys to session commands
#[derive(Debug)]
pub struct App {
    pub game: Game,
    input_enabled: Arc<AtomicBool>,
}

impl App {
    pub fn new(mut game: Game) -> Self {
        let input_enabled = Arc::new(AtomicBool::new(!game.is_input_locked()));
        let flag = Arc::clone(&input_enabled);
        game.set_input_lock_listener(Box::new(move |locked: bool| {
            flag.store(!locked, Ordering::SeqCst);
        }));
        Self {
            game,
            input_enabled,
        }
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled.load(Ordering::SeqCst)
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick(generation) => {
                self.game.on_tick(generation);
                Control::Redraw
            }
            AppEvent::Resize => Control::Redraw,
            AppEvent::Refresh => Control::Continue,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::Char('r') if ctrl => self.game.restart_session(),
            KeyCode::Enter => match self.game.phase() {
                Phase::Idle => {
                    self.game.start_session();
                }
                Phase::Running => {
                    let text = self.game.state().input_buffer.clone();
                    self.game.submit_input(&text);
                }
                Phase::Expired => self.game.restart_session(),
            },
            KeyCode::Backspace => {
                if self.input_enabled() {
                    let mut text = self.game.state().input_buffer.clone();
                    text.pop();
                    self.game.change_input(&text);
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if self.input_enabled() {
                    let mut text = self.game.state().input_buffer.clone();
                    text.push(c);
                    self.game.change_input(&text);
                }
            }
            other => {
                debug!(key = ?other, "unhandled key");
                return Control::Continue;
            }
        }
        Control::Redraw
    }
}

/// `m:ss` rendering of the countdown, e.g. `1:00` or `0:09`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
