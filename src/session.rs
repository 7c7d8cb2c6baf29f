use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

pub const DEFAULT_NUMBER_OF_WORDS: usize = 80;
pub const DEFAULT_NUMBER_OF_SECS: u32 = 60;
pub const PROGRESS_CEILING: f64 = 100.0;
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How typed text is matched against the current word
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchMode {
    /// Every keystroke is compared; a match advances immediately
    #[default]
    Live,
    /// Only an explicit submission is compared
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub number_of_words: usize,
    pub number_of_secs: u32,
    pub progress_ceiling: f64,
    pub match_mode: MatchMode,
    pub penalize_mismatch: bool,
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_NUMBER_OF_WORDS,
            number_of_secs: DEFAULT_NUMBER_OF_SECS,
            progress_ceiling: PROGRESS_CEILING,
            match_mode: MatchMode::Live,
            penalize_mismatch: false,
            tick_interval: TICK_INTERVAL,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.number_of_secs == 0 {
            return Err(SessionError::invalid("session duration must be positive"));
        }
        if self.number_of_words == 0 {
            return Err(SessionError::invalid("number of words must be at least 1"));
        }
        if !(self.progress_ceiling.is_finite() && self.progress_ceiling > 0.0) {
            return Err(SessionError::invalid("progress ceiling must be positive"));
        }
        if self.tick_interval.is_zero() {
            return Err(SessionError::invalid("tick interval must be positive"));
        }
        Ok(())
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Expired,
}

/// The single mutable aggregate of a typing session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub words: Vec<String>,
    pub current_word_index: usize,
    pub total_characters_typed: usize,
    pub correct_words_count: usize,
    pub input_buffer: String,
    pub progress_value: f64,
    pub display_seconds: u32,
    pub timer_running: bool,
    pub session_over: bool,
}

impl SessionState {
    pub fn new(words: Vec<String>, config: &SessionConfig) -> Self {
        Self {
            words,
            current_word_index: 0,
            total_characters_typed: 0,
            correct_words_count: 0,
            input_buffer: String::new(),
            progress_value: config.progress_ceiling,
            display_seconds: config.number_of_secs,
            timer_running: false,
            session_over: false,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.timer_running, self.session_over) {
            (_, true) => Phase::Expired,
            (true, false) => Phase::Running,
            (false, false) => Phase::Idle,
        }
    }

    pub fn current_word(&self) -> Option<&str> {
        self.words.get(self.current_word_index).map(String::as_str)
    }

    /// True once every word has been completed
    pub fn is_exhausted(&self) -> bool {
        self.current_word_index >= self.words.len()
    }

    pub fn accepts_input(&self) -> bool {
        self.phase() == Phase::Running && !self.is_exhausted()
    }
}
