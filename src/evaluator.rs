use tracing::debug;

use crate::error::{Result, SessionError};
use crate::session::{MatchMode, SessionState};

/// What an accepted input event did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The current word was completed
    Advanced,
    /// Buffer updated, no match yet
    Buffered,
    /// Submission did not match; buffer cleared
    Mismatch,
}

/// Trim and lower-case raw input before it is stored or compared
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn ensure_accepting(state: &SessionState) -> Result<()> {
    if state.session_over {
        return Err(SessionError::InputRejected("session is over"));
    }
    if !state.timer_running {
        return Err(SessionError::InputRejected("timer not started"));
    }
    if state.is_exhausted() {
        return Err(SessionError::InputRejected("word supply exhausted"));
    }
    Ok(())
}

/// Complete the current word: credit its characters, count it, move on and
/// clear the buffer. All fields change under the one `&mut` borrow.
pub fn advance(state: &mut SessionState) -> Result<()> {
    let Some(word) = state.words.get(state.current_word_index) else {
        return Err(SessionError::InputRejected("word supply exhausted"));
    };
    state.total_characters_typed += word.chars().count();
    state.correct_words_count += 1;
    state.current_word_index += 1;
    state.input_buffer.clear();
    debug!(
        index = state.current_word_index,
        chars = state.total_characters_typed,
        "advanced"
    );
    Ok(())
}

/// A keystroke changed the input field to `text`.
pub fn change_input(state: &mut SessionState, mode: MatchMode, text: &str) -> Result<Evaluation> {
    ensure_accepting(state)?;
    let typed = normalize(text);

    if mode == MatchMode::Live && state.current_word() == Some(typed.as_str()) {
        advance(state)?;
        return Ok(Evaluation::Advanced);
    }

    state.input_buffer = typed;
    Ok(Evaluation::Buffered)
}

/// The participant submitted `text`.
pub fn submit_input(state: &mut SessionState, penalize_mismatch: bool, text: &str) -> Result<Evaluation> {
    ensure_accepting(state)?;
    let typed = normalize(text);

    if state.current_word() == Some(typed.as_str()) {
        advance(state)?;
        return Ok(Evaluation::Advanced);
    }

    state.input_buffer.clear();
    if penalize_mismatch {
        state.correct_words_count = state.correct_words_count.saturating_sub(1);
    }
    debug!(typed = %typed, penalized = penalize_mismatch, "submission mismatch");
    Ok(Evaluation::Mismatch)
}
