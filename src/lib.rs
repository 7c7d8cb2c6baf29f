// Library surface for the binary, headless integration tests and other front ends.
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod language;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod word_supply;

pub use error::{Result, SessionError};
pub use game::{Game, SessionSnapshot};
