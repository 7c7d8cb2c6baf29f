use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::clock::{ClockTiming, Scheduler, SessionClock, TickOutcome, TickSink};
use crate::error::{Result, SessionError};
use crate::evaluator::{self, Evaluation};
use crate::metrics::Metrics;
use crate::session::{Phase, SessionConfig, SessionState};
use crate::word_supply::WordSupply;

/// Notified whenever the input surface should be enabled or disabled
pub trait InputLockListener: Send {
    fn on_input_lock_changed(&mut self, locked: bool);
}

impl<F: FnMut(bool) + Send> InputLockListener for F {
    fn on_input_lock_changed(&mut self, locked: bool) {
        self(locked)
    }
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub words: Vec<String>,
    pub current_word_index: usize,
    pub input_buffer: String,
    pub progress_value: f64,
    pub display_seconds: u32,
    pub total_characters_typed: usize,
    pub correct_words_count: usize,
    pub metrics: Metrics,
    pub phase: Phase,
    pub session_over: bool,
    pub input_locked: bool,
}

/// One typing session and its clock. All commands take `&mut self`, so
/// ticks and input events are applied strictly one after another.
pub struct Game {
    config: SessionConfig,
    supply: WordSupply,
    state: SessionState,
    clock: SessionClock,
    input_locked: bool,
    lock_listener: Option<Box<dyn InputLockListener>>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("config", &self.config)
            .field("supply", &self.supply)
            .field("state", &self.state)
            .field("clock", &self.clock)
            .field("input_locked", &self.input_locked)
            .finish()
    }
}

impl Game {
    /// Validate `config`, draw the first word sequence and set up an idle
    /// session. Ticks fired by `scheduler` are handed to `sink` and must be
    /// fed back through [`Game::on_tick`].
    pub fn new(
        config: SessionConfig,
        supply: WordSupply,
        scheduler: Box<dyn Scheduler>,
        sink: TickSink,
    ) -> Result<Self> {
        config.validate()?;
        if supply.number_of_words() != config.number_of_words {
            return Err(SessionError::invalid(format!(
                "word supply draws {} words but the session wants {}",
                supply.number_of_words(),
                config.number_of_words
            )));
        }

        let state = SessionState::new(supply.draw(), &config);
        let clock = SessionClock::new(ClockTiming::from_config(&config), scheduler, sink);
        info!(
            words = config.number_of_words,
            pool = supply.pool_size(),
            secs = config.number_of_secs,
            mode = %config.match_mode,
            "session created"
        );

        Ok(Self {
            config,
            supply,
            state,
            clock,
            input_locked: true,
            lock_listener: None,
        })
    }

    pub fn set_input_lock_listener(&mut self, listener: Box<dyn InputLockListener>) {
        self.lock_listener = Some(listener);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn generation(&self) -> u64 {
        self.clock.generation()
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn metrics(&self) -> Metrics {
        Metrics::compute(self.state.total_characters_typed, self.config.number_of_secs)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            words: self.state.words.clone(),
            current_word_index: self.state.current_word_index,
            input_buffer: self.state.input_buffer.clone(),
            progress_value: self.state.progress_value,
            display_seconds: self.state.display_seconds,
            total_characters_typed: self.state.total_characters_typed,
            correct_words_count: self.state.correct_words_count,
            metrics: self.metrics(),
            phase: self.state.phase(),
            session_over: self.state.session_over,
            input_locked: self.input_locked,
        }
    }

    /// Idle -> Running. Returns false when the call was a no-op.
    pub fn start_session(&mut self) -> bool {
        let started = self.clock.start(&mut self.state);
        self.sync_input_lock();
        started
    }

    /// Cancel the clock, throw the state away and start over with fresh words.
    pub fn restart_session(&mut self) {
        self.clock.reset();
        self.state = SessionState::new(self.supply.draw(), &self.config);
        info!(generation = self.clock.generation(), "session restarted");
        self.sync_input_lock();
    }

    pub fn on_tick(&mut self, generation: u64) -> TickOutcome {
        let outcome = self.clock.on_tick(&mut self.state, generation);
        if outcome == TickOutcome::Expired {
            self.sync_input_lock();
        }
        outcome
    }

    pub fn change_input(&mut self, text: &str) -> Option<Evaluation> {
        let result = evaluator::change_input(&mut self.state, self.config.match_mode, text);
        self.settle(result)
    }

    pub fn submit_input(&mut self, text: &str) -> Option<Evaluation> {
        let result = evaluator::submit_input(&mut self.state, self.config.penalize_mismatch, text);
        self.settle(result)
    }

    fn settle(&mut self, result: Result<Evaluation>) -> Option<Evaluation> {
        match result {
            Ok(evaluation) => {
                if evaluation == Evaluation::Advanced && self.state.is_exhausted() {
                    info!(words = self.state.correct_words_count, "word supply exhausted");
                    self.sync_input_lock();
                }
                Some(evaluation)
            }
            Err(err) if err.is_rejection() => {
                debug!(error = %err, "input ignored");
                None
            }
            Err(err) => {
                warn!(error = %err, "input failed");
                None
            }
        }
    }

    fn sync_input_lock(&mut self) {
        let locked = !self.state.accepts_input();
        if locked == self.input_locked {
            return;
        }
        self.input_locked = locked;
        debug!(locked, "input lock changed");
        if let Some(listener) = self.lock_listener.as_mut() {
            listener.on_input_lock_changed(locked);
        }
    }
}

/// For hosts that deliver events from more than one thread
pub type SharedGame = Arc<Mutex<Game>>;

pub fn shared(game: Game) -> SharedGame {
    Arc::new(Mutex::new(game))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualScheduler;
    use crate::language::Language;
    use crate::session::MatchMode;
    use crate::word_supply::SequentialSelector;
    use std::sync::mpsc;

    fn game_with(words: &[&str], config: SessionConfig) -> (Game, ManualScheduler, mpsc::Receiver<u64>) {
        let lang = Language::from_words("test", words.iter().copied());
        let supply =
            WordSupply::with_selector(lang, config.number_of_words, Box::new(SequentialSelector)).unwrap();
        let scheduler = ManualScheduler::new();
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let sink: TickSink = Arc::new(move |g: u64| tx.lock().map(|tx| tx.send(g).is_ok()).unwrap_or(false));
        let game = Game::new(config, supply, Box::new(scheduler.clone()), sink).unwrap();
        (game, scheduler, rx)
    }

    fn config(words: usize) -> SessionConfig {
        SessionConfig {
            number_of_words: words,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_new_game_is_idle_and_locked() {
        let (game, _, _) = game_with(&["cat", "dog"], config(2));
        let snap = game.snapshot();

        assert_eq!(snap.phase, Phase::Idle);
        assert!(snap.input_locked);
        assert_eq!(snap.words, vec!["cat", "dog"]);
        assert_eq!(snap.metrics, Metrics::default());
    }

    #[test]
    fn test_mismatched_supply_is_invalid() {
        let lang = Language::from_words("test", ["cat", "dog"]);
        let supply = WordSupply::new(lang, 1).unwrap();
        let sink: TickSink = Arc::new(|_: u64| true);
        let result = Game::new(config(2), supply, Box::new(ManualScheduler::new()), sink);
        assert!(matches!(result, Err(SessionError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_start_twice_equals_once() {
        let (mut game, scheduler, _) = game_with(&["cat"], config(1));

        assert!(game.start_session());
        let once = game.snapshot();
        assert!(!game.start_session());

        assert_eq!(game.snapshot(), once);
        assert_eq!(scheduler.live_tasks(), 1);
    }

    #[test]
    fn test_input_before_start_is_ignored() {
        let (mut game, _, _) = game_with(&["cat"], config(1));
        let before = game.snapshot();

        assert_eq!(game.change_input("c"), None);
        assert_eq!(game.submit_input("cat"), None);
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_live_scenario() {
        let (mut game, _, _) = game_with(&["cat", "dog"], config(2));
        game.start_session();

        game.change_input("c");
        game.change_input("ca");
        assert_eq!(game.change_input("cat"), Some(Evaluation::Advanced));

        let state = game.state();
        assert_eq!(state.total_characters_typed, 3);
        assert_eq!(state.correct_words_count, 1);
        assert_eq!(state.current_word_index, 1);
    }

    #[test]
    fn test_submit_scenario_with_penalty() {
        let cfg = SessionConfig {
            match_mode: MatchMode::Submit,
            penalize_mismatch: true,
            ..config(2)
        };
        let (mut game, _, _) = game_with(&["cat", "dog"], cfg);
        game.start_session();
        game.submit_input("cat");
        game.change_input("dfg");

        assert_eq!(game.submit_input("dfg"), Some(Evaluation::Mismatch));
        assert!(game.state().input_buffer.is_empty());
        assert_eq!(game.state().correct_words_count, 0);
        assert_eq!(game.state().current_word_index, 1);
    }

    #[test]
    fn test_ticks_flow_through_sink_and_expire() {
        let cfg = SessionConfig {
            number_of_secs: 2,
            ..config(1)
        };
        let (mut game, scheduler, rx) = game_with(&["cat"], cfg);
        let locks: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&locks);
        game.set_input_lock_listener(Box::new(move |locked: bool| seen.lock().unwrap().push(locked)));

        game.start_session();
        game.change_input("ca");
        for _ in 0..2 {
            scheduler.fire();
            let generation = rx.recv().unwrap();
            game.on_tick(generation);
        }

        let snap = game.snapshot();
        assert_eq!(snap.phase, Phase::Expired);
        assert_eq!(snap.display_seconds, 0);
        assert!(snap.input_buffer.is_empty());
        assert!(snap.input_locked);
        assert_eq!(scheduler.live_tasks(), 0);
        assert_eq!(*locks.lock().unwrap(), vec![false, true]);

        let frozen = game.snapshot();
        assert_eq!(game.change_input("cat"), None);
        assert_eq!(game.on_tick(0), TickOutcome::Ignored);
        assert_eq!(game.snapshot(), frozen);
    }

    #[test]
    fn test_restart_cancels_and_resets() {
        let (mut game, scheduler, rx) = game_with(&["cat", "dog"], config(2));
        game.start_session();
        game.change_input("cat");
        scheduler.fire();
        let stale = rx.recv().unwrap();

        game.restart_session();

        assert_eq!(scheduler.live_tasks(), 0);
        assert_eq!(game.on_tick(stale), TickOutcome::Ignored);
        let snap = game.snapshot();
        assert_eq!(snap.phase, Phase::Idle);
        assert_eq!(snap.current_word_index, 0);
        assert_eq!(snap.total_characters_typed, 0);
        assert_eq!(snap.correct_words_count, 0);
        assert_eq!(snap.progress_value, 100.0);
        assert_eq!(snap.display_seconds, 60);
        assert!(snap.input_locked);

        assert!(game.start_session());
    }

    #[test]
    fn test_exhaustion_locks_input_while_clock_runs() {
        let (mut game, scheduler, _) = game_with(&["cat"], config(1));
        game.start_session();
        game.change_input("cat");

        assert!(game.is_input_locked());
        assert_eq!(game.phase(), Phase::Running);
        assert_eq!(game.change_input("cat"), None);
        assert_eq!(game.state().current_word_index, 1);
        assert_eq!(scheduler.live_tasks(), 1);
    }

    #[test]
    fn test_shared_game_serializes_access() {
        let (game, _, _) = game_with(&["cat"], config(1));
        let shared = shared(game);
        let handle = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || shared.lock().unwrap().start_session())
        };
        assert!(handle.join().unwrap());
        assert_eq!(shared.lock().unwrap().phase(), Phase::Running);
    }
}
