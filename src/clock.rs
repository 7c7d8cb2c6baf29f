use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::session::{SessionConfig, SessionState};

/// Fixed parameters of the countdown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTiming {
    pub ceiling: f64,
    pub step: f64,
    pub duration_secs: u32,
    pub interval: Duration,
}

impl ClockTiming {
    /// The step drains the ceiling over the session length, rounded to three
    /// decimals (100 over 60 seconds gives 1.667). Rounding is dropped when it
    /// would empty the progress before the last tick.
    pub fn from_config(config: &SessionConfig) -> Self {
        let secs = config.number_of_secs.max(1);
        let raw = config.progress_ceiling / secs as f64;
        let rounded = (raw * 1000.0).round() / 1000.0;
        let left_for_last_tick = config.progress_ceiling - (secs - 1) as f64 * rounded;
        let step = if left_for_last_tick > 1e-6 { rounded } else { raw };
        Self {
            ceiling: config.progress_ceiling,
            step,
            duration_secs: config.number_of_secs,
            interval: config.tick_interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, already over, or a stale tick
    Ignored,
    Ticked,
    Expired,
}

/// Apply one tick of decay to `state`.
pub fn apply_tick(state: &mut SessionState, timing: &ClockTiming) -> TickOutcome {
    if !state.timer_running || state.session_over {
        return TickOutcome::Ignored;
    }

    state.progress_value = (state.progress_value - timing.step).max(0.0);
    state.display_seconds = state.display_seconds.saturating_sub(1);

    if state.progress_value <= 0.0 || state.display_seconds == 0 {
        expire(state);
        TickOutcome::Expired
    } else {
        TickOutcome::Ticked
    }
}

/// Terminal transition: zero the countdown, clear input, mark the session over
pub fn expire(state: &mut SessionState) {
    state.progress_value = 0.0;
    state.display_seconds = 0;
    state.session_over = true;
    state.input_buffer.clear();
}

/// Handle to a periodic task. Cancelling is idempotent and dropping the
/// handle cancels the task.
#[derive(Debug)]
pub struct TickTask {
    cancelled: Arc<AtomicBool>,
}

impl TickTask {
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let cancelled = Arc::new(AtomicBool::new(false));
        (
            Self {
                cancelled: Arc::clone(&cancelled),
            },
            cancelled,
        )
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TickTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Callback run on every period. Returning false stops the task.
pub type TickFn = Box<dyn FnMut() -> bool + Send + 'static>;

/// Host-provided periodic scheduling primitive
pub trait Scheduler: Send {
    fn schedule_every(&self, interval: Duration, task: TickFn) -> TickTask;
}

/// Runs each task on its own thread, sleeping between periods. Timing is
/// best effort and may drift.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_every(&self, interval: Duration, mut task: TickFn) -> TickTask {
        let (handle, cancelled) = TickTask::new();
        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::SeqCst) || !task() {
                break;
            }
        });
        handle
    }
}

type ManualTask = (Arc<AtomicBool>, TickFn);

/// Scheduler driven by hand, for tests and scripted hosts
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<ManualTask>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live task once and drop the cancelled or finished ones.
    /// Returns the number of tasks that fired.
    pub fn fire(&self) -> usize {
        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut fired = 0;
        tasks.retain_mut(|(cancelled, task)| {
            if cancelled.load(Ordering::SeqCst) {
                return false;
            }
            fired += 1;
            task()
        });
        fired
    }

    pub fn live_tasks(&self) -> usize {
        match self.tasks.lock() {
            Ok(tasks) => tasks.iter().filter(|(c, _)| !c.load(Ordering::SeqCst)).count(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .filter(|(c, _)| !c.load(Ordering::SeqCst))
                .count(),
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_every(&self, _interval: Duration, task: TickFn) -> TickTask {
        let (handle, cancelled) = TickTask::new();
        match self.tasks.lock() {
            Ok(mut tasks) => tasks.push((cancelled, task)),
            Err(poisoned) => poisoned.into_inner().push((cancelled, task)),
        }
        handle
    }
}

/// Where ticks are delivered. Receives the generation of the task that fired;
/// returns false once the receiving side is gone.
pub type TickSink = Arc<dyn Fn(u64) -> bool + Send + Sync + 'static>;

/// Owns the periodic task of the current session and filters stale ticks
pub struct SessionClock {
    timing: ClockTiming,
    scheduler: Box<dyn Scheduler>,
    sink: TickSink,
    task: Option<TickTask>,
    generation: u64,
}

impl std::fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClock")
            .field("timing", &self.timing)
            .field("generation", &self.generation)
            .field("ticking", &self.is_ticking())
            .finish()
    }
}

impl SessionClock {
    pub fn new(timing: ClockTiming, scheduler: Box<dyn Scheduler>, sink: TickSink) -> Self {
        Self {
            timing,
            scheduler,
            sink,
            task: None,
            generation: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ticking(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Idle -> Running. A no-op (returns false) when already running or over.
    pub fn start(&mut self, state: &mut SessionState) -> bool {
        if state.timer_running || state.session_over {
            debug!(phase = %state.phase(), "start ignored");
            return false;
        }
        state.timer_running = true;

        let sink = Arc::clone(&self.sink);
        let generation = self.generation;
        self.task = Some(
            self.scheduler
                .schedule_every(self.timing.interval, Box::new(move || sink(generation))),
        );
        info!(generation, secs = self.timing.duration_secs, "clock started");
        true
    }

    /// Apply a tick fired by the task of `generation`.
    pub fn on_tick(&mut self, state: &mut SessionState, generation: u64) -> TickOutcome {
        if generation != self.generation || !self.is_ticking() {
            debug!(generation, current = self.generation, "stale tick dropped");
            return TickOutcome::Ignored;
        }
        let outcome = apply_tick(state, &self.timing);
        if outcome == TickOutcome::Expired {
            self.cancel();
            info!(
                generation,
                words = state.correct_words_count,
                chars = state.total_characters_typed,
                "session expired"
            );
        }
        outcome
    }

    /// Stop the periodic task. Safe to call when nothing is running.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }

    /// Cancel the current task and move to a new generation so any tick
    /// already in flight is discarded.
    pub fn reset(&mut self) {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
