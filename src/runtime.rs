use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::clock::TickSink;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// A clock tick from the task of the given session generation
    Tick(u64),
    /// Nothing arrived within the refresh interval
    Refresh,
}

/// Source of app events (keyboard, resize, clock ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;

    /// Sender that feeds this source, used to route clock ticks in
    fn sender(&self) -> Sender<AppEvent>;
}

/// Wrap an event sender as a clock tick sink
pub fn tick_sink(tx: Sender<AppEvent>) -> TickSink {
    let tx = Mutex::new(tx);
    Arc::new(move |generation: u64| {
        tx.lock()
            .map(|tx| tx.send(AppEvent::Tick(generation)).is_ok())
            .unwrap_or(false)
    })
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(error = %err, "terminal event read failed");
                    break;
                }
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Event source fed by hand, for headless tests
pub struct TestEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Runner that hands the application one event at a time
pub struct Runner<E: EventSource> {
    event_source: E,
    refresh_interval: Duration,
}

impl<E: EventSource> Runner<E> {
    pub fn new(event_source: E, refresh_interval: Duration) -> Self {
        Self {
            event_source,
            refresh_interval,
        }
    }

    pub fn sender(&self) -> Sender<AppEvent> {
        self.event_source.sender()
    }

    /// Blocks up to the refresh interval and returns the next event, or Refresh on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.refresh_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_refresh_on_timeout() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(1));

        match runner.step() {
            AppEvent::Refresh => {}
            other => panic!("expected Refresh on timeout, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(10));
        runner.sender().send(AppEvent::Resize).unwrap();

        match runner.step() {
            AppEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn tick_sink_routes_generation() {
        let runner = Runner::new(TestEventSource::new(), Duration::from_millis(10));
        let sink = tick_sink(runner.sender());

        assert!(sink(7));
        match runner.step() {
            AppEvent::Tick(7) => {}
            other => panic!("expected Tick(7), got {other:?}"),
        }
    }

    #[test]
    fn tick_sink_reports_closed_channel() {
        let (tx, rx) = mpsc::channel();
        let sink = tick_sink(tx);
        drop(rx);
        assert!(!sink(0));
    }
}
