//! Time driver for the timer engine.
//!
//! A single task owns every timer-related wait:
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!  wake ───▶ │              select!                 │
//!  1s tick ─▶│  (interval keyed by run epoch)       │──▶ TimerEngine
//!  auto ───▶ │  (sleep keyed by auto-start token)   │
//!            └──────────────────────────────────────┘
//!                          │
//!                          ▼
//!                      reconcile
//! ```
//!
//! After every wake-up the driver compares what the engine needs (a ticker
//! for the current run, a delay for the pending auto-start) with what it
//! holds, and replaces or drops its timers accordingly. At most one ticker
//! exists at any time, and it belongs to the current run.

use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};
use tracing::{debug, info};

use super::timer::{TimerEngine, TimerEvent, AUTO_START_DELAY};

/// Tick period of a running timer.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// TimerHandle
// ============================================================================

/// Cloneable access to the engine for command handlers.
#[derive(Clone)]
pub struct TimerHandle {
    engine: Arc<Mutex<TimerEngine>>,
    wake: Arc<Notify>,
}

impl TimerHandle {
    /// Runs `f` with exclusive access to the engine, then wakes the driver
    /// so it can pick up any change in scheduling.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&mut TimerEngine) -> R) -> R {
        let result = {
            let mut engine = self.engine.lock().await;
            f(&mut engine)
        };
        self.wake.notify_one();
        result
    }
}

// ============================================================================
// TimerRuntime
// ============================================================================

/// What the engine currently needs from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Schedule {
    run_epoch: Option<u64>,
    auto_start: Option<u64>,
}

impl Schedule {
    fn of(engine: &TimerEngine) -> Self {
        Self {
            run_epoch: engine.run_epoch(),
            auto_start: engine.pending_auto_start(),
        }
    }
}

/// Drives a [`TimerEngine`] in real time.
pub struct TimerRuntime {
    engine: Arc<Mutex<TimerEngine>>,
    wake: Arc<Notify>,
    ticker: Option<(u64, Interval)>,
    auto_start: Option<(u64, Pin<Box<Sleep>>)>,
}

impl TimerRuntime {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            wake: Arc::new(Notify::new()),
            ticker: None,
            auto_start: None,
        }
    }

    /// Returns a handle for issuing commands to the engine.
    pub fn handle(&self) -> TimerHandle {
        TimerHandle {
            engine: Arc::clone(&self.engine),
            wake: Arc::clone(&self.wake),
        }
    }

    /// Runs until `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        self.reconcile().await;

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    debug!("Timer runtime shutting down");
                    break;
                }
                () = self.wake.notified() => {}
                () = next_tick(&mut self.ticker) => {
                    self.engine.lock().await.tick();
                }
                token = auto_start_due(&mut self.auto_start) => {
                    self.auto_start = None;
                    self.engine.lock().await.fire_auto_start(token);
                }
            }
            self.reconcile().await;
        }
    }

    async fn reconcile(&mut self) {
        let schedule = Schedule::of(&*self.engine.lock().await);

        match schedule.run_epoch {
            Some(epoch) if self.ticker.as_ref().map(|(e, _)| *e) != Some(epoch) => {
                debug!("Starting ticker for run {}", epoch);
                let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some((epoch, ticker));
            }
            Some(_) => {}
            None => {
                if self.ticker.take().is_some() {
                    debug!("Ticker stopped");
                }
            }
        }

        match schedule.auto_start {
            Some(token) if self.auto_start.as_ref().map(|(t, _)| *t) != Some(token) => {
                self.auto_start = Some((token, Box::pin(sleep(AUTO_START_DELAY))));
            }
            Some(_) => {}
            None => self.auto_start = None,
        }
    }
}

async fn next_tick(ticker: &mut Option<(u64, Interval)>) {
    match ticker {
        Some((_, interval)) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn auto_start_due(slot: &mut Option<(u64, Pin<Box<Sleep>>)>) -> u64 {
    match slot {
        Some((token, delay)) => {
            delay.as_mut().await;
            *token
        }
        None => pending().await,
    }
}

/// Logs engine events until the engine is dropped.
pub async fn log_events(mut rx: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            TimerEvent::Tick { .. } => {}
            TimerEvent::SessionCompleted {
                completed,
                next,
                sessions_completed,
            } => info!(
                "{} finished, {} is up ({} sessions total)",
                completed.label(),
                next.label(),
                sessions_completed
            ),
            TimerEvent::AutoStartScheduled { mode, .. } => {
                info!("{} starts in {:?}", mode.label(), AUTO_START_DELAY)
            }
            other => debug!("Timer event: {:?}", other),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
