//! Timer engine for the study timer.
//!
//! This module owns the timer state machine:
//! - Mode transitions (Focus → ShortBreak/LongBreak → Focus)
//! - Activity transitions (Idle / Running / Paused)
//! - Session counting, focus statistics and task tracking
//! - Completion side effects (notification, tone, persistence)
//! - Cancellable deferred auto-start
//!
//! The engine never waits on time itself. The runtime driver calls
//! [`TimerEngine::tick`] once per second while the engine is running and
//! [`TimerEngine::fire_auto_start`] when a scheduled auto-start is due.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::notification::{
    completion_content, DesktopNotifier, NotificationPermission, Notifier,
};
use crate::sound::{default_player, SoundPlayer};
use crate::storage::{Store, TimerStats, TimerStorage, TodayFocus};
use crate::types::{
    normalize_task_label, Activity, CompletedTask, SettingsPatch, TimerMode, TimerSettings,
    TimerSnapshot, SNAPSHOT_TASK_LIMIT,
};

/// Delay between a completion and the automatic start of the next interval.
pub const AUTO_START_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for observers of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started from idle
    Started { mode: TimerMode },
    /// Countdown resumed after a pause
    Resumed { mode: TimerMode },
    /// Countdown paused
    Paused { mode: TimerMode },
    /// Countdown stopped and rewound
    Stopped { mode: TimerMode },
    /// Timer reset to an idle focus interval
    Reset,
    /// Switched to another mode
    ModeSwitched { mode: TimerMode },
    /// One second elapsed
    Tick { remaining_seconds: u32 },
    /// An interval ran to completion
    SessionCompleted {
        completed: TimerMode,
        next: TimerMode,
        sessions_completed: u32,
    },
    /// The next interval will start after [`AUTO_START_DELAY`]
    AutoStartScheduled { mode: TimerMode, token: u64 },
    /// Settings changed
    SettingsUpdated,
    /// Current task label changed
    TaskChanged { label: Option<String> },
}

// ============================================================================
// TimerDeps
// ============================================================================

/// Collaborators injected into the engine.
#[derive(Clone)]
pub struct TimerDeps {
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub sound: Arc<dyn SoundPlayer>,
    pub store: Arc<dyn Store>,
}

impl TimerDeps {
    /// Production collaborators backed by `store`.
    pub fn system(store: Arc<dyn Store>) -> Self {
        Self {
            clock: Arc::new(SystemClock),
            notifier: Arc::new(DesktopNotifier::new()),
            sound: default_player(),
            store,
        }
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// The study timer state machine.
pub struct TimerEngine {
    settings: TimerSettings,
    mode: TimerMode,
    activity: Activity,
    time_left_seconds: u32,
    sessions_completed: u32,
    total_focus_minutes: u32,
    today: TodayFocus,
    current_task: Option<String>,
    completed_tasks: Vec<CompletedTask>,
    /// Incremented on every entry into Running
    run_epoch: u64,
    pending_auto_start: Option<u64>,
    next_auto_start_token: u64,
    notification_permission: Option<NotificationPermission>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    sound: Arc<dyn SoundPlayer>,
    storage: TimerStorage,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an engine, loading settings and statistics from the store.
    ///
    /// The timer starts idle in focus mode with a full focus interval.
    pub fn new(deps: TimerDeps, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        let storage = TimerStorage::new(deps.store);
        let settings = storage.load_settings();
        let stats = storage.load_stats();
        let today = storage.load_today(&deps.clock.today());

        let mut engine = Self {
            mode: TimerMode::Focus,
            activity: Activity::Idle,
            time_left_seconds: settings.duration_seconds(TimerMode::Focus),
            settings,
            sessions_completed: stats.sessions_completed,
            total_focus_minutes: stats.total_focus_minutes,
            today,
            current_task: None,
            completed_tasks: stats.completed_tasks,
            run_epoch: 0,
            pending_auto_start: None,
            next_auto_start_token: 0,
            notification_permission: None,
            clock: deps.clock,
            notifier: deps.notifier,
            sound: deps.sound,
            storage,
            event_tx,
        };

        if engine.settings.notifications_enabled {
            engine.request_notification_permission();
        }

        debug!(
            "Timer loaded: {} sessions, {} focus minutes ({} today)",
            engine.sessions_completed, engine.total_focus_minutes, engine.today.focus_minutes
        );
        engine
    }

    // ------------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------------

    /// Starts or resumes the countdown. Does nothing while already running.
    pub fn start(&mut self) {
        self.cancel_auto_start();
        self.begin_running();
    }

    /// Toggles between running and paused. Does nothing while idle.
    pub fn pause(&mut self) {
        self.cancel_auto_start();
        match self.activity {
            Activity::Running => {
                self.activity = Activity::Paused;
                debug!("Paused {} at {}s", self.mode.as_str(), self.time_left_seconds);
                self.emit(TimerEvent::Paused { mode: self.mode });
            }
            Activity::Paused => self.begin_running(),
            Activity::Idle => debug!("Pause ignored, timer is idle"),
        }
    }

    /// Stops the countdown and rewinds the current mode.
    pub fn stop(&mut self) {
        self.cancel_auto_start();
        self.enter_mode(self.mode);
        debug!("Stopped {}", self.mode.as_str());
        self.emit(TimerEvent::Stopped { mode: self.mode });
    }

    /// Returns to an idle, full-length focus interval.
    pub fn reset(&mut self) {
        self.cancel_auto_start();
        self.enter_mode(TimerMode::Focus);
        debug!("Timer reset");
        self.emit(TimerEvent::Reset);
    }

    /// Switches to `mode`, idle and rewound.
    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.cancel_auto_start();
        self.enter_mode(mode);
        debug!("Switched to {}", mode.as_str());
        self.emit(TimerEvent::ModeSwitched { mode });
    }

    /// Sets (or with `None` clears) the label of the task being worked on.
    ///
    /// Returns the stored label after normalization.
    pub fn set_current_task(&mut self, label: Option<&str>) -> Option<&str> {
        self.current_task = label.and_then(normalize_task_label);
        self.emit(TimerEvent::TaskChanged {
            label: self.current_task.clone(),
        });
        self.current_task.as_deref()
    }

    /// Forgets the completed-task history. Counters are kept.
    pub fn clear_completed_tasks(&mut self) {
        self.completed_tasks.clear();
        self.persist_stats();
    }

    /// Merges `patch` into the settings and persists them.
    ///
    /// While idle, the countdown is rewritten to the new duration of the
    /// current mode. Returns one message per rejected field; rejected
    /// fields keep their previous value.
    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Vec<String> {
        let notifications_were_enabled = self.settings.notifications_enabled;
        let rejected = self.settings.merge(patch);
        for message in &rejected {
            warn!("Ignoring setting: {}", message);
        }

        self.storage.save_settings(&self.settings);

        if !self.activity.is_active() {
            self.time_left_seconds = self.settings.duration_seconds(self.mode);
        }

        let permission_known_good = self
            .notification_permission
            .is_some_and(|p| p.is_granted());
        if self.settings.notifications_enabled
            && (!notifications_were_enabled || !permission_known_good)
        {
            self.request_notification_permission();
        }

        self.emit(TimerEvent::SettingsUpdated);
        rejected
    }

    // ------------------------------------------------------------------------
    // Driver callbacks
    // ------------------------------------------------------------------------

    /// Advances the countdown by one second.
    ///
    /// Does nothing unless running with time left. Returns true if this
    /// tick completed the interval.
    pub fn tick(&mut self) -> bool {
        if !self.activity.is_running() || self.time_left_seconds == 0 {
            return false;
        }

        self.time_left_seconds -= 1;
        self.emit(TimerEvent::Tick {
            remaining_seconds: self.time_left_seconds,
        });

        if self.time_left_seconds == 0 {
            self.complete();
            return true;
        }
        false
    }

    /// Runs the auto-start identified by `token` if it is still pending.
    ///
    /// Returns true if the timer was started.
    pub fn fire_auto_start(&mut self, token: u64) -> bool {
        if self.pending_auto_start != Some(token) {
            debug!("Auto-start {} is stale, ignoring", token);
            return false;
        }
        self.pending_auto_start = None;
        debug!("Auto-starting {}", self.mode.as_str());
        self.begin_running();
        true
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns a read-only view of the timer.
    ///
    /// Today's focus minutes are rolled over first if the day changed.
    pub fn snapshot(&mut self) -> TimerSnapshot {
        self.roll_over_day();
        TimerSnapshot {
            mode: self.mode,
            activity: self.activity,
            time_left_seconds: self.time_left_seconds,
            sessions_completed: self.sessions_completed,
            total_focus_minutes: self.total_focus_minutes,
            todays_focus_minutes: self.today.focus_minutes,
            current_task: self.current_task.clone(),
            completed_tasks: self
                .completed_tasks
                .iter()
                .take(SNAPSHOT_TASK_LIMIT)
                .cloned()
                .collect(),
            completed_task_count: self.completed_tasks.len(),
            settings: self.settings.clone(),
        }
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn is_active(&self) -> bool {
        self.activity.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.activity == Activity::Paused
    }

    pub fn time_left_seconds(&self) -> u32 {
        self.time_left_seconds
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn total_focus_minutes(&self) -> u32 {
        self.total_focus_minutes
    }

    pub fn todays_focus_minutes(&self) -> u32 {
        self.today.focus_minutes
    }

    pub fn current_task(&self) -> Option<&str> {
        self.current_task.as_deref()
    }

    pub fn completed_tasks(&self) -> &[CompletedTask] {
        &self.completed_tasks
    }

    /// Returns the current run epoch while running, `None` otherwise.
    ///
    /// The epoch changes on every entry into Running, so the driver can
    /// tell a resumed run from the one it is already ticking.
    pub fn run_epoch(&self) -> Option<u64> {
        self.activity.is_running().then_some(self.run_epoch)
    }

    /// Returns the token of the pending auto-start, if any.
    pub fn pending_auto_start(&self) -> Option<u64> {
        self.pending_auto_start
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn begin_running(&mut self) {
        let event = match self.activity {
            Activity::Running => return,
            Activity::Idle => TimerEvent::Started { mode: self.mode },
            Activity::Paused => TimerEvent::Resumed { mode: self.mode },
        };
        self.activity = Activity::Running;
        self.run_epoch += 1;
        debug!(
            "Running {} with {}s left (epoch {})",
            self.mode.as_str(),
            self.time_left_seconds,
            self.run_epoch
        );
        self.emit(event);
    }

    fn enter_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.activity = Activity::Idle;
        self.time_left_seconds = self.settings.duration_seconds(mode);
    }

    fn complete(&mut self) {
        let completed = self.mode;
        self.activity = Activity::Idle;

        let mut finished_task = None;
        let (next, auto_start) = match completed {
            TimerMode::Focus => {
                let minutes = self.settings.focus_duration;
                self.sessions_completed = self.sessions_completed.saturating_add(1);
                self.total_focus_minutes = self.total_focus_minutes.saturating_add(minutes);
                self.roll_over_day();
                self.today.focus_minutes = self.today.focus_minutes.saturating_add(minutes);

                if let Some(label) = self.current_task.take() {
                    let now = self.clock.now();
                    self.completed_tasks.insert(
                        0,
                        CompletedTask {
                            id: now.timestamp_millis(),
                            label: label.clone(),
                            completed_at: now,
                            duration_minutes: minutes,
                        },
                    );
                    finished_task = Some(label);
                }

                let interval = self.settings.long_break_interval.max(1);
                let next = if self.sessions_completed % interval == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                };
                (next, self.settings.auto_start_breaks)
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                (TimerMode::Focus, self.settings.auto_start_focus)
            }
        };

        self.enter_mode(next);
        info!(
            "{} complete, next: {} (sessions: {})",
            completed.label(),
            next.label(),
            self.sessions_completed
        );
        self.emit(TimerEvent::SessionCompleted {
            completed,
            next,
            sessions_completed: self.sessions_completed,
        });

        if auto_start {
            self.schedule_auto_start();
        }
        self.notify_completion(completed, next, finished_task.as_deref());
        self.play_completion_tone();
        self.persist_stats();
    }

    fn schedule_auto_start(&mut self) {
        self.next_auto_start_token += 1;
        let token = self.next_auto_start_token;
        self.pending_auto_start = Some(token);
        debug!("Auto-start {} scheduled for {}", token, self.mode.as_str());
        self.emit(TimerEvent::AutoStartScheduled {
            mode: self.mode,
            token,
        });
    }

    fn cancel_auto_start(&mut self) {
        if let Some(token) = self.pending_auto_start.take() {
            debug!("Auto-start {} cancelled", token);
        }
    }

    fn notify_completion(&self, completed: TimerMode, next: TimerMode, task: Option<&str>) {
        if !self.settings.notifications_enabled {
            return;
        }
        if !self
            .notification_permission
            .is_some_and(|p| p.is_granted())
        {
            debug!("Notification skipped, permission not granted");
            return;
        }

        let content = completion_content(completed, next, task);
        if let Err(e) = self.notifier.show(&content.title, &content.body) {
            warn!("Notification failed: {} ({})", e, e.suggestion());
        }
    }

    fn play_completion_tone(&self) {
        if !self.settings.sound_enabled {
            return;
        }
        if let Err(e) = self.sound.play_tone() {
            warn!("Completion tone failed: {} ({})", e, e.suggestion());
        }
    }

    fn request_notification_permission(&mut self) {
        let permission = self.notifier.request_permission();
        if !permission.is_granted() {
            warn!("Notification permission denied, notifications will be skipped");
        }
        self.notification_permission = Some(permission);
    }

    fn roll_over_day(&mut self) {
        let today = self.clock.today();
        if self.today.date != today {
            debug!(
                "Day rolled over ({} -> {}), resetting today's focus minutes",
                self.today.date, today
            );
            self.today = TodayFocus::empty(today);
            self.storage.save_today(&self.today);
        }
    }

    fn persist_stats(&self) {
        self.storage.save_stats(&TimerStats {
            total_focus_minutes: self.total_focus_minutes,
            sessions_completed: self.sessions_completed,
            completed_tasks: self.completed_tasks.clone(),
            last_updated: Some(self.clock.now()),
        });
        self.storage.save_today(&self.today);
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            debug!("No event listener attached");
        }
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("mode", &self.mode)
            .field("activity", &self.activity)
            .field("time_left_seconds", &self.time_left_seconds)
            .field("sessions_completed", &self.sessions_completed)
            .field("pending_auto_start", &self.pending_auto_start)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
