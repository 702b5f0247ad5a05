//! Integration tests for daemon-CLI IPC communication.
//!
//! A daemon is served on a temporary socket with in-memory collaborators
//! and driven through the real IPC client.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};

use studyhive::cli::IpcClient;
use studyhive::daemon::{self, TimerDeps};
use studyhive::storage::{FileStore, MemoryStore, Store, TimerStats, STATS_KEY};
use studyhive::types::SNAPSHOT_TASK_LIMIT;
use studyhive::{
    Activity, AppConfig, CompletedTask, MockClock, MockNotifier, MockSoundPlayer, SettingsPatch,
    TimerMode,
};

// ============================================================================
// Test Helpers
// ============================================================================

struct TestDaemon {
    client: IpcClient,
    socket_path: PathBuf,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl TestDaemon {
    async fn start(store: Arc<dyn Store>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::with_data_dir(dir.path(), None);
        // Keep the directory so it's not deleted
        std::mem::forget(dir);

        let deps = TimerDeps {
            clock: Arc::new(MockClock::new(Utc::now())),
            notifier: Arc::new(MockNotifier::new()),
            sound: Arc::new(MockSoundPlayer::new()),
            store,
        };

        let socket_path = config.socket_path.clone();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            daemon::serve(&config, deps, async {
                let _ = stop_rx.await;
            })
            .await
        });

        timeout(Duration::from_secs(5), async {
            while !socket_path.exists() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("daemon socket did not appear");

        Self {
            client: IpcClient::with_socket_path(socket_path.clone()),
            socket_path,
            stop: Some(stop_tx),
            task,
        }
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let result = timeout(Duration::from_secs(5), &mut self.task)
            .await
            .expect("daemon did not stop");
        result.unwrap().unwrap();
    }
}

// ============================================================================
// Command round trips
// ============================================================================

#[tokio::test]
async fn test_status_of_fresh_daemon() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;

    let response = daemon.client.status().await.unwrap();
    let data = response.data.unwrap();

    assert_eq!(data.mode, TimerMode::Focus);
    assert_eq!(data.activity, Activity::Idle);
    assert_eq!(data.time_left_seconds, 25 * 60);
    assert_eq!(data.sessions_completed, 0);

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_start_pause_resume_stop() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;

    let response = daemon.client.start().await.unwrap();
    assert_eq!(response.data.unwrap().activity, Activity::Running);

    let response = daemon.client.pause().await.unwrap();
    assert_eq!(response.message, "Timer paused");
    assert_eq!(response.data.unwrap().activity, Activity::Paused);

    let response = daemon.client.start().await.unwrap();
    assert_eq!(response.message, "Timer resumed");

    let response = daemon.client.stop().await.unwrap();
    let data = response.data.unwrap();
    assert_eq!(data.activity, Activity::Idle);
    assert_eq!(data.time_left_seconds, 25 * 60);

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_running_timer_counts_down() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;

    daemon.client.start().await.unwrap();
    sleep(Duration::from_millis(2_300)).await;

    let data = daemon.client.status().await.unwrap().data.unwrap();
    assert!(data.time_left_seconds <= 25 * 60 - 2);
    assert!(data.time_left_seconds >= 25 * 60 - 3);

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_pause_while_idle_is_reported_as_error() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;

    let err = daemon.client.pause().await.unwrap_err();
    assert_eq!(err.to_string(), "Timer is not running");

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_mode_task_and_settings() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;

    let data = daemon
        .client
        .switch_mode(TimerMode::LongBreak)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(data.mode, TimerMode::LongBreak);
    assert_eq!(data.time_left_seconds, 15 * 60);

    let data = daemon
        .client
        .set_task(Some("Problem set 3".to_string()))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(data.current_task.as_deref(), Some("Problem set 3"));

    let patch = SettingsPatch {
        long_break_duration: Some(20),
        auto_start_focus: Some(true),
        ..Default::default()
    };
    let data = daemon
        .client
        .update_settings(patch)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(data.settings.long_break_duration, 20);
    assert!(data.settings.auto_start_focus);
    assert_eq!(data.time_left_seconds, 20 * 60);

    let data = daemon.client.reset().await.unwrap().data.unwrap();
    assert_eq!(data.mode, TimerMode::Focus);
    assert_eq!(data.current_task.as_deref(), Some("Problem set 3"));

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_clients() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;
    let socket_path = daemon.socket_path.clone();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = IpcClient::with_socket_path(socket_path.clone());
        handles.push(tokio::spawn(async move { client.status().await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    daemon.shutdown().await;
}

#[tokio::test]
async fn test_long_task_history_keeps_responses_small() {
    let now = Utc::now();
    let stats = TimerStats {
        total_focus_minutes: 400 * 25,
        sessions_completed: 400,
        completed_tasks: (0..400)
            .map(|i| CompletedTask {
                id: now.timestamp_millis() - i,
                label: format!("{:03} {}", i, "x".repeat(96)),
                completed_at: now,
                duration_minutes: 25,
            })
            .collect(),
        last_updated: Some(now),
    };
    let store = Arc::new(MemoryStore::new());
    store
        .set(STATS_KEY, &serde_json::to_string(&stats).unwrap())
        .unwrap();
    let daemon = TestDaemon::start(store).await;

    let response = daemon.client.start().await.unwrap();
    assert_eq!(response.data.unwrap().activity, Activity::Running);

    let data = daemon.client.status().await.unwrap().data.unwrap();
    assert_eq!(data.completed_tasks.len(), SNAPSHOT_TASK_LIMIT);
    assert_eq!(data.completed_task_count, 400);
    assert!(data.completed_tasks[0].label.starts_with("000 "));

    daemon.shutdown().await;
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_shutdown_removes_socket() {
    let daemon = TestDaemon::start(Arc::new(MemoryStore::new())).await;
    let socket_path = daemon.socket_path.clone();

    daemon.shutdown().await;

    assert!(!socket_path.exists());
}

#[tokio::test]
async fn test_settings_persist_across_daemon_restarts() {
    let data_dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(FileStore::open(data_dir.path()).unwrap());

    let daemon = TestDaemon::start(Arc::clone(&store)).await;
    let patch = SettingsPatch {
        focus_duration: Some(50),
        ..Default::default()
    };
    daemon.client.update_settings(patch).await.unwrap();
    daemon.shutdown().await;

    let store: Arc<dyn Store> = Arc::new(FileStore::open(data_dir.path()).unwrap());
    let daemon = TestDaemon::start(store).await;
    let data = daemon.client.status().await.unwrap().data.unwrap();

    assert_eq!(data.settings.focus_duration, 50);
    assert_eq!(data.time_left_seconds, 50 * 60);

    daemon.shutdown().await;
}
