//! StudyHive study timer library
//!
//! This library provides the core functionality for the StudyHive CLI.
//! It includes:
//! - Timer engine for focus sessions, breaks and task tracking
//! - Real-time driver and IPC server for the daemon
//! - CLI command parsing, IPC client and display utilities
//! - Type definitions for settings, snapshots and IPC messages
//! - Persistence, desktop notifications and completion tones

pub mod cli;
pub mod clock;
pub mod config;
pub mod daemon;
pub mod notification;
pub mod sound;
pub mod storage;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Activity, CompletedTask, IpcRequest, IpcResponse, SettingsPatch, TimerMode, TimerSettings,
    TimerSnapshot,
};

pub use clock::{Clock, MockClock, SystemClock};
pub use config::AppConfig;
pub use daemon::{TimerDeps, TimerEngine, TimerEvent, TimerHandle, TimerRuntime};

// Re-export collaborator traits and their test doubles
pub use notification::{MockNotifier, NotificationError, NotificationPermission, Notifier};
pub use sound::{MockSoundPlayer, SoundError, SoundPlayer};
pub use storage::{FileStore, MemoryStore, Store, StoreError};
