//! Command definitions for the StudyHive CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::types::{SettingsPatch, TimerMode, MAX_TASK_LABEL_LENGTH};

// ============================================================================
// CLI Structure
// ============================================================================

/// StudyHive - a study timer for the terminal
#[derive(Parser, Debug)]
#[command(
    name = "studyhive",
    version,
    about = "Study timer with focus sessions, breaks and task tracking",
    long_about = "A study timer that alternates focus sessions with short and long breaks.\n\
                  A background daemon keeps time; the other commands talk to it.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Daemon socket path
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<PathBuf>,

    /// Directory for settings and statistics
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer daemon in the foreground
    Daemon,

    /// Start or resume the timer
    #[command(visible_alias = "resume")]
    Start,

    /// Pause the running timer, or resume a paused one
    Pause,

    /// Stop the timer and rewind the current interval
    Stop,

    /// Return to an idle focus session
    Reset,

    /// Switch to another mode
    Mode {
        /// Mode to switch to
        #[arg(value_enum)]
        mode: ModeArg,
    },

    /// Set or clear the task you are working on
    Task(TaskArgs),

    /// Forget the completed-task history
    ClearTasks,

    /// Show or change timer settings
    Settings(SettingsArgs),

    /// Show current timer status
    Status,

    /// Show focus statistics and completed tasks
    Stats,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Timer mode as spelled on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Focus,
    ShortBreak,
    LongBreak,
}

impl From<ModeArg> for TimerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Focus => TimerMode::Focus,
            ModeArg::ShortBreak => TimerMode::ShortBreak,
            ModeArg::LongBreak => TimerMode::LongBreak,
        }
    }
}

// ============================================================================
// Task Command Arguments
// ============================================================================

/// Arguments for the task command
#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    /// Task label (up to 100 characters)
    #[arg(value_parser = validate_task_label, required_unless_present = "clear")]
    pub label: Option<String>,

    /// Clear the current task
    #[arg(long, conflicts_with = "label")]
    pub clear: bool,
}

impl TaskArgs {
    /// Returns the label to send, `None` meaning clear.
    pub fn to_label(&self) -> Option<String> {
        if self.clear {
            None
        } else {
            self.label.clone()
        }
    }
}

// ============================================================================
// Settings Command Arguments
// ============================================================================

/// Arguments for the settings command. With no options, prints the settings.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Focus duration in minutes (1-120)
    #[arg(long, value_name = "MINUTES", value_parser = clap::value_parser!(u32).range(1..=120))]
    pub focus: Option<u32>,

    /// Short break duration in minutes (1-60)
    #[arg(long, value_name = "MINUTES", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub short_break: Option<u32>,

    /// Long break duration in minutes (1-60)
    #[arg(long, value_name = "MINUTES", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub long_break: Option<u32>,

    /// Focus sessions between long breaks (1-12)
    #[arg(long, value_name = "SESSIONS", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub interval: Option<u32>,

    /// Start breaks automatically
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub auto_start_breaks: Option<bool>,

    /// Start focus sessions automatically after a break
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub auto_start_focus: Option<bool>,

    /// Play a tone when an interval ends
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub sound: Option<bool>,

    /// Show a desktop notification when an interval ends
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub notifications: Option<bool>,
}

impl SettingsArgs {
    /// Converts the given options into a settings patch.
    pub fn to_patch(&self) -> SettingsPatch {
        SettingsPatch {
            focus_duration: self.focus,
            short_break_duration: self.short_break,
            long_break_duration: self.long_break,
            long_break_interval: self.interval,
            auto_start_breaks: self.auto_start_breaks,
            auto_start_focus: self.auto_start_focus,
            sound_enabled: self.sound,
            notifications_enabled: self.notifications,
        }
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates the task label.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_task_label(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("task label cannot be empty".to_string());
    }
    if s.chars().count() > MAX_TASK_LABEL_LENGTH {
        return Err(format!(
            "task label must be at most {} characters",
            MAX_TASK_LABEL_LENGTH
        ));
    }
    Ok(s.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["studyhive"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
            assert!(cli.socket.is_none());
        }

        #[test]
        fn test_parse_short_verbose_flag() {
            let cli = Cli::parse_from(["studyhive", "-v", "status"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Status)));
        }

        #[test]
        fn test_parse_global_paths_after_subcommand() {
            let cli = Cli::parse_from([
                "studyhive",
                "status",
                "--socket",
                "/tmp/s.sock",
                "--data-dir",
                "/tmp/data",
            ]);
            assert_eq!(cli.socket, Some(PathBuf::from("/tmp/s.sock")));
            assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/data")));
        }

        #[test]
        fn test_parse_simple_commands() {
            let cases: [(&str, fn(&Commands) -> bool); 8] = [
                ("daemon", |c| matches!(c, Commands::Daemon)),
                ("start", |c| matches!(c, Commands::Start)),
                ("pause", |c| matches!(c, Commands::Pause)),
                ("stop", |c| matches!(c, Commands::Stop)),
                ("reset", |c| matches!(c, Commands::Reset)),
                ("clear-tasks", |c| matches!(c, Commands::ClearTasks)),
                ("status", |c| matches!(c, Commands::Status)),
                ("stats", |c| matches!(c, Commands::Stats)),
            ];

            for (arg, check) in cases {
                let cli = Cli::parse_from(["studyhive", arg]);
                assert!(check(cli.command.as_ref().unwrap()), "{}", arg);
            }
        }

        #[test]
        fn test_resume_is_alias_for_start() {
            let cli = Cli::parse_from(["studyhive", "resume"]);
            assert!(matches!(cli.command, Some(Commands::Start)));
        }

        #[test]
        fn test_parse_mode() {
            let cli = Cli::parse_from(["studyhive", "mode", "short-break"]);
            match cli.command {
                Some(Commands::Mode { mode }) => {
                    assert_eq!(TimerMode::from(mode), TimerMode::ShortBreak)
                }
                _ => panic!("Expected Mode command"),
            }
        }

        #[test]
        fn test_parse_completions_zsh() {
            let cli = Cli::parse_from(["studyhive", "completions", "zsh"]);
            assert!(matches!(
                cli.command,
                Some(Commands::Completions {
                    shell: clap_complete::Shell::Zsh
                })
            ));
        }
    }

    // ------------------------------------------------------------------------
    // Task Tests
    // ------------------------------------------------------------------------

    mod task_args_tests {
        use super::*;

        fn parse_task(args: &[&str]) -> TaskArgs {
            let mut argv = vec!["studyhive", "task"];
            argv.extend_from_slice(args);
            match Cli::parse_from(argv).command {
                Some(Commands::Task(task)) => task,
                _ => panic!("Expected Task command"),
            }
        }

        #[test]
        fn test_parse_task_label() {
            let task = parse_task(&["Read chapter 4"]);
            assert_eq!(task.to_label(), Some("Read chapter 4".to_string()));
        }

        #[test]
        fn test_parse_task_clear() {
            let task = parse_task(&["--clear"]);
            assert!(task.to_label().is_none());
        }

        #[test]
        fn test_task_requires_label_or_clear() {
            assert!(Cli::try_parse_from(["studyhive", "task"]).is_err());
        }

        #[test]
        fn test_task_label_conflicts_with_clear() {
            assert!(Cli::try_parse_from(["studyhive", "task", "x", "--clear"]).is_err());
        }

        #[test]
        fn test_validate_task_label() {
            assert!(validate_task_label("Essay").is_ok());
            assert!(validate_task_label("").is_err());
            assert!(validate_task_label("   ").is_err());
            assert!(validate_task_label(&"a".repeat(100)).is_ok());
            assert!(validate_task_label(&"a".repeat(101)).is_err());
            assert!(validate_task_label(&"é".repeat(100)).is_ok());
        }
    }

    // ------------------------------------------------------------------------
    // Settings Tests
    // ------------------------------------------------------------------------

    mod settings_args_tests {
        use super::*;

        fn parse_settings(args: &[&str]) -> Result<SettingsArgs, clap::Error> {
            let mut argv = vec!["studyhive", "settings"];
            argv.extend_from_slice(args);
            match Cli::try_parse_from(argv)?.command {
                Some(Commands::Settings(settings)) => Ok(settings),
                _ => panic!("Expected Settings command"),
            }
        }

        #[test]
        fn test_no_options_is_empty_patch() {
            let settings = parse_settings(&[]).unwrap();
            assert!(settings.to_patch().is_empty());
        }

        #[test]
        fn test_options_to_patch() {
            let settings = parse_settings(&[
                "--focus",
                "50",
                "--interval",
                "3",
                "--auto-start-breaks",
                "true",
                "--sound",
                "false",
            ])
            .unwrap();

            let patch = settings.to_patch();
            assert_eq!(patch.focus_duration, Some(50));
            assert_eq!(patch.long_break_interval, Some(3));
            assert_eq!(patch.auto_start_breaks, Some(true));
            assert_eq!(patch.sound_enabled, Some(false));
            assert!(patch.short_break_duration.is_none());
            assert!(patch.notifications_enabled.is_none());
        }

        #[test]
        fn test_out_of_range_values_rejected() {
            assert!(parse_settings(&["--focus", "0"]).is_err());
            assert!(parse_settings(&["--focus", "121"]).is_err());
            assert!(parse_settings(&["--short-break", "61"]).is_err());
            assert!(parse_settings(&["--interval", "13"]).is_err());
            assert!(parse_settings(&["--focus", "abc"]).is_err());
        }

        #[test]
        fn test_bool_requires_value() {
            assert!(parse_settings(&["--sound"]).is_err());
            assert!(parse_settings(&["--sound", "maybe"]).is_err());
        }
    }
}
