//! StudyHive - a study timer for the terminal
//!
//! Alternate focus sessions with short and long breaks:
//! - 25 minutes of focused study
//! - 5 minutes of short break
//! - 15 minutes of long break after every 4 sessions

use anyhow::Result;
use clap::{CommandFactory, Parser};

use studyhive::cli::{Cli, Commands, Display, IpcClient};
use studyhive::{daemon, AppConfig};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        generate_completions(shell);
        return Ok(());
    }

    let config = AppConfig::load(cli.data_dir, cli.socket)?;
    if let Commands::Daemon = command {
        return daemon::run(&config).await;
    }

    let client = IpcClient::with_socket_path(config.socket_path.clone());
    match command {
        Commands::Start => Display::show_result(&client.start().await?),
        Commands::Pause => Display::show_result(&client.pause().await?),
        Commands::Stop => Display::show_result(&client.stop().await?),
        Commands::Reset => Display::show_result(&client.reset().await?),
        Commands::Mode { mode } => Display::show_result(&client.switch_mode(mode.into()).await?),
        Commands::Task(args) => Display::show_result(&client.set_task(args.to_label()).await?),
        Commands::ClearTasks => Display::show_result(&client.clear_tasks().await?),
        Commands::Settings(args) => {
            Display::show_settings(&client.update_settings(args.to_patch()).await?)
        }
        Commands::Status => Display::show_status(&client.status().await?),
        Commands::Stats => Display::show_stats(&client.status().await?),
        Commands::Daemon | Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
