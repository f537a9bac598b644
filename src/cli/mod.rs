pub mod daemon_path;
pub mod log_now;
pub mod process;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log_now::{process_log_command, LogCommand};
use process::{kill_previous_daemons, restart_daemon};
use report::{process_compare_command, process_report_command, CompareCommand, ReportCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::start_daemon,
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Quarterlog", version, long_about = None)]
#[command(about = "Quarter-hour activity logger with daily reports", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start the prompt daemon for the application")]
    Init {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(
        about = "Run the daemon directly in current console. Used for creating a daemon internally and for debugging"
    )]
    Serve {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(about = "Stop currently running daemon.")]
    Stop {},
    #[command(about = "Record what you are doing right now")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Show how a day split across the category set")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Compare the productive score of two days")]
    Compare {
        #[command(flatten)]
        command: CompareCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    match args.commands {
        Commands::Init { dir } => restart_daemon(dir),
        Commands::Stop {} => {
            kill_previous_daemons();
            Ok(())
        }
        Commands::Serve { dir } => {
            let dir = dir.map_or_else(create_application_default_path, Ok)?;
            start_daemon(dir).await
        }
        Commands::Log { command } => process_log_command(command).await,
        Commands::Report { command } => process_report_command(command).await,
        Commands::Compare { command } => process_compare_command(command).await,
    }
}
