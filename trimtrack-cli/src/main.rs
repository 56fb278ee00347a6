//! Trimtrack CLI - weight-loss program tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    attendance, batches, calc, demo, exercises, import, logs, report, session, status, trainers,
    users,
};
use trimtrack_core::services::LogEvent;
use trimtrack_core::OperationResult;

/// Trimtrack - weight-loss program tracking in your terminal
#[derive(Parser)]
#[command(name = "tt", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store contents and the current scope
    Status,

    /// Manage members and their daily logs
    Users {
        #[command(subcommand)]
        command: users::UsersCommands,
    },

    /// Mark attendance and view attendance statistics
    Attendance {
        #[command(subcommand)]
        command: attendance::AttendanceCommands,
    },

    /// Manage trainers
    Trainers {
        #[command(subcommand)]
        command: trainers::TrainersCommands,
    },

    /// Manage batches and the active batch
    Batches {
        #[command(subcommand)]
        command: batches::BatchesCommands,
    },

    /// Manage the exercise library, groups and weekly plan
    Exercises {
        #[command(subcommand)]
        command: exercises::ExercisesCommands,
    },

    /// Progress reports over the current scope
    Report {
        #[arg(value_enum, default_value_t)]
        kind: report::ReportKind,
    },

    /// Nutrient plan calculator
    Calc(calc::CalcArgs),

    /// Acting identity and active batch
    Session {
        #[command(subcommand)]
        command: session::SessionCommands,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Import a JSON storage dump
    Import {
        /// Path to the dump
        file: PathBuf,
        /// Remove existing data before importing
        #[arg(long)]
        replace: bool,
        /// Validate and report without writing
        #[arg(long)]
        preview: bool,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Export the store as a JSON storage dump
    Export {
        /// Output file (default stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: Option<logs::LogsCommands>,
    },
}

impl Commands {
    /// Name recorded in the event log; never includes arguments
    fn name(&self) -> &'static str {
        match self {
            Commands::Status => "status",
            Commands::Users { .. } => "users",
            Commands::Attendance { .. } => "attendance",
            Commands::Trainers { .. } => "trainers",
            Commands::Batches { .. } => "batches",
            Commands::Exercises { .. } => "exercises",
            Commands::Report { .. } => "report",
            Commands::Calc(_) => "calc",
            Commands::Session { .. } => "session",
            Commands::Demo { .. } => "demo",
            Commands::Import { .. } => "import",
            Commands::Export { .. } => "export",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let name = cli.command.name();
    let json = cli.json;
    let logger = commands::get_logger();
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string()),
            );
            if json {
                let failure: OperationResult<()> =
                    OperationResult::fail(format!("{e:#}")).with_context("command", name.into());
                if commands::print_json(&failure).is_err() {
                    output::error(&format!("{e:#}"));
                }
            } else {
                output::error(&format!("{e:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Status => status::run(json),
        Commands::Users { command } => users::run(command, json),
        Commands::Attendance { command } => attendance::run(command, json),
        Commands::Trainers { command } => trainers::run(command, json),
        Commands::Batches { command } => batches::run(command, json),
        Commands::Exercises { command } => exercises::run(command, json),
        Commands::Report { kind } => report::run(kind, json),
        Commands::Calc(args) => calc::run(args, json),
        Commands::Session { command } => session::run(command, json),
        Commands::Demo { command } => demo::run(command, json),
        Commands::Import {
            file,
            replace,
            preview,
            force,
        } => import::run_import(file, replace, preview, force, json),
        Commands::Export { output } => import::run_export(output),
        Commands::Logs { command } => logs::run(command, json),
    }
}
