//! registra CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "registra", version, about = "Academic evaluation and grade engine")]
struct Cli {
    /// Path to the JSON data file
    #[arg(long, global = true, default_value = "registra.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter scheme file
    Init,

    /// Write the demo data set to the data file
    Seed,

    /// Validate a scheme TOML file
    Validate {
        /// Path to the scheme file
        #[arg(long)]
        scheme: PathBuf,
    },

    /// Apply a scheme TOML file to its course
    Configure {
        /// Path to the scheme file
        #[arg(long)]
        scheme: PathBuf,
    },

    /// Record one score for an enrollment
    Record {
        /// Enrollment id
        #[arg(long)]
        enrollment: Uuid,

        /// Evaluation label (e.g. "Midterm 1")
        #[arg(long)]
        label: String,

        /// Score on the 0-20 scale
        #[arg(long)]
        value: f64,

        /// Weight snapshot, percent
        #[arg(long)]
        weight: f64,

        /// Free-text note
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record one sub-item of a split evaluation
    RecordPart {
        /// Enrollment id
        #[arg(long)]
        enrollment: Uuid,

        /// Label of the configured evaluation type
        #[arg(long)]
        label: String,

        /// Which sub-item this is, 1-based
        #[arg(long)]
        part: u32,

        /// Total number of sub-items
        #[arg(long)]
        of: u32,

        /// Score on the 0-20 scale
        #[arg(long)]
        value: f64,
    },

    /// Import scores from a CSV file
    Import {
        /// CSV with enrollment_id,label,value,weight[,notes] columns
        #[arg(long)]
        csv: PathBuf,
    },

    /// Show an enrollment's ledger and computed grade
    Grades {
        /// Enrollment id
        #[arg(long)]
        enrollment: Uuid,
    },

    /// Open a planned period (runs the promotion sweep)
    OpenPeriod {
        /// Period name (e.g. "2026-I") or id
        #[arg(long)]
        period: String,
    },

    /// Close the active period and freeze final grades
    ClosePeriod {
        /// Period name (e.g. "2026-I") or id
        #[arg(long)]
        period: String,

        /// Close even if required entries are missing
        #[arg(long)]
        force: bool,
    },

    /// Show the merit ranking of a period
    Ranking {
        /// Period name or id
        #[arg(long)]
        period: String,
    },

    /// Write a period report
    Report {
        /// Period name or id
        #[arg(long)]
        period: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Output format: markdown, json
        #[arg(long, default_value = "markdown")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("registra=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let data = cli.data;

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Seed => commands::seed::execute(&data),
        Commands::Validate { scheme } => commands::validate::execute(&scheme),
        Commands::Configure { scheme } => commands::configure::execute(&data, &scheme).await,
        Commands::Record {
            enrollment,
            label,
            value,
            weight,
            notes,
        } => commands::record::execute(&data, enrollment, label, value, weight, notes).await,
        Commands::RecordPart {
            enrollment,
            label,
            part,
            of,
            value,
        } => commands::record::execute_part(&data, enrollment, &label, part, of, value).await,
        Commands::Import { csv } => commands::import::execute(&data, &csv).await,
        Commands::Grades { enrollment } => commands::grades::execute(&data, enrollment).await,
        Commands::OpenPeriod { period } => commands::period::open(&data, &period).await,
        Commands::ClosePeriod { period, force } => {
            commands::period::close(&data, &period, force).await
        }
        Commands::Ranking { period } => commands::ranking::execute(&data, &period).await,
        Commands::Report {
            period,
            output,
            format,
        } => commands::report::execute(&data, &period, &output, &format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
