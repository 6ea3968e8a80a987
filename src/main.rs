use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundwatch::core::fund::{Category, SchemeType};
use fundwatch::core::log::init_logging;
use fundwatch::core::ranking::RollingPeriod;
use fundwatch::{AppCommand, RunOptions};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Fund snapshot to read, overriding the configured one
    #[arg(long, global = true)]
    snapshot: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Validate a single fund
    Validate { fund_id: String },
    /// Validate every active fund and list those with issues
    ValidateAll,
    /// Detect statistical outliers within a category
    Outliers { category: Category },
    /// List funds with stale data
    Freshness,
    /// Hide funds that fail the data completeness policy
    AutoHide,
    /// Run validation, freshness and visibility enforcement together
    Sweep,
    /// Top funds by overall score
    Top {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        scheme_type: Option<SchemeType>,
        /// Minimum AUM in crores
        #[arg(long)]
        min_aum: Option<f64>,
    },
    /// Category leaders
    Category {
        category: Category,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Sub-category leaders
    SubCategory {
        category: Category,
        sub_category: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Rankings weighted towards risk-adjusted returns
    RiskAdjusted {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Rankings by rolling return over 2y, 3y or 5y
    Rolling {
        period: RollingPeriod,
        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },
    /// Leaders for every category
    AllCategories {
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Validate { fund_id } => AppCommand::Validate { fund_id },
            Commands::ValidateAll => AppCommand::ValidateAll,
            Commands::Outliers { category } => AppCommand::Outliers { category },
            Commands::Freshness => AppCommand::Freshness,
            Commands::AutoHide => AppCommand::AutoHide,
            Commands::Sweep => AppCommand::Sweep,
            Commands::Top {
                limit,
                category,
                scheme_type,
                min_aum,
            } => AppCommand::Top {
                limit,
                category,
                scheme_type,
                min_aum,
            },
            Commands::Category { category, limit } => AppCommand::Category { category, limit },
            Commands::SubCategory {
                category,
                sub_category,
                limit,
            } => AppCommand::SubCategory {
                category,
                sub_category,
                limit,
            },
            Commands::RiskAdjusted { limit } => AppCommand::RiskAdjusted { limit },
            Commands::Rolling { period, limit } => AppCommand::Rolling { period, limit },
            Commands::AllCategories { limit } => AppCommand::AllCategories { limit },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = RunOptions {
        config_path: cli.config_path.as_deref(),
        snapshot_path: cli.snapshot.as_deref(),
        json: cli.json,
    };

    let result = match cli.command {
        Some(Commands::Setup) => fundwatch::cli::setup::setup(),
        Some(cmd) => fundwatch::run_command(cmd.into(), &options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
