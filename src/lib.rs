pub mod cli;
pub mod core;
pub mod store;

pub use crate::core::config;

use crate::core::config::AppConfig;
use crate::core::fund::{Category, SchemeType};
use crate::core::governance::DataGovernanceService;
use crate::core::ranking::{RankingCriteria, RankingService, RollingPeriod};
use crate::store::funds::MemoryFundStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Validate {
        fund_id: String,
    },
    ValidateAll,
    Outliers {
        category: Category,
    },
    Freshness,
    AutoHide,
    Sweep,
    Top {
        limit: usize,
        category: Option<Category>,
        scheme_type: Option<SchemeType>,
        min_aum: Option<f64>,
    },
    Category {
        category: Category,
        limit: usize,
    },
    SubCategory {
        category: Category,
        sub_category: String,
        limit: usize,
    },
    RiskAdjusted {
        limit: usize,
    },
    Rolling {
        period: RollingPeriod,
        limit: usize,
    },
    AllCategories {
        limit: Option<usize>,
    },
}

/// Where to read configuration and funds from, and how to print results.
#[derive(Debug, Clone, Default)]
pub struct RunOptions<'a> {
    pub config_path: Option<&'a str>,
    pub snapshot_path: Option<&'a str>,
    pub json: bool,
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => {
            let path = AppConfig::default_config_path()?;
            if path.exists() {
                AppConfig::load_from_path(&path)
            } else {
                debug!("No config at {}, using defaults", path.display());
                Ok(AppConfig::default())
            }
        }
    }
}

pub async fn run_command(command: AppCommand, options: &RunOptions<'_>) -> Result<()> {
    info!("fundwatch starting...");

    let config = load_config(options.config_path)?;
    debug!("Loaded config: {config:#?}");

    let snapshot = config.snapshot_path(options.snapshot_path)?;
    let store = Arc::new(MemoryFundStore::load_snapshot(&snapshot)?);
    info!("Loaded {} funds from {}", store.len().await, snapshot.display());

    let json = options.json;
    match command {
        AppCommand::Validate { fund_id } => {
            let governance = DataGovernanceService::with_store(store);
            cli::governance::validate(&governance, &fund_id, json).await
        }
        AppCommand::ValidateAll => {
            let governance = DataGovernanceService::with_store(store);
            cli::governance::validate_all(&governance, json).await
        }
        AppCommand::Outliers { category } => {
            let governance = DataGovernanceService::with_store(store);
            cli::governance::outliers(&governance, category, json).await
        }
        AppCommand::Freshness => {
            let governance = DataGovernanceService::with_store(store);
            cli::governance::freshness(&governance, json).await
        }
        AppCommand::AutoHide => cli::governance::auto_hide(store, json).await,
        AppCommand::Sweep => {
            let governance = DataGovernanceService::with_store(store);
            cli::governance::sweep(&governance, json).await
        }
        ranking_command => {
            let rankings = RankingService::with_store(store, config.ranking.cache_ttl());
            run_ranking_command(ranking_command, &rankings, &config, json).await
        }
    }
}

async fn run_ranking_command(
    command: AppCommand,
    rankings: &RankingService,
    config: &AppConfig,
    json: bool,
) -> Result<()> {
    match command {
        AppCommand::Top {
            limit,
            category,
            scheme_type,
            min_aum,
        } => {
            let criteria = RankingCriteria {
                category,
                scheme_type,
                min_aum,
                ..Default::default()
            };
            cli::rankings::top(rankings, limit, criteria, json).await
        }
        AppCommand::Category { category, limit } => {
            cli::rankings::category(rankings, category, limit, json).await
        }
        AppCommand::SubCategory {
            category,
            sub_category,
            limit,
        } => cli::rankings::sub_category(rankings, category, &sub_category, limit, json).await,
        AppCommand::RiskAdjusted { limit } => {
            cli::rankings::risk_adjusted(rankings, limit, json).await
        }
        AppCommand::Rolling { period, limit } => {
            cli::rankings::rolling(rankings, period, limit, json).await
        }
        AppCommand::AllCategories { limit } => {
            let per_category = limit.unwrap_or(config.ranking.per_category_limit);
            cli::rankings::all_categories(rankings, per_category, json).await
        }
        other => anyhow::bail!("{other:?} is not a ranking command"),
    }
}
