//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod error;
pub mod freshness;
pub mod fund;
pub mod governance;
pub mod log;
pub mod outlier;
pub mod ranking;
pub mod scoring;
pub mod stats;
pub mod store;
pub mod validation;
pub mod visibility;

// Re-export main types for cleaner imports
pub use error::{GovernanceError, Result};
pub use fund::{Category, Fund, SchemeType, VisibilityUpdate};
pub use governance::{DataGovernanceService, GovernanceSummary};
pub use ranking::{RankedFund, RankingCriteria, RankingService, ReturnPeriod, RollingPeriod};
pub use store::FundStore;
