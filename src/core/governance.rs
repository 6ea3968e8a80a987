//! Data governance service: validation, outlier detection, freshness and the
//! zero missing data visibility policy.

use crate::core::error::{GovernanceError, Result};
use crate::core::freshness::{self, DataFreshnessReport, Freshness, FreshnessStats};
use crate::core::fund::{Category, VisibilityUpdate};
use crate::core::outlier::{self, MIN_PEER_GROUP, OutlierDetectionResult};
use crate::core::store::FundStore;
use crate::core::validation::{self, Severity, ValidationResult, ValidationStats};
use crate::core::visibility;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a full governance pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceSummary {
    pub validation: ValidationStats,
    pub freshness: FreshnessStats,
    pub hidden_count: usize,
    /// Up to five funds with critical issues, in store order.
    pub critical_funds: Vec<ValidationResult>,
}

#[derive(Default)]
pub struct DataGovernanceService {
    store: Option<Arc<dyn FundStore>>,
}

impl DataGovernanceService {
    /// Creates a service with no store attached; every operation fails until
    /// [`DataGovernanceService::initialize`] is called.
    pub fn new() -> Self {
        Self { store: None }
    }

    pub fn with_store(store: Arc<dyn FundStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn initialize(&mut self, store: Arc<dyn FundStore>) {
        self.store = Some(store);
        debug!("Data governance service initialized");
    }

    fn store(&self) -> Result<&Arc<dyn FundStore>> {
        self.store
            .as_ref()
            .ok_or(GovernanceError::NotInitialized("Data governance"))
    }

    /// Validates one fund. An unknown id is reported as an invalid result,
    /// not as an error.
    pub async fn validate_fund(&self, fund_id: &str) -> Result<ValidationResult> {
        let store = self.store()?;
        let now = Utc::now();

        match store.find_one(fund_id).await? {
            Some(fund) => Ok(validation::validate_record(&fund, now)),
            None => {
                debug!("Fund {} not found for validation", fund_id);
                Ok(validation::not_found(fund_id, now))
            }
        }
    }

    /// Validates every active fund and keeps those that are invalid or carry
    /// any issue.
    pub async fn validate_all_funds(&self) -> Result<Vec<ValidationResult>> {
        self.validate_all_funds_with_progress(&|_, _| {}).await
    }

    /// Like [`Self::validate_all_funds`], calling `update_callback` with the
    /// number of funds validated so far and the number of active funds.
    pub async fn validate_all_funds_with_progress(
        &self,
        update_callback: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<Vec<ValidationResult>> {
        let store = self.store()?;
        let funds = store.find_many(&|f| f.is_active).await?;
        let now = Utc::now();

        let mut results = Vec::new();
        for (i, fund) in funds.iter().enumerate() {
            let result = validation::validate_record(fund, now);
            if !result.is_valid || !result.issues.is_empty() {
                results.push(result);
            }
            update_callback(i + 1, funds.len());
        }

        info!(
            "Validated {} funds, found {} with issues",
            funds.len(),
            results.len()
        );
        Ok(results)
    }

    /// Flags visible, active funds in `category` whose metrics sit more than
    /// three standard deviations from the peer median.
    pub async fn detect_outliers(&self, category: Category) -> Result<Vec<OutlierDetectionResult>> {
        let store = self.store()?;
        let peers = store
            .find_many(&|f| f.category == category && f.is_active && f.is_publicly_visible)
            .await?;

        if peers.len() < MIN_PEER_GROUP {
            warn!(
                "Not enough funds in {} for outlier detection ({} < {})",
                category,
                peers.len(),
                MIN_PEER_GROUP
            );
            return Ok(Vec::new());
        }

        let results = outlier::find_outliers(&peers);
        debug!(
            "Outlier detection for {}: {} of {} funds flagged",
            category,
            results.len(),
            peers.len()
        );
        Ok(results)
    }

    /// Reports every active fund whose data is not fresh.
    pub async fn generate_freshness_report(&self) -> Result<Vec<DataFreshnessReport>> {
        let store = self.store()?;
        let funds = store.find_many(&|f| f.is_active).await?;
        let now = Utc::now();

        Ok(funds
            .iter()
            .map(|f| freshness::report_for(f, now))
            .filter(|r| r.overall_freshness != Freshness::Fresh)
            .collect())
    }

    /// Hides every active fund that violates the zero missing data policy and
    /// returns how many were hidden. Safe to run repeatedly.
    pub async fn auto_hide_incomplete_funds(&self) -> Result<usize> {
        let store = self.store()?;
        let incomplete = store.find_many(&visibility::violates_policy).await?;

        let mut hidden_count = 0;
        for fund in &incomplete {
            let reason = visibility::hide_reason(fund);
            info!(fund_id = %fund.fund_id, %reason, "Hiding fund");

            let update = VisibilityUpdate {
                is_publicly_visible: false,
                visibility_reason: reason,
                last_updated: Utc::now(),
            };
            if store.set_visibility(&fund.fund_id, update).await? {
                hidden_count += 1;
            }
        }

        info!(
            "Auto-hidden {} funds with insufficient data quality",
            hidden_count
        );
        Ok(hidden_count)
    }

    /// Validation, freshness reporting and policy enforcement in one pass.
    pub async fn run_governance_sweep(&self) -> Result<GovernanceSummary> {
        let results = self.validate_all_funds().await?;
        let validation = ValidationStats::from_results(&results);
        let critical_funds: Vec<ValidationResult> = results
            .into_iter()
            .filter(|r| r.has(Severity::Critical))
            .take(5)
            .collect();
        if validation.critical > 0 {
            warn!("{} funds have critical issues", validation.critical);
        }

        let report = self.generate_freshness_report().await?;
        let freshness = FreshnessStats::from_reports(&report);
        info!(
            "{} funds have stale data, {} critically",
            freshness.total_stale, freshness.critical
        );

        let hidden_count = self.auto_hide_incomplete_funds().await?;

        Ok(GovernanceSummary {
            validation,
            freshness,
            hidden_count,
            critical_funds,
        })
    }
}
