//! Staleness classification for NAV, AUM and return figures.

use crate::core::fund::Fund;
use crate::core::stats::age_in_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Age limits in days: beyond `stale` a figure is stale, beyond `critical`
/// it is critically out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeThreshold {
    pub stale: i64,
    pub critical: i64,
}

pub const NAV_AGE: AgeThreshold = AgeThreshold {
    stale: 2,
    critical: 7,
};
pub const AUM_AGE: AgeThreshold = AgeThreshold {
    stale: 30,
    critical: 60,
};
pub const RETURNS_AGE: AgeThreshold = AgeThreshold {
    stale: 3,
    critical: 7,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Freshness {
    Fresh,
    Stale,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFreshnessReport {
    pub fund_id: String,
    pub fund_name: String,
    pub nav_age: i64,
    pub aum_age: i64,
    pub returns_age: i64,
    pub overall_freshness: Freshness,
}

pub fn classify(nav_age: i64, aum_age: i64, returns_age: i64) -> Freshness {
    if nav_age > NAV_AGE.critical || aum_age > AUM_AGE.critical || returns_age > RETURNS_AGE.critical
    {
        Freshness::Critical
    } else if nav_age > NAV_AGE.stale || aum_age > AUM_AGE.stale || returns_age > RETURNS_AGE.stale
    {
        Freshness::Stale
    } else {
        Freshness::Fresh
    }
}

pub fn report_for(fund: &Fund, now: DateTime<Utc>) -> DataFreshnessReport {
    let nav_age = age_in_days(fund.nav_date, now);
    let aum_age = age_in_days(fund.aum_date, now);
    let returns_age = age_in_days(fund.last_updated, now);

    DataFreshnessReport {
        fund_id: fund.fund_id.clone(),
        fund_name: fund.name.clone(),
        nav_age,
        aum_age,
        returns_age,
        overall_freshness: classify(nav_age, aum_age, returns_age),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessStats {
    pub total_stale: usize,
    pub critical: usize,
    pub stale: usize,
}

impl FreshnessStats {
    pub fn from_reports(reports: &[DataFreshnessReport]) -> Self {
        let count = |level: Freshness| {
            reports
                .iter()
                .filter(|r| r.overall_freshness == level)
                .count()
        };
        Self {
            total_stale: reports.len(),
            critical: count(Freshness::Critical),
            stale: count(Freshness::Stale),
        }
    }
}
