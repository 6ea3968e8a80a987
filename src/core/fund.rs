//! Fund records as held by the record store

use crate::core::error::GovernanceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Equity,
    Debt,
    Hybrid,
    Elss,
    Commodity,
    Etf,
    Index,
    SolutionOriented,
    International,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Equity,
        Category::Debt,
        Category::Hybrid,
        Category::Elss,
        Category::Commodity,
        Category::Index,
        Category::Etf,
        Category::SolutionOriented,
        Category::International,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Equity => "equity",
            Category::Debt => "debt",
            Category::Hybrid => "hybrid",
            Category::Elss => "elss",
            Category::Commodity => "commodity",
            Category::Etf => "etf",
            Category::Index => "index",
            Category::SolutionOriented => "solution_oriented",
            Category::International => "international",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| GovernanceError::InvalidInput(format!("unknown category: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeType {
    Direct,
    Regular,
}

impl Display for SchemeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemeType::Direct => write!(f, "direct"),
            SchemeType::Regular => write!(f, "regular"),
        }
    }
}

impl FromStr for SchemeType {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(SchemeType::Direct),
            "regular" => Ok(SchemeType::Regular),
            _ => Err(GovernanceError::InvalidInput(format!(
                "unknown scheme type: {s}"
            ))),
        }
    }
}

/// Trailing returns in percent. Every horizon is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Returns {
    pub day: Option<f64>,
    pub week: Option<f64>,
    pub month: Option<f64>,
    pub three_month: Option<f64>,
    pub six_month: Option<f64>,
    pub one_year: Option<f64>,
    pub three_year: Option<f64>,
    pub five_year: Option<f64>,
    pub since_inception: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub sharpe_ratio: Option<f64>,
    pub standard_deviation: Option<f64>,
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
    pub sortino: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub percentage: f64,
}

/// Quality markers written by the ingestion process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCompleteness {
    #[serde(default, deserialize_with = "lenient::number")]
    pub completeness_score: f64,
    #[serde(default)]
    pub has_complete_returns: bool,
    #[serde(default, rename = "hasValidAUM")]
    pub has_valid_aum: bool,
}

impl Default for DataCompleteness {
    fn default() -> Self {
        Self {
            completeness_score: 0.0,
            has_complete_returns: false,
            has_valid_aum: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    pub fund_id: String,
    #[serde(default)]
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub sub_category: String,
    #[serde(default)]
    pub scheme_type: Option<SchemeType>,
    #[serde(default)]
    pub fund_house: String,

    #[serde(default, deserialize_with = "lenient::number")]
    pub current_nav: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub previous_nav: f64,
    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub nav_date: DateTime<Utc>,

    #[serde(default, deserialize_with = "lenient::number")]
    pub aum: f64,
    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub aum_date: DateTime<Utc>,
    #[serde(default)]
    pub expense_ratio: Option<f64>,

    #[serde(default)]
    pub returns: Returns,
    #[serde(default)]
    pub risk_metrics: RiskMetrics,
    #[serde(default)]
    pub holdings: Vec<Holding>,

    #[serde(default)]
    pub fund_manager: Option<String>,
    #[serde(default)]
    pub fund_manager_experience: Option<f64>,
    #[serde(default)]
    pub fund_manager_tenure: Option<f64>,

    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub launch_date: DateTime<Utc>,
    #[serde(default = "lenient::epoch", deserialize_with = "lenient::timestamp")]
    pub last_updated: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_publicly_visible: bool,
    #[serde(default)]
    pub data_completeness: DataCompleteness,
    #[serde(default)]
    pub visibility_reason: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Field readers that turn `null` or malformed values into zero values
/// instead of failing the whole record.
mod lenient {
    use chrono::{DateTime, Utc};
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Timestamp(DateTime<Utc>),
        Other(IgnoredAny),
    }

    /// Numbers and numeric strings are kept, anything else reads as 0.
    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match RawNumber::deserialize(deserializer)? {
            RawNumber::Number(n) => Some(n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
            RawNumber::Other(_) => None,
        };
        Ok(value.filter(|n| n.is_finite()).unwrap_or(0.0))
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Timestamp(t) => Ok(t),
            RawTimestamp::Other(_) => Ok(epoch()),
        }
    }

    /// Missing dates read as the Unix epoch, which every freshness check treats as stale.
    pub fn epoch() -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }
}

/// The single write the core performs against the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityUpdate {
    pub is_publicly_visible: bool,
    pub visibility_reason: String,
    pub last_updated: DateTime<Utc>,
}

impl Fund {
    pub fn apply_visibility(&mut self, update: &VisibilityUpdate) {
        self.is_publicly_visible = update.is_publicly_visible;
        self.visibility_reason = Some(update.visibility_reason.clone());
        self.last_updated = update.last_updated;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    /// A clean, publicly visible equity fund that passes every check.
    pub fn sample_fund(id: &str) -> Fund {
        let now = Utc::now();
        Fund {
            fund_id: id.to_string(),
            name: format!("Fund {id}"),
            category: Category::Equity,
            sub_category: "Large Cap".to_string(),
            scheme_type: Some(SchemeType::Direct),
            fund_house: "Rust AMC".to_string(),
            current_nav: 100.0,
            previous_nav: 99.0,
            nav_date: now,
            aum: 1500.0,
            aum_date: now,
            expense_ratio: Some(1.0),
            returns: Returns {
                one_year: Some(15.0),
                three_year: Some(14.0),
                five_year: Some(13.0),
                ..Default::default()
            },
            risk_metrics: RiskMetrics {
                sharpe_ratio: Some(1.5),
                sortino: Some(1.5),
                ..Default::default()
            },
            holdings: vec![
                Holding {
                    name: Some("A".to_string()),
                    percentage: 50.0,
                },
                Holding {
                    name: Some("B".to_string()),
                    percentage: 45.0,
                },
            ],
            fund_manager: Some("R. Ferris".to_string()),
            fund_manager_experience: Some(12.0),
            fund_manager_tenure: Some(5.0),
            launch_date: now - Duration::days(365 * 5),
            last_updated: now,
            is_active: true,
            is_publicly_visible: true,
            data_completeness: DataCompleteness {
                completeness_score: 90.0,
                has_complete_returns: true,
                has_valid_aum: true,
            },
            visibility_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!("equity".parse::<Category>().unwrap(), Category::Equity);
        assert_eq!(
            "Solution-Oriented".parse::<Category>().unwrap(),
            Category::SolutionOriented
        );
        assert!("crypto".parse::<Category>().is_err());
    }

    #[test]
    fn test_fund_deserialization() {
        let json = r#"{
            "fundId": "INF001",
            "name": "Gilt Fund",
            "category": "debt",
            "subCategory": "Gilt",
            "schemeType": "regular",
            "currentNav": 42.5,
            "previousNav": 42.4,
            "navDate": "2026-10-18T00:00:00Z",
            "aum": 800,
            "aumDate": "2026-10-01T00:00:00Z",
            "returns": { "oneYear": 7.1, "threeYear": null },
            "riskMetrics": { "sharpeRatio": 0.9 },
            "launchDate": "2015-04-01T00:00:00Z",
            "lastUpdated": "2026-10-18T00:00:00Z",
            "isPubliclyVisible": true,
            "dataCompleteness": {
                "completenessScore": 75,
                "hasCompleteReturns": true,
                "hasValidAUM": true
            }
        }"#;

        let fund: Fund = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(fund.category, Category::Debt);
        assert_eq!(fund.scheme_type, Some(SchemeType::Regular));
        assert_eq!(fund.returns.one_year, Some(7.1));
        assert!(fund.returns.three_year.is_none());
        assert!(fund.is_active);
        assert!(fund.holdings.is_empty());
        assert!(fund.data_completeness.has_valid_aum);
        assert_eq!(fund.data_completeness.completeness_score, 75.0);
    }

    #[test]
    fn test_malformed_fields_read_as_zero() {
        let json = r#"{
            "fundId": "INF002",
            "category": "equity",
            "currentNav": "n/a",
            "previousNav": null,
            "navDate": null,
            "aumDate": "last week",
            "holdings": [{ "name": "X", "percentage": null }, { "percentage": "12.5" }],
            "launchDate": "2015-04-01T00:00:00Z",
            "dataCompleteness": { "completenessScore": "unknown" }
        }"#;

        let fund: Fund = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(fund.current_nav, 0.0);
        assert_eq!(fund.previous_nav, 0.0);
        assert_eq!(fund.aum, 0.0);
        assert_eq!(fund.nav_date, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(fund.aum_date, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(fund.last_updated, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(fund.launch_date.to_rfc3339(), "2015-04-01T00:00:00+00:00");
        assert_eq!(fund.holdings[0].percentage, 0.0);
        assert_eq!(fund.holdings[1].percentage, 12.5);
        assert_eq!(fund.data_completeness.completeness_score, 0.0);
        assert!(!fund.data_completeness.has_valid_aum);
    }
}
