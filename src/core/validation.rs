//! Per-record structural checks producing a confidence score.
//!
//! Each check is a pure function of a fund and the evaluation time, so one
//! check can never disturb another or the aggregate score.

use crate::core::fund::{Category, Fund};
use crate::core::stats::age_in_days;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const CRITICAL_PENALTY: i64 = 25;
const WARNING_PENALTY: i64 = 10;
const MIN_VALID_CONFIDENCE: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Nav,
    Returns,
    Aum,
    Holdings,
    Manager,
    Freshness,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub affected_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<ExpectedRange>,
}

impl ValidationIssue {
    fn new(
        severity: Severity,
        category: IssueCategory,
        message: impl Into<String>,
        affected_field: &str,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            affected_field: affected_field.to_string(),
            detected_value: None,
            expected_range: None,
        }
    }

    fn with_value(mut self, value: f64) -> Self {
        self.detected_value = Some(value);
        self
    }

    fn with_range(mut self, range: ExpectedRange) -> Self {
        self.expected_range = Some(range);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub fund_id: String,
    pub fund_name: String,
    pub is_valid: bool,
    pub confidence: u32,
    pub issues: Vec<ValidationIssue>,
    pub last_validated: DateTime<Utc>,
}

impl ValidationResult {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has(&self, severity: Severity) -> bool {
        self.issues.iter().any(|i| i.severity == severity)
    }
}

/// `100 - 25 per critical - 10 per warning`, clamped to `[0, 100]`.
pub fn confidence_for(critical: usize, warnings: usize) -> u32 {
    let score = 100 - CRITICAL_PENALTY * critical as i64 - WARNING_PENALTY * warnings as i64;
    score.clamp(0, 100) as u32
}

pub fn is_valid(critical: usize, confidence: u32) -> bool {
    critical == 0 && confidence >= MIN_VALID_CONFIDENCE
}

/// Result reported for an identifier the store does not know about.
pub fn not_found(fund_id: &str, now: DateTime<Utc>) -> ValidationResult {
    ValidationResult {
        fund_id: fund_id.to_string(),
        fund_name: "Unknown".to_string(),
        is_valid: false,
        confidence: 0,
        issues: vec![ValidationIssue::new(
            Severity::Critical,
            IssueCategory::Nav,
            "Fund not found",
            "fundId",
        )],
        last_validated: now,
    }
}

/// Runs all six checks against `fund` and scores the union of their issues.
pub fn validate_record(fund: &Fund, now: DateTime<Utc>) -> ValidationResult {
    let mut issues = Vec::new();
    issues.extend(check_nav(fund, now));
    issues.extend(check_returns(fund));
    issues.extend(check_aum(fund, now));
    issues.extend(check_holdings(fund));
    issues.extend(check_manager(fund));
    issues.extend(check_freshness(fund, now));

    let mut result = ValidationResult {
        fund_id: fund.fund_id.clone(),
        fund_name: fund.name.clone(),
        is_valid: false,
        confidence: 0,
        issues,
        last_validated: now,
    };
    let critical = result.count(Severity::Critical);
    result.confidence = confidence_for(critical, result.count(Severity::Warning));
    result.is_valid = is_valid(critical, result.confidence);
    result
}

pub fn check_nav(fund: &Fund, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let nav = fund.current_nav;

    if nav <= 0.0 {
        issues.push(
            ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Nav,
                "NAV must be positive",
                "currentNav",
            )
            .with_value(nav),
        );
    }

    if !(5.0..=10000.0).contains(&nav) {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Nav,
                "NAV outside typical range",
                "currentNav",
            )
            .with_value(nav)
            .with_range(ExpectedRange {
                min: 10.0,
                max: 1000.0,
            }),
        );
    }

    let nav_age = age_in_days(fund.nav_date, now);
    if nav_age > 7 {
        issues.push(ValidationIssue::new(
            Severity::Critical,
            IssueCategory::Freshness,
            format!("NAV data is {nav_age} days old"),
            "navDate",
        ));
    } else if nav_age > 2 {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Freshness,
            format!("NAV data is {nav_age} days old"),
            "navDate",
        ));
    }

    // previousNav of 0 yields an infinite change and is reported as unusual.
    let nav_change = ((nav - fund.previous_nav) / fund.previous_nav).abs() * 100.0;
    if nav_change > 10.0 {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Nav,
            format!("Unusual NAV change: {nav_change:.2}%"),
            "currentNav",
        ));
    }

    issues
}

/// Plausible one-year return band per category.
pub fn expected_return_range(category: Category) -> ExpectedRange {
    let (min, max) = match category {
        Category::Equity | Category::Elss | Category::Etf | Category::Index => (-30.0, 50.0),
        Category::Debt => (-5.0, 15.0),
        Category::Hybrid => (-15.0, 35.0),
        Category::Commodity | Category::International => (-40.0, 60.0),
        Category::SolutionOriented => (-20.0, 40.0),
    };
    ExpectedRange { min, max }
}

pub fn check_returns(fund: &Fund) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(one_year) = fund.returns.one_year else {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Returns,
            "Missing returns data",
            "returns",
        ));
        return issues;
    };

    let range = expected_return_range(fund.category);
    if one_year < range.min || one_year > range.max {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Returns,
                format!(
                    "1Y return ({one_year}%) outside expected range for {} funds",
                    fund.category
                ),
                "returns.oneYear",
            )
            .with_range(range),
        );
    }

    if let Some(three_year) = fund.returns.three_year {
        if (one_year - three_year).abs() > 30.0 {
            issues.push(ValidationIssue::new(
                Severity::Info,
                IssueCategory::Returns,
                format!(
                    "Large difference between 1Y ({one_year}%) and 3Y ({three_year}%) returns"
                ),
                "returns",
            ));
        }

        if one_year == 0.0 && three_year == 0.0 {
            issues.push(ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Returns,
                "All returns are zero - data likely missing",
                "returns",
            ));
        }
    }

    issues
}

pub fn check_aum(fund: &Fund, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if fund.aum <= 0.0 {
        issues.push(
            ValidationIssue::new(
                Severity::Critical,
                IssueCategory::Aum,
                "AUM must be positive",
                "aum",
            )
            .with_value(fund.aum),
        );
    }

    if fund.aum < 5.0 && fund.is_active {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Aum,
                "AUM unusually low for active fund",
                "aum",
            )
            .with_value(fund.aum),
        );
    }

    let aum_age = age_in_days(fund.aum_date, now);
    if aum_age > 60 {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Freshness,
            format!("AUM data is {aum_age} days old"),
            "aumDate",
        ));
    }

    issues
}

pub fn check_holdings(fund: &Fund) -> Vec<ValidationIssue> {
    if fund.holdings.is_empty() {
        return vec![ValidationIssue::new(
            Severity::Info,
            IssueCategory::Holdings,
            "No holdings data available",
            "holdings",
        )];
    }

    let total: f64 = fund.holdings.iter().map(|h| h.percentage).sum();
    if !(50.0..=105.0).contains(&total) {
        return vec![
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Holdings,
                format!("Holdings percentages sum to {total}% (expected 60-100%)"),
                "holdings",
            )
            .with_value(total),
        ];
    }

    Vec::new()
}

pub fn check_manager(fund: &Fund) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if fund
        .fund_manager
        .as_deref()
        .is_none_or(|name| name.trim().is_empty())
    {
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Manager,
            "Fund manager name missing",
            "fundManager",
        ));
    }

    if let Some(experience) = fund.fund_manager_experience
        && experience < 0.0
    {
        issues.push(
            ValidationIssue::new(
                Severity::Warning,
                IssueCategory::Manager,
                "Invalid manager experience value",
                "fundManagerExperience",
            )
            .with_value(experience),
        );
    }

    issues
}

pub fn check_freshness(fund: &Fund, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let age = age_in_days(fund.last_updated, now);
    if age > 7 {
        return vec![ValidationIssue::new(
            Severity::Warning,
            IssueCategory::Freshness,
            format!("Fund data not updated in {age} days"),
            "lastUpdated",
        )];
    }
    Vec::new()
}

/// Roll-up of a batch validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub total_issues: usize,
    /// Results carrying at least one critical issue.
    pub critical: usize,
    /// Results with warnings but no critical issue.
    pub warnings: usize,
    pub info: usize,
}

impl ValidationStats {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let critical = results.iter().filter(|r| r.has(Severity::Critical)).count();
        let warnings = results
            .iter()
            .filter(|r| r.has(Severity::Warning) && !r.has(Severity::Critical))
            .count();
        Self {
            total_issues: results.len(),
            critical,
            warnings,
            info: results.len() - critical - warnings,
        }
    }
}
