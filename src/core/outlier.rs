//! Peer-group outlier detection.

use crate::core::fund::Fund;
use crate::core::stats::{median, std_dev};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Peer groups smaller than this are not evaluated.
pub const MIN_PEER_GROUP: usize = 10;

/// Deviations strictly above this many standard deviations are outliers.
pub const OUTLIER_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "currentNav")]
    CurrentNav,
    #[serde(rename = "expenseRatio")]
    ExpenseRatio,
    #[serde(rename = "returns.oneYear")]
    OneYearReturn,
    #[serde(rename = "aum")]
    Aum,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::CurrentNav,
        Metric::ExpenseRatio,
        Metric::OneYearReturn,
        Metric::Aum,
    ];

    /// Reads the metric, `None` when absent or not a number.
    pub fn read(&self, fund: &Fund) -> Option<f64> {
        let value = match self {
            Metric::CurrentNav => Some(fund.current_nav),
            Metric::ExpenseRatio => fund.expense_ratio,
            Metric::OneYearReturn => fund.returns.one_year,
            Metric::Aum => Some(fund.aum),
        };
        value.filter(|v| !v.is_nan())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::CurrentNav => "currentNav",
            Metric::ExpenseRatio => "expenseRatio",
            Metric::OneYearReturn => "returns.oneYear",
            Metric::Aum => "aum",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOutlier {
    pub metric: Metric,
    pub value: f64,
    pub peer_median: f64,
    pub deviation: f64,
    pub is_outlier: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierDetectionResult {
    pub fund_id: String,
    pub fund_name: String,
    pub outliers: Vec<MetricOutlier>,
}

/// Median and spread of one metric across a peer group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerStats {
    pub median: f64,
    pub std_dev: f64,
}

impl PeerStats {
    /// Missing values are left out of the sample rather than counted as zero.
    pub fn for_metric(peers: &[Fund], metric: Metric) -> Self {
        let values: Vec<f64> = peers.iter().filter_map(|f| metric.read(f)).collect();
        Self {
            median: median(&values),
            std_dev: std_dev(&values),
        }
    }

    /// Distance from the peer median in standard deviations. A peer group
    /// with no spread reports zero deviation.
    pub fn deviation(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        ((value - self.median) / self.std_dev).abs()
    }

    pub fn evaluate(&self, metric: Metric, value: f64) -> MetricOutlier {
        let deviation = self.deviation(value);
        MetricOutlier {
            metric,
            value,
            peer_median: self.median,
            deviation,
            is_outlier: deviation > OUTLIER_THRESHOLD,
        }
    }
}

/// Flags every peer with at least one metric more than three standard
/// deviations from the peer median. Groups under [`MIN_PEER_GROUP`] yield
/// nothing.
pub fn find_outliers(peers: &[Fund]) -> Vec<OutlierDetectionResult> {
    if peers.len() < MIN_PEER_GROUP {
        return Vec::new();
    }

    let stats: Vec<(Metric, PeerStats)> = Metric::ALL
        .iter()
        .map(|&m| (m, PeerStats::for_metric(peers, m)))
        .collect();

    peers
        .iter()
        .filter_map(|fund| {
            let outliers: Vec<MetricOutlier> = stats
                .iter()
                .map(|(metric, s)| s.evaluate(*metric, metric.read(fund).unwrap_or(0.0)))
                .filter(|o| o.is_outlier)
                .collect();

            (!outliers.is_empty()).then(|| OutlierDetectionResult {
                fund_id: fund.fund_id.clone(),
                fund_name: fund.name.clone(),
                outliers,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::fixtures::sample_fund;

    fn peers_with_nav(navs: &[f64]) -> Vec<Fund> {
        navs.iter()
            .enumerate()
            .map(|(i, nav)| {
                let mut f = sample_fund(&format!("P{i}"));
                f.current_nav = *nav;
                f
            })
            .collect()
    }

    #[test]
    fn test_deviation_boundary() {
        let stats = PeerStats {
            median: 100.0,
            std_dev: 10.0,
        };
        let flagged = stats.evaluate(Metric::CurrentNav, 135.0);
        assert_eq!(flagged.deviation, 3.5);
        assert!(flagged.is_outlier);

        let below = stats.evaluate(Metric::CurrentNav, 125.0);
        assert_eq!(below.deviation, 2.5);
        assert!(!below.is_outlier);

        let at = stats.evaluate(Metric::CurrentNav, 70.0);
        assert_eq!(at.deviation, 3.0);
        assert!(!at.is_outlier);
    }

    #[test]
    fn test_small_peer_group_is_skipped() {
        let mut navs = vec![100.0; 8];
        navs.push(1_000_000.0);
        assert!(find_outliers(&peers_with_nav(&navs)).is_empty());
    }

    #[test]
    fn test_detects_extreme_nav() {
        let mut navs: Vec<f64> = (0..19).map(|i| 100.0 + i as f64).collect();
        navs.push(10_000.0);
        let results = find_outliers(&peers_with_nav(&navs));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].fund_id, "P19");
        assert_eq!(results[0].outliers.len(), 1);
        assert_eq!(results[0].outliers[0].metric, Metric::CurrentNav);
        assert_eq!(results[0].outliers[0].peer_median, 109.5);
    }

    #[test]
    fn test_missing_values_are_excluded_from_sample() {
        let mut peers = peers_with_nav(&[100.0; 10]);
        for (i, fund) in peers.iter_mut().enumerate() {
            fund.expense_ratio = if i < 5 { None } else { Some(1.0 + i as f64 * 0.1) };
        }
        let stats = PeerStats::for_metric(&peers, Metric::ExpenseRatio);
        assert!((stats.median - 1.7).abs() < 1e-12);
    }

    #[test]
    fn test_zero_spread_is_never_flagged() {
        let results = find_outliers(&peers_with_nav(&[100.0; 12]));
        assert!(results.is_empty());
    }
}
