//! Sub-scores blended into a fund's overall ranking score.

use crate::core::fund::{Category, Fund};
use crate::core::stats::{mean, std_dev};

/// Normalisation band for annualised returns. `max` is informational;
/// interpolation runs from `min` to `excellent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnBand {
    pub min: f64,
    pub max: f64,
    pub excellent: f64,
}

pub fn return_band(category: Category) -> ReturnBand {
    match category {
        Category::Equity => ReturnBand {
            min: -10.0,
            max: 20.0,
            excellent: 25.0,
        },
        Category::Debt => ReturnBand {
            min: 0.0,
            max: 8.0,
            excellent: 10.0,
        },
        Category::Hybrid => ReturnBand {
            min: 0.0,
            max: 15.0,
            excellent: 18.0,
        },
        _ => ReturnBand {
            min: 0.0,
            max: 15.0,
            excellent: 20.0,
        },
    }
}

/// Maps a return onto `[0, 100]` within the category band.
pub fn normalize_return(value: f64, category: Category) -> f64 {
    let band = return_band(category);
    if value >= band.excellent {
        return 100.0;
    }
    if value <= band.min {
        return 0.0;
    }
    ((value - band.min) / (band.excellent - band.min) * 100.0).clamp(0.0, 100.0)
}

/// Sharpe and Sortino share one scale: 0 at or below zero, 100 at 3 or more.
pub fn normalize_ratio(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return 0.0;
    }
    if ratio >= 3.0 {
        return 100.0;
    }
    ratio / 3.0 * 100.0
}

/// Present and non-zero; zero is treated as a missing figure.
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Two-year return estimated from the three-year figure.
///
/// Stand-in until multi-period NAV history is available.
pub fn two_year_return(fund: &Fund) -> f64 {
    reported(fund.returns.three_year).map_or(0.0, |r| r * 0.67)
}

/// Weighted blend of normalised 1Y (20), 3Y (40) and 5Y (40) returns.
///
/// The accumulated score is divided by `used_weights / 100`, so a fund with
/// every horizon at the top of its band scores 10,000 rather than 100.
pub fn performance_score(fund: &Fund) -> f64 {
    let horizons = [
        (fund.returns.one_year, 20.0),
        (fund.returns.three_year, 40.0),
        (fund.returns.five_year, 40.0),
    ];

    let (score, weights) = horizons
        .iter()
        .filter_map(|(value, weight)| reported(*value).map(|v| (v, *weight)))
        .fold((0.0, 0.0), |(score, weights), (value, weight)| {
            (
                score + normalize_return(value, fund.category) * weight,
                weights + weight,
            )
        });

    if weights > 0.0 {
        score / (weights / 100.0)
    } else {
        0.0
    }
}

pub fn risk_adjusted_score(fund: &Fund) -> f64 {
    let sharpe = normalize_ratio(fund.risk_metrics.sharpe_ratio.unwrap_or(0.0));
    let sortino = normalize_ratio(fund.risk_metrics.sortino.unwrap_or(0.0));
    sharpe * 0.6 + sortino * 0.4
}

/// Stability of returns across horizons via the coefficient of variation.
pub fn consistency_score(fund: &Fund) -> f64 {
    let returns: Vec<f64> = [
        fund.returns.one_year,
        fund.returns.three_year,
        fund.returns.five_year,
    ]
    .into_iter()
    .filter_map(reported)
    .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let cv = (std_dev(&returns) / mean(&returns)).abs();
    if cv <= 0.2 {
        return 100.0;
    }
    if cv >= 1.0 {
        return 0.0;
    }
    100.0 - (cv - 0.2) / 0.8 * 100.0
}

/// Weighting profile for the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weighting {
    /// 50% performance, 30% risk-adjusted, 20% consistency.
    Standard,
    /// 40% risk-adjusted, 35% performance, 25% consistency.
    RiskAdjusted,
}

impl Weighting {
    pub fn overall(&self, performance: f64, risk_adjusted: f64, consistency: f64) -> f64 {
        match self {
            Weighting::Standard => performance * 0.5 + risk_adjusted * 0.3 + consistency * 0.2,
            Weighting::RiskAdjusted => {
                risk_adjusted * 0.4 + performance * 0.35 + consistency * 0.25
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fund::fixtures::sample_fund;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_normalize_return() {
        assert_eq!(normalize_return(60.0, Category::Equity), 100.0);
        assert_eq!(normalize_return(-20.0, Category::Equity), 0.0);
        assert_eq!(normalize_return(-10.0, Category::Equity), 0.0);
        assert!(approx(normalize_return(7.5, Category::Equity), 50.0));
        assert!(approx(normalize_return(5.0, Category::Debt), 50.0));
        assert!(approx(normalize_return(9.0, Category::Hybrid), 50.0));
        assert!(approx(normalize_return(10.0, Category::Commodity), 50.0));
    }

    #[test]
    fn test_normalize_ratio() {
        assert_eq!(normalize_ratio(-0.5), 0.0);
        assert_eq!(normalize_ratio(0.0), 0.0);
        assert!(approx(normalize_ratio(1.5), 50.0));
        assert_eq!(normalize_ratio(3.0), 100.0);
        assert_eq!(normalize_ratio(4.2), 100.0);
    }

    #[test]
    fn test_performance_score_keeps_unscaled_division() {
        let mut fund = sample_fund("F1");
        fund.returns.one_year = Some(30.0);
        fund.returns.three_year = Some(30.0);
        fund.returns.five_year = Some(30.0);
        // 100*20 + 100*40 + 100*40 = 10,000 over (100/100).
        assert!(approx(performance_score(&fund), 10_000.0));

        fund.returns.three_year = None;
        fund.returns.five_year = Some(0.0);
        // Only 1Y: 100*20 / 0.2.
        assert!(approx(performance_score(&fund), 10_000.0));

        fund.returns.one_year = Some(7.5);
        // 50*20 / 0.2.
        assert!(approx(performance_score(&fund), 5_000.0));

        fund.returns.one_year = None;
        assert_eq!(performance_score(&fund), 0.0);
    }

    #[test]
    fn test_risk_adjusted_score() {
        let mut fund = sample_fund("F1");
        fund.risk_metrics.sharpe_ratio = Some(3.0);
        fund.risk_metrics.sortino = Some(1.5);
        assert!(approx(risk_adjusted_score(&fund), 60.0 + 20.0));

        fund.risk_metrics.sharpe_ratio = None;
        fund.risk_metrics.sortino = None;
        assert_eq!(risk_adjusted_score(&fund), 0.0);
    }

    #[test]
    fn test_consistency_score() {
        let mut fund = sample_fund("F1");
        fund.returns.one_year = Some(10.0);
        fund.returns.three_year = Some(10.0);
        fund.returns.five_year = None;
        assert_eq!(consistency_score(&fund), 100.0);

        // mean 10, population stddev 6 => cv 0.6 => 50
        fund.returns.one_year = Some(4.0);
        fund.returns.three_year = Some(16.0);
        assert!(approx(consistency_score(&fund), 50.0));

        fund.returns.one_year = Some(-10.0);
        fund.returns.three_year = Some(12.0);
        assert_eq!(consistency_score(&fund), 0.0);

        fund.returns.three_year = Some(0.0);
        assert_eq!(consistency_score(&fund), 0.0);
    }

    #[test]
    fn test_two_year_return() {
        let mut fund = sample_fund("F1");
        fund.returns.three_year = Some(30.0);
        assert!(approx(two_year_return(&fund), 20.1));
        fund.returns.three_year = None;
        assert_eq!(two_year_return(&fund), 0.0);
    }

    #[test]
    fn test_weighting() {
        assert!(approx(Weighting::Standard.overall(100.0, 50.0, 0.0), 65.0));
        assert!(approx(Weighting::RiskAdjusted.overall(100.0, 50.0, 0.0), 55.0));
    }
}
