//! Zero missing data policy: which records must not be publicly exposed.

use crate::core::fund::Fund;

pub const MIN_COMPLETENESS: f64 = 60.0;

pub const REASON_INCOMPLETE_RETURNS: &str = "Incomplete returns history";
pub const REASON_INVALID_AUM: &str = "Invalid or missing AUM data";

/// Whether an active fund falls foul of the policy.
pub fn violates_policy(fund: &Fund) -> bool {
    let dc = &fund.data_completeness;
    fund.is_active
        && (dc.completeness_score < MIN_COMPLETENESS
            || (fund.is_publicly_visible && !dc.has_complete_returns)
            || (fund.is_publicly_visible && !dc.has_valid_aum))
}

/// The single reason recorded when hiding a fund. Returns take priority over
/// AUM, which takes priority over the completeness score.
pub fn hide_reason(fund: &Fund) -> String {
    let dc = &fund.data_completeness;
    if !dc.has_complete_returns {
        REASON_INCOMPLETE_RETURNS.to_string()
    } else if !dc.has_valid_aum {
        REASON_INVALID_AUM.to_string()
    } else if dc.completeness_score < MIN_COMPLETENESS {
        format!("Low completeness score ({}/100)", dc.completeness_score)
    } else {
        "Insufficient data quality".to_string()
    }
}
