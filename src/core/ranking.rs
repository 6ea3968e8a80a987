//! Performance-based fund rankings.
//!
//! Every view runs the same pipeline: filter eligible funds from the store,
//! score each one, sort (stable, so equal scores keep store order), assign
//! ranks and slice. Results are memoised in a [`RankingCache`].

use crate::core::cache::{RankingCache, ranking_key};
use crate::core::error::{GovernanceError, Result};
use crate::core::fund::{Category, Fund, SchemeType};
use crate::core::scoring::{self, Weighting};
use crate::core::store::FundStore;
use chrono::{DateTime, Months, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Funds below this completeness score are never ranked.
pub const MIN_RANKING_COMPLETENESS: f64 = 70.0;
pub const DEFAULT_MIN_AUM: f64 = 100.0;
pub const DEFAULT_MIN_AGE_YEARS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnPeriod {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Display for ReturnPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ReturnPeriod::OneYear => "1y",
                ReturnPeriod::TwoYears => "2y",
                ReturnPeriod::ThreeYears => "3y",
                ReturnPeriod::FiveYears => "5y",
            }
        )
    }
}

impl FromStr for ReturnPeriod {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1y" => Ok(ReturnPeriod::OneYear),
            "2y" => Ok(ReturnPeriod::TwoYears),
            "3y" => Ok(ReturnPeriod::ThreeYears),
            "5y" => Ok(ReturnPeriod::FiveYears),
            _ => Err(GovernanceError::InvalidInput(format!(
                "invalid return period: {s}"
            ))),
        }
    }
}

impl ReturnPeriod {
    /// Whether `fund` reports a usable return for this horizon. The two-year
    /// figure is derived from the three-year one.
    fn is_reported(&self, fund: &Fund) -> bool {
        let value = match self {
            ReturnPeriod::OneYear => fund.returns.one_year,
            ReturnPeriod::TwoYears | ReturnPeriod::ThreeYears => fund.returns.three_year,
            ReturnPeriod::FiveYears => fund.returns.five_year,
        };
        value.is_some_and(|v| v != 0.0)
    }
}

/// Horizons available for rolling-return rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollingPeriod {
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl From<RollingPeriod> for ReturnPeriod {
    fn from(period: RollingPeriod) -> Self {
        match period {
            RollingPeriod::TwoYears => ReturnPeriod::TwoYears,
            RollingPeriod::ThreeYears => ReturnPeriod::ThreeYears,
            RollingPeriod::FiveYears => ReturnPeriod::FiveYears,
        }
    }
}

impl Display for RollingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ReturnPeriod::from(*self).fmt(f)
    }
}

impl FromStr for RollingPeriod {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<ReturnPeriod>()? {
            ReturnPeriod::TwoYears => Ok(RollingPeriod::TwoYears),
            ReturnPeriod::ThreeYears => Ok(RollingPeriod::ThreeYears),
            ReturnPeriod::FiveYears => Ok(RollingPeriod::FiveYears),
            ReturnPeriod::OneYear => Err(GovernanceError::InvalidInput(
                "rolling returns are ranked over 2y, 3y or 5y".to_string(),
            )),
        }
    }
}

impl RollingPeriod {
    fn period_return(&self, fund: &RankedFund) -> f64 {
        match self {
            RollingPeriod::TwoYears => fund.returns.two_year,
            RollingPeriod::ThreeYears => fund.returns.three_year,
            RollingPeriod::FiveYears => fund.returns.five_year,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingCriteria {
    pub category: Option<Category>,
    pub sub_category: Option<String>,
    pub scheme_type: Option<SchemeType>,
    /// Minimum AUM in crores, defaults to [`DEFAULT_MIN_AUM`].
    #[serde(rename = "minAUM")]
    pub min_aum: Option<f64>,
    /// Minimum fund age in years, defaults to [`DEFAULT_MIN_AGE_YEARS`].
    pub min_age: Option<u32>,
    pub return_period: Option<ReturnPeriod>,
    #[serde(default)]
    pub risk_adjusted: bool,
    pub limit: Option<usize>,
}

impl RankingCriteria {
    pub fn for_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    pub fn weighting(&self) -> Weighting {
        if self.risk_adjusted {
            Weighting::RiskAdjusted
        } else {
            Weighting::Standard
        }
    }

    /// Stable textual form used in cache keys. Field order is fixed.
    pub fn canonical(&self) -> String {
        fn opt<T: Display>(value: &Option<T>) -> String {
            value.as_ref().map_or_else(String::new, |v| v.to_string())
        }
        format!(
            "category={};subCategory={};schemeType={};minAUM={};minAge={};returnPeriod={};riskAdjusted={};limit={}",
            opt(&self.category),
            opt(&self.sub_category),
            opt(&self.scheme_type),
            opt(&self.min_aum),
            opt(&self.min_age),
            opt(&self.return_period),
            self.risk_adjusted,
            opt(&self.limit),
        )
    }

    /// Eligibility filter shared by every view.
    pub fn admits(&self, fund: &Fund, now: DateTime<Utc>) -> bool {
        let min_aum = self.min_aum.unwrap_or(DEFAULT_MIN_AUM);
        let min_age = self.min_age.unwrap_or(DEFAULT_MIN_AGE_YEARS);
        let latest_launch = now
            .checked_sub_months(Months::new(min_age.saturating_mul(12)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        fund.is_active
            && fund.is_publicly_visible
            && fund.data_completeness.completeness_score >= MIN_RANKING_COMPLETENESS
            && fund.aum >= min_aum
            && fund.launch_date <= latest_launch
            && self.category.is_none_or(|c| fund.category == c)
            && self
                .sub_category
                .as_deref()
                .is_none_or(|s| fund.sub_category == s)
            && self
                .scheme_type
                .is_none_or(|t| fund.scheme_type == Some(t))
            && self.return_period.is_none_or(|p| p.is_reported(fund))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedReturns {
    pub one_year: f64,
    pub two_year: f64,
    pub three_year: f64,
    pub five_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedFund {
    pub fund_id: String,
    pub name: String,
    pub category: Category,
    pub sub_category: String,
    pub scheme_type: Option<SchemeType>,
    pub fund_house: String,

    pub returns: RankedReturns,

    pub sharpe_ratio: f64,
    pub standard_deviation: f64,
    pub sortino: f64,

    pub aum: f64,
    pub fund_manager: Option<String>,
    pub fund_manager_tenure: Option<f64>,

    pub performance_score: f64,
    pub risk_adjusted_score: f64,
    pub consistency_score: f64,
    pub overall_score: f64,

    pub overall_rank: usize,
    pub category_rank: usize,

    pub current_nav: f64,
    pub expense_ratio: f64,
    pub last_updated: DateTime<Utc>,
}

impl RankedFund {
    /// Scores `fund` under `weighting`. Ranks are left at zero.
    pub fn score(fund: &Fund, weighting: Weighting) -> Self {
        let performance_score = scoring::performance_score(fund);
        let risk_adjusted_score = scoring::risk_adjusted_score(fund);
        let consistency_score = scoring::consistency_score(fund);

        RankedFund {
            fund_id: fund.fund_id.clone(),
            name: fund.name.clone(),
            category: fund.category,
            sub_category: fund.sub_category.clone(),
            scheme_type: fund.scheme_type,
            fund_house: fund.fund_house.clone(),
            returns: RankedReturns {
                one_year: fund.returns.one_year.unwrap_or(0.0),
                two_year: scoring::two_year_return(fund),
                three_year: fund.returns.three_year.unwrap_or(0.0),
                five_year: fund.returns.five_year.unwrap_or(0.0),
            },
            sharpe_ratio: fund.risk_metrics.sharpe_ratio.unwrap_or(0.0),
            standard_deviation: fund.risk_metrics.standard_deviation.unwrap_or(0.0),
            sortino: fund.risk_metrics.sortino.unwrap_or(0.0),
            aum: fund.aum,
            fund_manager: fund.fund_manager.clone(),
            fund_manager_tenure: fund.fund_manager_tenure,
            performance_score,
            risk_adjusted_score,
            consistency_score,
            overall_score: weighting.overall(
                performance_score,
                risk_adjusted_score,
                consistency_score,
            ),
            overall_rank: 0,
            category_rank: 0,
            current_nav: fund.current_nav,
            expense_ratio: fund.expense_ratio.unwrap_or(0.0),
            last_updated: fund.last_updated,
        }
    }
}

/// The ranking views offered by [`RankingService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingView {
    Top,
    Category,
    SubCategory,
    RiskAdjusted,
    Rolling(RollingPeriod),
}

/// Methodology of the all-categories dashboard, which is not cached as a view.
pub const ALL_CATEGORIES_METHODOLOGY: &str = "Top performers per category";

impl RankingView {
    /// Cache namespace for the view.
    pub fn key(&self) -> String {
        match self {
            RankingView::Top => "top".to_string(),
            RankingView::Category => "category".to_string(),
            RankingView::SubCategory => "subcategory".to_string(),
            RankingView::RiskAdjusted => "risk_adjusted".to_string(),
            RankingView::Rolling(period) => format!("rolling_{period}"),
        }
    }

    pub fn methodology(&self) -> String {
        match self {
            RankingView::Top => {
                "Composite score: 50% returns, 30% risk-adjusted, 20% consistency".to_string()
            }
            RankingView::Category => "Category-specific ranking by composite score".to_string(),
            RankingView::SubCategory => {
                "Sub-category specific ranking by composite score".to_string()
            }
            RankingView::RiskAdjusted => {
                "Risk-adjusted composite: 40% Sharpe/Sortino, 35% returns, 25% consistency"
                    .to_string()
            }
            RankingView::Rolling(period) => {
                format!("Ranked by {} rolling returns", period.to_string().to_uppercase())
            }
        }
    }
}

/// Leaders of one category in the all-categories dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLeaders {
    pub category: Category,
    pub funds: Vec<RankedFund>,
}

pub struct RankingService {
    store: Option<Arc<dyn FundStore>>,
    cache: RankingCache,
}

impl Default for RankingService {
    fn default() -> Self {
        Self::new()
    }
}

impl RankingService {
    /// Creates a service with no store attached.
    pub fn new() -> Self {
        Self {
            store: None,
            cache: RankingCache::default(),
        }
    }

    pub fn with_store(store: Arc<dyn FundStore>, cache_ttl: Duration) -> Self {
        Self {
            store: Some(store),
            cache: RankingCache::new(cache_ttl),
        }
    }

    pub fn initialize(&mut self, store: Arc<dyn FundStore>) {
        self.store = Some(store);
        debug!("Ranking service initialized");
    }

    pub fn cache(&self) -> &RankingCache {
        &self.cache
    }

    fn store(&self) -> Result<&Arc<dyn FundStore>> {
        self.store
            .as_ref()
            .ok_or(GovernanceError::NotInitialized("Ranking"))
    }

    async fn eligible_funds(&self, criteria: &RankingCriteria) -> Result<Vec<Fund>> {
        let store = self.store()?;
        let now = Utc::now();
        let funds = store.find_many(&|f| criteria.admits(f, now)).await?;
        debug!("{} funds eligible for ranking", funds.len());
        Ok(funds)
    }

    async fn scored_funds(&self, criteria: &RankingCriteria) -> Result<Vec<RankedFund>> {
        let weighting = criteria.weighting();
        Ok(self
            .eligible_funds(criteria)
            .await?
            .iter()
            .map(|f| RankedFund::score(f, weighting))
            .collect())
    }

    /// Shared pipeline: cache lookup, scoring, stable descending sort by
    /// `sort_key`, rank assignment and slicing.
    async fn ranked_view(
        &self,
        key: String,
        criteria: &RankingCriteria,
        limit: usize,
        sort_key: impl Fn(&RankedFund) -> f64,
        assign_rank: fn(&mut RankedFund, usize),
    ) -> Result<Vec<RankedFund>> {
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let mut ranked = self.scored_funds(criteria).await?;
        ranked.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));
        for (index, fund) in ranked.iter_mut().enumerate() {
            assign_rank(fund, index + 1);
        }
        ranked.truncate(limit);

        self.cache.put(key, ranked.clone()).await;
        Ok(ranked)
    }

    /// Top funds across categories, ranked by overall score.
    pub async fn get_top_funds(
        &self,
        limit: usize,
        criteria: RankingCriteria,
    ) -> Result<Vec<RankedFund>> {
        let key = ranking_key(&RankingView::Top.key(), limit, &criteria);
        self.ranked_view(key, &criteria, limit, overall_score, set_overall_rank)
            .await
    }

    pub async fn get_category_leaders(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<RankedFund>> {
        let criteria = RankingCriteria {
            limit: Some(limit),
            ..RankingCriteria::for_category(category)
        };
        let key = ranking_key(&RankingView::Category.key(), limit, &criteria);
        self.ranked_view(key, &criteria, limit, overall_score, set_category_rank)
            .await
    }

    /// Ranks by overall score under the risk-adjusted weighting.
    pub async fn get_risk_adjusted_rankings(
        &self,
        limit: usize,
        criteria: RankingCriteria,
    ) -> Result<Vec<RankedFund>> {
        let criteria = RankingCriteria {
            risk_adjusted: true,
            ..criteria
        };
        let key = ranking_key(&RankingView::RiskAdjusted.key(), limit, &criteria);
        self.ranked_view(key, &criteria, limit, overall_score, set_overall_rank)
            .await
    }

    /// Ranks by the raw return for `period`; 2y uses the derived estimate.
    pub async fn get_rolling_return_rankings(
        &self,
        period: RollingPeriod,
        limit: usize,
        criteria: RankingCriteria,
    ) -> Result<Vec<RankedFund>> {
        let criteria = RankingCriteria {
            return_period: Some(period.into()),
            ..criteria
        };
        let key = ranking_key(&RankingView::Rolling(period).key(), limit, &criteria);
        self.ranked_view(
            key,
            &criteria,
            limit,
            move |f| period.period_return(f),
            set_overall_rank,
        )
        .await
    }

    pub async fn get_sub_category_leaders(
        &self,
        category: Category,
        sub_category: &str,
        limit: usize,
    ) -> Result<Vec<RankedFund>> {
        let criteria = RankingCriteria {
            sub_category: Some(sub_category.to_string()),
            limit: Some(limit),
            ..RankingCriteria::for_category(category)
        };
        let key = ranking_key(&RankingView::SubCategory.key(), limit, &criteria);
        self.ranked_view(key, &criteria, limit, overall_score, set_category_rank)
            .await
    }

    /// Category leaders for every category, in [`Category::ALL`] order.
    pub async fn get_all_category_leaders(
        &self,
        per_category: usize,
    ) -> Result<Vec<CategoryLeaders>> {
        let mut all = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let funds = self.get_category_leaders(category, per_category).await?;
            all.push(CategoryLeaders { category, funds });
        }
        Ok(all)
    }

    /// Drops every cached view. Called after fresh data lands.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("Ranking cache cleared");
    }

    /// Clears the cache and precomputes the commonly requested views.
    /// Returns how many views were computed.
    pub async fn warm_rankings(&self) -> Result<usize> {
        self.clear_cache().await;
        let mut computed = 0;

        for limit in [20, 50, 100] {
            self.get_top_funds(limit, RankingCriteria::default()).await?;
            computed += 1;
        }

        let leaders = join_all(
            [
                Category::Equity,
                Category::Debt,
                Category::Hybrid,
                Category::Elss,
                Category::Commodity,
                Category::Index,
                Category::Etf,
            ]
            .map(|category| self.get_category_leaders(category, 10)),
        )
        .await;
        for result in leaders {
            result?;
            computed += 1;
        }

        self.get_risk_adjusted_rankings(50, RankingCriteria::default())
            .await?;
        computed += 1;

        for period in [RollingPeriod::ThreeYears, RollingPeriod::FiveYears] {
            self.get_rolling_return_rankings(period, 100, RankingCriteria::default())
                .await?;
            computed += 1;
        }

        info!("Precomputed {} ranking views", computed);
        Ok(computed)
    }
}

fn overall_score(fund: &RankedFund) -> f64 {
    fund.overall_score
}

fn set_overall_rank(fund: &mut RankedFund, rank: usize) {
    fund.overall_rank = rank;
}

fn set_category_rank(fund: &mut RankedFund, rank: usize) {
    fund.category_rank = rank;
}
