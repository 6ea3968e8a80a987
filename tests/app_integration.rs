use chrono::{Duration, Utc};
use fundwatch::core::fund::Category;
use fundwatch::core::governance::DataGovernanceService;
use fundwatch::core::ranking::{RankingCriteria, RankingService, RollingPeriod};
use fundwatch::core::store::FundStore;
use fundwatch::store::funds::MemoryFundStore;
use fundwatch::{AppCommand, RunOptions};
use serde_json::{Value, json};
use std::fs;
use std::sync::Arc;
use tracing::info;

mod test_utils {
    use super::*;

    pub struct FundFixture<'a> {
        pub id: &'a str,
        pub category: &'a str,
        pub one_year: f64,
        pub three_year: f64,
        pub five_year: f64,
        pub aum: f64,
        pub completeness: f64,
        pub nav: f64,
        pub data_age_days: i64,
    }

    impl<'a> FundFixture<'a> {
        pub fn equity(id: &'a str, one_year: f64) -> Self {
            FundFixture {
                id,
                category: "equity",
                one_year,
                three_year: one_year - 1.0,
                five_year: one_year - 2.0,
                aum: 1000.0,
                completeness: 90.0,
                nav: 100.0,
                data_age_days: 0,
            }
        }

        pub fn to_json(&self) -> Value {
            let now = Utc::now();
            let data_date = (now - Duration::days(self.data_age_days)).to_rfc3339();
            json!({
                "fundId": self.id,
                "name": format!("{} Fund", self.id),
                "category": self.category,
                "subCategory": "Large Cap",
                "schemeType": "direct",
                "fundHouse": "Integration AMC",
                "currentNav": self.nav,
                "previousNav": self.nav,
                "navDate": data_date,
                "aum": self.aum,
                "aumDate": data_date,
                "expenseRatio": 1.0,
                "returns": {
                    "oneYear": self.one_year,
                    "threeYear": self.three_year,
                    "fiveYear": self.five_year
                },
                "riskMetrics": { "sharpeRatio": 1.2, "sortino": 1.4 },
                "holdings": [{ "name": "A", "percentage": 60.0 }, { "name": "B", "percentage": 38.0 }],
                "fundManager": "P. Iyer",
                "fundManagerExperience": 10,
                "fundManagerTenure": 4,
                "launchDate": (now - Duration::days(365 * 6)).to_rfc3339(),
                "lastUpdated": data_date,
                "isActive": true,
                "isPubliclyVisible": true,
                "dataCompleteness": {
                    "completenessScore": self.completeness,
                    "hasCompleteReturns": true,
                    "hasValidAUM": true
                }
            })
        }
    }

    /// Twelve equity funds (one with an extreme AUM), a low-completeness debt
    /// fund and a broken, stale debt fund.
    pub fn write_snapshot() -> tempfile::NamedTempFile {
        let mut funds: Vec<Value> = (0..12)
            .map(|i| {
                let id = format!("EQ{i:02}");
                let mut fixture = FundFixture::equity(&id, 10.0 + i as f64);
                if i == 0 {
                    fixture.aum = 1_000_000.0;
                }
                fixture.to_json()
            })
            .collect();

        funds.push(
            FundFixture {
                category: "debt",
                completeness: 50.0,
                ..FundFixture::equity("DEBT-LOW", 7.0)
            }
            .to_json(),
        );
        funds.push(
            FundFixture {
                category: "debt",
                nav: 0.0,
                data_age_days: 10,
                ..FundFixture::equity("DEBT-BROKEN", 7.0)
            }
            .to_json(),
        );

        let file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(file.path(), serde_json::to_string_pretty(&funds).unwrap())
            .expect("Failed to write snapshot");
        file
    }
}

#[test_log::test(tokio::test)]
async fn test_every_command_runs_against_snapshot() {
    let snapshot = test_utils::write_snapshot();
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
        snapshot_path: "{}"
        ranking:
          cache_ttl_hours: 1
          per_category_limit: 3
    "#,
        snapshot.path().display()
    );
    fs::write(config_file.path(), &config_content).expect("Failed to write config file");
    let config_path = config_file.path().to_str().unwrap();

    let commands = vec![
        AppCommand::Validate {
            fund_id: "EQ01".to_string(),
        },
        AppCommand::Validate {
            fund_id: "missing".to_string(),
        },
        AppCommand::ValidateAll,
        AppCommand::Outliers {
            category: Category::Equity,
        },
        AppCommand::Freshness,
        AppCommand::AutoHide,
        AppCommand::Sweep,
        AppCommand::Top {
            limit: 5,
            category: None,
            scheme_type: None,
            min_aum: Some(500.0),
        },
        AppCommand::Category {
            category: Category::Equity,
            limit: 3,
        },
        AppCommand::SubCategory {
            category: Category::Equity,
            sub_category: "Large Cap".to_string(),
            limit: 3,
        },
        AppCommand::RiskAdjusted { limit: 10 },
        AppCommand::Rolling {
            period: RollingPeriod::ThreeYears,
            limit: 10,
        },
        AppCommand::AllCategories { limit: None },
    ];

    for json in [false, true] {
        for command in &commands {
            info!(?command, json, "Running command");
            let options = RunOptions {
                config_path: Some(config_path),
                snapshot_path: None,
                json,
            };
            let result = fundwatch::run_command(command.clone(), &options).await;
            assert!(
                result.is_ok(),
                "{command:?} failed with: {:?}",
                result.err()
            );
        }
    }
}

#[test_log::test(tokio::test)]
async fn test_snapshot_override_and_missing_snapshot() {
    let snapshot = test_utils::write_snapshot();
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    fs::write(config_file.path(), "snapshot_path: /nonexistent/funds.json\n")
        .expect("Failed to write config file");
    let config_path = config_file.path().to_str().unwrap();

    let missing = fundwatch::run_command(
        AppCommand::Freshness,
        &RunOptions {
            config_path: Some(config_path),
            ..Default::default()
        },
    )
    .await;
    assert!(missing.is_err());

    let overridden = fundwatch::run_command(
        AppCommand::Freshness,
        &RunOptions {
            config_path: Some(config_path),
            snapshot_path: snapshot.path().to_str(),
            json: true,
        },
    )
    .await;
    assert!(overridden.is_ok(), "{:?}", overridden.err());
}

#[test_log::test(tokio::test)]
async fn test_governance_then_rankings_flow() {
    let snapshot = test_utils::write_snapshot();
    let store = Arc::new(MemoryFundStore::load_snapshot(snapshot.path()).unwrap());

    let governance = DataGovernanceService::with_store(store.clone());
    let outliers = governance.detect_outliers(Category::Equity).await.unwrap();
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0].fund_id, "EQ00");

    // Two debt funds are below the minimum peer group.
    assert!(governance.detect_outliers(Category::Debt).await.unwrap().is_empty());

    let summary = governance.run_governance_sweep().await.unwrap();
    info!(?summary, "Governance sweep finished");
    assert_eq!(summary.validation.critical, 1);
    assert_eq!(summary.critical_funds[0].fund_id, "DEBT-BROKEN");
    assert_eq!(summary.freshness.total_stale, 1);
    assert_eq!(summary.freshness.critical, 1);
    assert_eq!(summary.hidden_count, 1);

    let hidden = store.find_one("DEBT-LOW").await.unwrap().unwrap();
    assert!(!hidden.is_publicly_visible);
    assert_eq!(
        hidden.visibility_reason.as_deref(),
        Some("Low completeness score (50/100)")
    );

    let rankings = RankingService::with_store(store.clone(), std::time::Duration::from_secs(60));
    let debt = rankings
        .get_category_leaders(Category::Debt, 10)
        .await
        .unwrap();
    let debt_ids: Vec<_> = debt.iter().map(|f| f.fund_id.as_str()).collect();
    assert_eq!(debt_ids, vec!["DEBT-BROKEN"]);

    let top = rankings
        .get_top_funds(3, RankingCriteria::for_category(Category::Equity))
        .await
        .unwrap();
    let top_ids: Vec<_> = top.iter().map(|f| f.fund_id.as_str()).collect();
    assert_eq!(top_ids, vec!["EQ11", "EQ10", "EQ09"]);
    assert_eq!(
        top.iter().map(|f| f.overall_rank).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );

    let warmed = rankings.warm_rankings().await.unwrap();
    assert_eq!(warmed, 13);
}
