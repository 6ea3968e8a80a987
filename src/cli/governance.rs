use super::ui;
use crate::core::freshness::{DataFreshnessReport, FreshnessStats};
use crate::core::fund::Category;
use crate::core::governance::{DataGovernanceService, GovernanceSummary};
use crate::core::outlier::OutlierDetectionResult;
use crate::core::store::FundStore;
use crate::core::validation::{ValidationResult, ValidationStats};
use crate::core::visibility;
use crate::store::funds::MemoryFundStore;
use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;
use std::sync::Arc;

pub async fn validate(service: &DataGovernanceService, fund_id: &str, json: bool) -> Result<()> {
    let result = service.validate_fund(fund_id).await?;
    if json {
        return ui::print_json(&result);
    }

    display_validation(&result);
    Ok(())
}

pub async fn validate_all(service: &DataGovernanceService, json: bool) -> Result<()> {
    let pb = ui::new_progress_bar(0, true)?;
    pb.set_message("Validating");
    let results = service
        .validate_all_funds_with_progress(&|done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await?;
    pb.finish_and_clear();

    if json {
        return ui::print_json(&results);
    }

    if results.is_empty() {
        println!("All funds passed validation.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        display_validation(result);
        if i < results.len() - 1 {
            ui::print_separator();
        }
    }
    display_validation_stats(&ValidationStats::from_results(&results));
    Ok(())
}

pub async fn outliers(
    service: &DataGovernanceService,
    category: Category,
    json: bool,
) -> Result<()> {
    let results = service.detect_outliers(category).await?;
    if json {
        return ui::print_json(&results);
    }

    if results.is_empty() {
        println!("No outliers found in {category}.");
        return Ok(());
    }

    println!(
        "\nOutliers: {}",
        ui::style_text(category.as_str(), ui::StyleType::Title)
    );
    display_outliers(&results);
    Ok(())
}

pub async fn freshness(service: &DataGovernanceService, json: bool) -> Result<()> {
    let report = service.generate_freshness_report().await?;
    if json {
        return ui::print_json(&report);
    }

    if report.is_empty() {
        println!("All fund data is fresh.");
        return Ok(());
    }

    display_freshness(&report);
    display_freshness_stats(&FreshnessStats::from_reports(&report));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HiddenFund {
    fund_id: String,
    name: String,
    visibility_reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoHideReport {
    hidden_count: usize,
    funds: Vec<HiddenFund>,
}

/// Applies the visibility policy to the loaded snapshot. Changes stay in
/// memory.
pub async fn auto_hide(store: Arc<MemoryFundStore>, json: bool) -> Result<()> {
    let candidates: Vec<String> = store
        .find_many(&visibility::violates_policy)
        .await?
        .into_iter()
        .map(|f| f.fund_id)
        .collect();

    let service = DataGovernanceService::with_store(store.clone());
    let hidden_count = service.auto_hide_incomplete_funds().await?;

    let funds = store
        .find_many(&|f| candidates.contains(&f.fund_id))
        .await?
        .into_iter()
        .map(|f| HiddenFund {
            fund_id: f.fund_id,
            name: f.name,
            visibility_reason: f.visibility_reason,
        })
        .collect();
    let report = AutoHideReport {
        hidden_count,
        funds,
    };

    if json {
        return ui::print_json(&report);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Name"),
        ui::header_cell("Reason"),
    ]);
    for fund in &report.funds {
        table.add_row(vec![
            Cell::new(&fund.fund_id),
            Cell::new(&fund.name),
            Cell::new(fund.visibility_reason.as_deref().unwrap_or("")),
        ]);
    }
    println!("{table}");
    println!(
        "{} {}",
        ui::style_text("Hidden:", ui::StyleType::TotalLabel),
        ui::style_text(&report.hidden_count.to_string(), ui::StyleType::TotalValue)
    );
    println!(
        "{}",
        ui::style_text(
            "Changes apply to the loaded snapshot only.",
            ui::StyleType::Subtle
        )
    );
    Ok(())
}

pub async fn sweep(service: &DataGovernanceService, json: bool) -> Result<()> {
    let summary = service.run_governance_sweep().await?;
    if json {
        return ui::print_json(&summary);
    }

    display_summary(&summary);
    Ok(())
}

fn display_validation(result: &ValidationResult) {
    let status = if result.is_valid {
        ui::style_text("valid", ui::StyleType::TotalValue)
    } else {
        ui::style_text("invalid", ui::StyleType::Error)
    };
    println!(
        "\n{} ({}) {} confidence {}",
        ui::style_text(&result.fund_name, ui::StyleType::Title),
        result.fund_id,
        status,
        result.confidence
    );

    if result.issues.is_empty() {
        println!("{}", ui::style_text("No issues", ui::StyleType::Subtle));
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Severity"),
        ui::header_cell("Field"),
        ui::header_cell("Issue"),
        ui::header_cell("Value"),
        ui::header_cell("Expected"),
    ]);
    for issue in &result.issues {
        table.add_row(vec![
            ui::severity_cell(issue.severity),
            Cell::new(&issue.affected_field),
            Cell::new(&issue.message),
            ui::format_optional_cell(issue.detected_value, |v| format!("{v:.2}")),
            ui::format_optional_cell(issue.expected_range, |r| {
                format!("{:.2} to {:.2}", r.min, r.max)
            }),
        ]);
    }
    println!("{table}");
}

fn display_validation_stats(stats: &ValidationStats) {
    println!(
        "\n{} {}  critical {}  warnings {}  info {}",
        ui::style_text("Funds with issues:", ui::StyleType::TotalLabel),
        ui::style_text(&stats.total_issues.to_string(), ui::StyleType::TotalValue),
        stats.critical,
        stats.warnings,
        stats.info
    );
}

fn display_outliers(results: &[OutlierDetectionResult]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Name"),
        ui::header_cell("Metric"),
        ui::header_cell("Value"),
        ui::header_cell("Peer Median"),
        ui::header_cell("Deviation (σ)"),
    ]);
    for result in results {
        for outlier in result.outliers.iter().filter(|o| o.is_outlier) {
            table.add_row(vec![
                Cell::new(&result.fund_id),
                Cell::new(&result.fund_name),
                Cell::new(outlier.metric.name()),
                ui::number_cell(format!("{:.2}", outlier.value)),
                ui::number_cell(format!("{:.2}", outlier.peer_median)),
                ui::score_cell(outlier.deviation),
            ]);
        }
    }
    println!("{table}");
}

fn display_freshness(report: &[DataFreshnessReport]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Name"),
        ui::header_cell("NAV Age"),
        ui::header_cell("AUM Age"),
        ui::header_cell("Update Age"),
        ui::header_cell("Freshness"),
    ]);
    for entry in report {
        table.add_row(vec![
            Cell::new(&entry.fund_id),
            Cell::new(&entry.fund_name),
            ui::number_cell(format!("{}d", entry.nav_age)),
            ui::number_cell(format!("{}d", entry.aum_age)),
            ui::number_cell(format!("{}d", entry.returns_age)),
            ui::freshness_cell(entry.overall_freshness),
        ]);
    }
    println!("{table}");
}

fn display_freshness_stats(stats: &FreshnessStats) {
    println!(
        "\n{} {}  critical {}  stale {}",
        ui::style_text("Stale funds:", ui::StyleType::TotalLabel),
        ui::style_text(&stats.total_stale.to_string(), ui::StyleType::TotalValue),
        stats.critical,
        stats.stale
    );
}

fn display_summary(summary: &GovernanceSummary) {
    println!(
        "\n{}",
        ui::style_text("Governance sweep", ui::StyleType::Title)
    );
    display_validation_stats(&summary.validation);
    display_freshness_stats(&summary.freshness);
    println!(
        "{} {}",
        ui::style_text("Hidden:", ui::StyleType::TotalLabel),
        ui::style_text(&summary.hidden_count.to_string(), ui::StyleType::TotalValue)
    );

    if !summary.critical_funds.is_empty() {
        ui::print_separator();
        println!(
            "{}",
            ui::style_text("Funds with critical issues", ui::StyleType::Error)
        );
        for result in &summary.critical_funds {
            display_validation(result);
        }
    }
}
