use super::ui;
use crate::core::fund::Category;
use crate::core::ranking::{
    ALL_CATEGORIES_METHODOLOGY, CategoryLeaders, RankedFund, RankingCriteria, RankingService,
    RankingView, RollingPeriod,
};
use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

/// A ranking view as printed with `--json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankingOutput<'a> {
    methodology: String,
    count: usize,
    funds: &'a [RankedFund],
}

pub async fn top(
    service: &RankingService,
    limit: usize,
    criteria: RankingCriteria,
    json: bool,
) -> Result<()> {
    let funds = service.get_top_funds(limit, criteria).await?;
    print_view("Top Funds", RankingView::Top, &funds, RankColumn::Overall, json)
}

pub async fn category(
    service: &RankingService,
    category: Category,
    limit: usize,
    json: bool,
) -> Result<()> {
    let funds = service.get_category_leaders(category, limit).await?;
    let title = format!("Category Leaders: {category}");
    print_view(&title, RankingView::Category, &funds, RankColumn::Category, json)
}

pub async fn sub_category(
    service: &RankingService,
    category: Category,
    sub_category: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    let funds = service
        .get_sub_category_leaders(category, sub_category, limit)
        .await?;
    let title = format!("Sub-category Leaders: {category} / {sub_category}");
    print_view(
        &title,
        RankingView::SubCategory,
        &funds,
        RankColumn::Category,
        json,
    )
}

pub async fn risk_adjusted(service: &RankingService, limit: usize, json: bool) -> Result<()> {
    let funds = service
        .get_risk_adjusted_rankings(limit, RankingCriteria::default())
        .await?;
    print_view(
        "Risk-adjusted Rankings",
        RankingView::RiskAdjusted,
        &funds,
        RankColumn::Overall,
        json,
    )
}

pub async fn rolling(
    service: &RankingService,
    period: RollingPeriod,
    limit: usize,
    json: bool,
) -> Result<()> {
    let funds = service
        .get_rolling_return_rankings(period, limit, RankingCriteria::default())
        .await?;
    let title = format!("Rolling Returns: {}", period.to_string().to_uppercase());
    print_view(
        &title,
        RankingView::Rolling(period),
        &funds,
        RankColumn::Overall,
        json,
    )
}

pub async fn all_categories(
    service: &RankingService,
    per_category: usize,
    json: bool,
) -> Result<()> {
    let leaders = service.get_all_category_leaders(per_category).await?;
    if json {
        return ui::print_json(&leaders);
    }

    let shown: Vec<&CategoryLeaders> = leaders.iter().filter(|l| !l.funds.is_empty()).collect();
    if shown.is_empty() {
        println!("No funds are eligible for ranking.");
        return Ok(());
    }

    println!(
        "{}",
        ui::style_text(ALL_CATEGORIES_METHODOLOGY, ui::StyleType::Subtle)
    );
    for (i, group) in shown.iter().enumerate() {
        println!(
            "\nCategory: {}",
            ui::style_text(group.category.as_str(), ui::StyleType::Title)
        );
        display_funds(&group.funds, RankColumn::Category);
        if i < shown.len() - 1 {
            ui::print_separator();
        }
    }
    Ok(())
}

#[derive(Clone, Copy)]
enum RankColumn {
    Overall,
    Category,
}

fn print_view(
    title: &str,
    view: RankingView,
    funds: &[RankedFund],
    rank: RankColumn,
    json: bool,
) -> Result<()> {
    if json {
        return ui::print_json(&RankingOutput {
            methodology: view.methodology(),
            count: funds.len(),
            funds,
        });
    }

    println!("\n{}", ui::style_text(title, ui::StyleType::Title));
    println!(
        "{}",
        ui::style_text(&view.methodology(), ui::StyleType::Subtle)
    );
    if funds.is_empty() {
        println!("No funds are eligible for this ranking.");
        return Ok(());
    }
    display_funds(funds, rank);
    Ok(())
}

fn display_funds(funds: &[RankedFund], rank: RankColumn) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Fund"),
        ui::header_cell("Sub-category"),
        ui::header_cell("1Y"),
        ui::header_cell("3Y"),
        ui::header_cell("5Y"),
        ui::header_cell("Sharpe"),
        ui::header_cell("AUM (Cr)"),
        ui::header_cell("Expense"),
        ui::header_cell("Performance"),
        ui::header_cell("Risk-adj."),
        ui::header_cell("Consistency"),
        ui::header_cell("Overall"),
    ]);

    for fund in funds {
        let position = match rank {
            RankColumn::Overall => fund.overall_rank,
            RankColumn::Category => fund.category_rank,
        };
        table.add_row(vec![
            ui::number_cell(position.to_string()),
            Cell::new(&fund.name),
            Cell::new(&fund.sub_category),
            ui::return_cell(fund.returns.one_year),
            ui::return_cell(fund.returns.three_year),
            ui::return_cell(fund.returns.five_year),
            ui::number_cell(format!("{:.2}", fund.sharpe_ratio)),
            ui::number_cell(format!("{:.0}", fund.aum)),
            ui::format_optional_cell(
                Some(fund.expense_ratio).filter(|e| *e > 0.0),
                |e| format!("{e:.2}%"),
            ),
            ui::number_cell(format!("{:.2}", fund.performance_score)),
            ui::number_cell(format!("{:.2}", fund.risk_adjusted_score)),
            ui::number_cell(format!("{:.2}", fund.consistency_score)),
            ui::score_cell(fund.overall_score),
        ]);
    }
    println!("{table}");
}
