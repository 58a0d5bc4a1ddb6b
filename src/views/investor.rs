//! Investor drill-down page.
//!
//! Every section is computed over the records whose investors field
//! contains the selected name as a substring, so a short name also picks
//! up investors whose names contain it.

use crate::aggregation::CategoryValue;
use crate::dataset::Dataset;
use crate::funding_record::RecordField;
use crate::presentation::{ChartKind, ChartSeries, Table};
use crate::views::ViewError;
use chrono::NaiveDate;
use serde::Serialize;

const RECENT_INVESTMENTS: usize = 5;
const BIGGEST_INVESTMENTS: usize = 10;
const SIMILAR_COMPANIES: usize = 10;

/// One investment made by the investor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentRow {
    pub date: Option<NaiveDate>,
    pub startup: Option<String>,
    pub vertical: Option<String>,
    pub city: Option<String>,
    pub round: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorView {
    pub investor: String,
    pub recent_investments: Table<InvestmentRow>,
    pub biggest_investments: ChartSeries,
    pub sectors: ChartSeries,
    pub year_on_year: ChartSeries,
    pub similar_companies: ChartSeries,
    pub stages: ChartSeries,
    pub cities: ChartSeries,
}

/// Builds the drill-down page for `investor`.
///
/// "Recent" investments are the first rows in dataset order; the input is
/// expected to be sorted newest first.
///
/// # Errors
/// Returns [`ViewError::InvestorNotFound`] if no record mentions the investor.
pub fn investor_view(dataset: &Dataset, investor: &str) -> Result<InvestorView, ViewError> {
    let records = dataset.records();
    let portfolio = records.filter_by_investor(investor);
    let first = portfolio
        .first_record()
        .ok_or_else(|| ViewError::InvestorNotFound(investor.to_string()))?;

    tracing::debug!(investor, investments = portfolio.len(), "Building investor view");

    let recent: Vec<InvestmentRow> = portfolio
        .head(RECENT_INVESTMENTS)
        .iter()
        .map(|r| InvestmentRow {
            date: r.date,
            startup: r.startup.clone(),
            vertical: r.vertical.clone(),
            city: r.city.clone(),
            round: r.round.clone(),
            amount: r.amount,
        })
        .collect();

    // Peers come from the whole dataset, in the vertical of the first match.
    // Records without an amount cannot be plotted.
    let similar: Vec<CategoryValue> = match first.vertical.as_deref() {
        Some(vertical) => records
            .filter_by_sector(vertical, None)
            .largest_records(usize::MAX)
            .into_iter()
            .filter_map(|r| Some(CategoryValue::new(r.startup.clone()?, r.amount?)))
            .take(SIMILAR_COMPANIES)
            .collect(),
        None => Vec::new(),
    };

    Ok(InvestorView {
        investor: investor.to_string(),
        recent_investments: Table::new(
            "Most Recent Investments",
            &["date", "startup", "vertical", "city", "round", "amount"],
            recent,
        ),
        biggest_investments: ChartSeries::new(
            "Biggest Investments",
            ChartKind::Bar,
            portfolio.top_n(RecordField::Startup, BIGGEST_INVESTMENTS, None),
        )
        .with_axes("Startup", "Total Investment")
        .log_scale(),
        sectors: ChartSeries::new(
            "Investment by Sector",
            ChartKind::Pie,
            portfolio.sum_by(RecordField::Vertical),
        )
        .with_axes("Sector", "Total Investment"),
        year_on_year: ChartSeries::yearly("Year-on-Year Investment", &portfolio.sum_by_year())
            .with_axes("Year", "Total Investment")
            .log_scale(),
        similar_companies: ChartSeries::new("Top Similar Companies", ChartKind::Bar, similar)
            .with_axes("Company", "Total Investment")
            .log_scale(),
        stages: ChartSeries::new(
            "Investment by Stage",
            ChartKind::Pie,
            portfolio.sum_by(RecordField::Round),
        )
        .with_axes("Stage", "Total Investment"),
        cities: ChartSeries::new(
            "Investment by City",
            ChartKind::Pie,
            portfolio.sum_by(RecordField::City),
        )
        .with_axes("City", "Total Investment"),
    })
}
