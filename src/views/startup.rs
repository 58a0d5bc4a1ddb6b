//! Startup drill-down page.

use crate::dataset::Dataset;
use crate::funding_record::RecordField;
use crate::presentation::{ChartKind, ChartSeries, Table};
use crate::views::ViewError;
use chrono::NaiveDate;
use serde::Serialize;

const SIMILAR_COMPANIES: usize = 5;

/// Descriptive fields taken from the startup's first record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupOverview {
    pub name: String,
    pub industry: Option<String>,
    pub subindustry: Option<String>,
    pub location: Option<String>,
    pub stage: Option<String>,
    /// `%Y-%m-%d`, absent when the first record is undated
    pub date: Option<String>,
}

/// One funding round of the startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRoundRow {
    pub date: Option<NaiveDate>,
    pub round: Option<String>,
    pub amount: Option<f64>,
    pub investors: Option<String>,
}

/// A record of another startup in the same vertical.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCompanyRow {
    pub startup: Option<String>,
    pub amount: Option<f64>,
    pub city: Option<String>,
    pub round: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartupView {
    pub overview: StartupOverview,
    pub funding_history: Table<FundingRoundRow>,
    pub similar_companies: Table<SimilarCompanyRow>,
    pub year_on_year: ChartSeries,
    pub by_round: ChartSeries,
}

/// Builds the drill-down page for `name`.
///
/// # Errors
/// Returns [`ViewError::StartupNotFound`] if no record carries the name.
pub fn startup_view(dataset: &Dataset, name: &str) -> Result<StartupView, ViewError> {
    let records = dataset.records();
    let history = records.filter_by_startup(name);
    let first = history
        .first_record()
        .ok_or_else(|| ViewError::StartupNotFound(name.to_string()))?;

    tracing::debug!(startup = name, rounds = history.len(), "Building startup view");

    let overview = StartupOverview {
        name: name.to_string(),
        industry: first.vertical.clone(),
        subindustry: first.subvertical.clone(),
        location: first.city.clone(),
        stage: first.round.clone(),
        date: first.date.map(|d| d.format("%Y-%m-%d").to_string()),
    };

    let funding_history: Vec<FundingRoundRow> = history
        .iter()
        .map(|r| FundingRoundRow {
            date: r.date,
            round: r.round.clone(),
            amount: r.amount,
            investors: r.investors.clone(),
        })
        .collect();

    // An unknown vertical has no peers
    let similar: Vec<SimilarCompanyRow> = match first.vertical.as_deref() {
        Some(vertical) => records
            .filter_by_sector(vertical, Some(name))
            .head(SIMILAR_COMPANIES)
            .iter()
            .map(|r| SimilarCompanyRow {
                startup: r.startup.clone(),
                amount: r.amount,
                city: r.city.clone(),
                round: r.round.clone(),
            })
            .collect(),
        None => Vec::new(),
    };

    Ok(StartupView {
        overview,
        funding_history: Table::new(
            "Funding Details",
            &["date", "round", "amount", "investors"],
            funding_history,
        ),
        similar_companies: Table::new(
            "Similar Companies",
            &["startup", "amount", "city", "round"],
            similar,
        ),
        year_on_year: ChartSeries::yearly("Year-on-Year Funding", &history.sum_by_year())
            .with_axes("Year", "Total Funding"),
        by_round: ChartSeries::new(
            "Investment by Funding Rounds",
            ChartKind::Bar,
            history.sum_by(RecordField::Round),
        )
        .with_axes("Round", "Total Funding"),
    })
}
