//! Market overview page.

use crate::aggregation::{CategoryValue, HeatmapMatrix, RecordSet};
use crate::dataset::Dataset;
use crate::funding_record::RecordField;
use crate::presentation::{ChartKind, ChartSeries, ScalarMetric, Table};
use crate::selection::MonthlyMetric;
use crate::views::AMOUNT_UNIT;
use serde::{Deserialize, Deserializer, Serialize};

const TOP_STARTUPS: usize = 10;
const TOP_INVESTORS: usize = 10;

/// User choices for the overview page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OverallParams {
    /// Year for the "top startups of year" table; defaults to the earliest year
    #[serde(default, deserialize_with = "blank_as_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub metric: MonthlyMetric,
}

/// Reads an optional year from a query string, where `year=` means unset.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(year) => year.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// One row of a startup ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    pub startup: String,
    pub amount: f64,
}

/// One row of the investor ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorCountRow {
    pub investor: String,
    pub investments: usize,
}

/// Everything the overview page renders, in page order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallView {
    /// Total, Max, Avg, Funded Startups
    pub metrics: Vec<ScalarMetric>,
    pub funding_types: ChartSeries,
    pub city_funding: ChartSeries,
    pub selected_year: Option<i32>,
    pub top_startups_for_year: Table<RankRow>,
    pub top_startups_overall: Table<RankRow>,
    pub top_investors: Table<InvestorCountRow>,
    pub heatmap: HeatmapMatrix,
    pub sectors_by_count: ChartSeries,
    pub sectors_by_sum: ChartSeries,
    pub monthly_metric: MonthlyMetric,
    pub month_on_month: ChartSeries,
}

/// Builds the overview page.
///
/// An empty dataset yields empty series and tables, never an error.
pub fn overall_view(dataset: &Dataset, params: &OverallParams) -> OverallView {
    let records = dataset.records();
    let selected_year = params
        .year
        .or_else(|| records.distinct_years().first().copied());

    tracing::debug!(?selected_year, metric = ?params.metric, "Building overall view");

    let top_startups_for_year = match selected_year {
        Some(year) => records.top_n(RecordField::Startup, TOP_STARTUPS, Some(year)),
        None => Vec::new(),
    };
    let year_title = selected_year
        .map(|y| format!("Top Startups of {}", y))
        .unwrap_or_else(|| "Top Startups of Year".to_string());

    OverallView {
        metrics: headline_metrics(&records),
        funding_types: ChartSeries::new(
            "Funding Type Distribution",
            ChartKind::Bar,
            records.sum_by(RecordField::Round),
        )
        .with_axes("Type of Funding", "Total Funding")
        .log_scale(),
        city_funding: ChartSeries::new(
            "City-wise Funding Distribution",
            ChartKind::Bar,
            records.sum_by(RecordField::City),
        )
        .with_axes("City", "Total Funding")
        .log_scale(),
        selected_year,
        top_startups_for_year: rank_table(year_title, top_startups_for_year),
        top_startups_overall: rank_table(
            "Top Startups Overall",
            records.top_n(RecordField::Startup, TOP_STARTUPS, None),
        ),
        top_investors: Table::new(
            "Top Investors",
            &["Investor", "Number of Investments"],
            records
                .top_investors_by_count(TOP_INVESTORS)
                .into_iter()
                .map(|c| InvestorCountRow {
                    investor: c.label,
                    investments: c.value as usize,
                })
                .collect(),
        ),
        heatmap: records.heatmap_matrix(),
        sectors_by_count: ChartSeries::new(
            "Investments by Sector (Count)",
            ChartKind::Pie,
            records.count_by(RecordField::Vertical),
        )
        .with_axes("Sector", "Count"),
        sectors_by_sum: ChartSeries::new(
            "Investments by Sector (Sum)",
            ChartKind::Pie,
            records.sum_by(RecordField::Vertical),
        )
        .with_axes("Sector", "Total Funding"),
        monthly_metric: params.metric,
        month_on_month: ChartSeries::monthly(
            "Month-on-Month Analysis",
            &records.time_series(params.metric.aggregation()),
        )
        .with_axes("Month-Year", "Amount"),
    }
}

fn headline_metrics(records: &RecordSet<'_>) -> Vec<ScalarMetric> {
    vec![
        ScalarMetric::amount("Total", Some(records.total_amount()), AMOUNT_UNIT),
        ScalarMetric::exact_amount("Max", records.max_single_startup_amount(), AMOUNT_UNIT),
        ScalarMetric::amount("Avg", records.average_startup_total(), "Cr"),
        ScalarMetric::count("Funded Startups", records.distinct_startup_count()),
    ]
}

fn rank_table(title: impl Into<String>, ranked: Vec<CategoryValue>) -> Table<RankRow> {
    Table::new(
        title,
        &["startup", "amount"],
        ranked
            .into_iter()
            .map(|c| RankRow {
                startup: c.label,
                amount: c.value,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funding_record::FundingRecord;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let rec = |y, m, startup: &str, vertical: &str, investors: &str, round: &str, amount| {
            FundingRecord::new(
                NaiveDate::from_ymd_opt(y, m, 1),
                startup,
                vertical,
                "Bengaluru",
                investors,
                round,
                Some(amount),
            )
        };
        Dataset::from_records(vec![
            rec(2020, 1, "X", "Fintech", "Sequoia, Accel", "Seed", 10.0),
            rec(2021, 6, "X", "Fintech", "Accel", "SeriesA", 5.0),
            rec(2020, 1, "Y", "EdTech", "Blume", "Seed", 7.0),
        ])
    }

    #[test]
    fn test_overall_metrics() {
        let view = overall_view(&dataset(), &OverallParams::default());
        let displays: Vec<&str> = view.metrics.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(displays, vec!["22 cr", "10 cr", "11 Cr", "2"]);
    }

    #[test]
    fn test_default_year_is_earliest() {
        let view = overall_view(&dataset(), &OverallParams::default());
        assert_eq!(view.selected_year, Some(2020));
        assert_eq!(view.top_startups_for_year.title, "Top Startups of 2020");
        assert_eq!(view.top_startups_for_year.rows[0].startup, "X");
        assert_eq!(view.top_startups_for_year.rows[0].amount, 10.0);
    }

    #[test]
    fn test_explicit_year_and_count_toggle() {
        let params = OverallParams {
            year: Some(2021),
            metric: MonthlyMetric::Count,
        };
        let view = overall_view(&dataset(), &params);

        assert_eq!(view.top_startups_for_year.rows.len(), 1);
        assert_eq!(view.month_on_month.labels(), vec!["1-2020", "6-2021"]);
        assert_eq!(view.month_on_month.points[0].value, 2.0);
    }

    #[test]
    fn test_render_hints() {
        let view = overall_view(&dataset(), &OverallParams::default());
        assert!(view.funding_types.log_scale);
        assert!(view.city_funding.log_scale);
        assert_eq!(view.sectors_by_count.kind, ChartKind::Pie);
        assert_eq!(view.month_on_month.kind, ChartKind::Line);
    }

    #[test]
    fn test_top_investors_by_appearances() {
        let view = overall_view(&dataset(), &OverallParams::default());
        assert_eq!(
            view.top_investors.rows[0],
            InvestorCountRow {
                investor: "Accel".to_string(),
                investments: 2
            }
        );
    }

    #[test]
    fn test_empty_dataset() {
        let view = overall_view(&Dataset::default(), &OverallParams::default());
        assert_eq!(view.selected_year, None);
        assert!(view.top_startups_for_year.is_empty());
        assert!(view.heatmap.years.is_empty());
        assert_eq!(view.metrics[0].display, "0 cr");
    }
}
