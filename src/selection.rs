//! Selection contract: what the sidebar lets a user choose.

use crate::aggregation::{AggregationError, SeriesAggregation};
use crate::dataset::Dataset;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which dashboard page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Overall,
    Startup,
    Investor,
}

impl ViewMode {
    pub fn all() -> [ViewMode; 3] {
        [ViewMode::Overall, ViewMode::Startup, ViewMode::Investor]
    }

    /// Menu caption for the mode.
    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Overall => "Overall Analysis",
            ViewMode::Startup => "StartUp",
            ViewMode::Investor => "Investor",
        }
    }
}

/// Toggle for the month-on-month chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyMetric {
    #[default]
    Total,
    Count,
}

impl MonthlyMetric {
    pub fn aggregation(&self) -> SeriesAggregation {
        match self {
            MonthlyMetric::Total => SeriesAggregation::Sum,
            MonthlyMetric::Count => SeriesAggregation::Count,
        }
    }
}

impl FromStr for MonthlyMetric {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SeriesAggregation>()? {
            SeriesAggregation::Sum => Ok(MonthlyMetric::Total),
            SeriesAggregation::Count => Ok(MonthlyMetric::Count),
        }
    }
}

/// A view mode together with its menu caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeOption {
    pub mode: ViewMode,
    pub title: &'static str,
}

impl From<ViewMode> for ModeOption {
    fn from(mode: ViewMode) -> Self {
        ModeOption {
            mode,
            title: mode.title(),
        }
    }
}

/// Precomputed choices offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOptions {
    pub modes: Vec<ModeOption>,
    /// Sorted distinct startup names
    pub startups: Vec<String>,
    /// Sorted distinct investor names, exploded and trimmed
    pub investors: Vec<String>,
    /// Sorted distinct years present in the data
    pub years: Vec<i32>,
}

impl SelectionOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = dataset.records();
        SelectionOptions {
            modes: ViewMode::all().into_iter().map(ModeOption::from).collect(),
            startups: records.distinct_startups(),
            investors: records.distinct_investors(),
            years: records.distinct_years(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funding_record::FundingRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_options_from_dataset() {
        let dataset = Dataset::from_records(vec![
            FundingRecord::new(
                NaiveDate::from_ymd_opt(2018, 4, 1),
                "Paytm",
                "Fintech",
                "Noida",
                "SoftBank, Alibaba",
                "Private Equity",
                Some(300.0),
            ),
            FundingRecord::new(
                NaiveDate::from_ymd_opt(2017, 2, 1),
                "Cred",
                "Fintech",
                "Bengaluru",
                "Sequoia,SoftBank",
                "Seed",
                Some(20.0),
            ),
        ]);

        let options = SelectionOptions::from_dataset(&dataset);
        let titles: Vec<&str> = options.modes.iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["Overall Analysis", "StartUp", "Investor"]);
        assert_eq!(options.modes[1].mode, ViewMode::Startup);
        assert_eq!(options.startups, vec!["Cred", "Paytm"]);
        assert_eq!(options.investors, vec!["Alibaba", "Sequoia", "SoftBank"]);
        assert_eq!(options.years, vec![2017, 2018]);
    }

    #[test]
    fn test_monthly_metric_parsing() {
        assert_eq!("Total".parse::<MonthlyMetric>().unwrap(), MonthlyMetric::Total);
        assert_eq!("count".parse::<MonthlyMetric>().unwrap(), MonthlyMetric::Count);
        assert!("average".parse::<MonthlyMetric>().is_err());
        assert_eq!(MonthlyMetric::default().aggregation(), SeriesAggregation::Sum);
    }
}
