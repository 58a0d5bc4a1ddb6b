//! Result shapes handed to the rendering front end.
//!
//! Views never draw anything themselves; they return these serializable
//! payloads together with a rendering hint (chart kind, log scale).

use crate::aggregation::{CategoryValue, MonthlyPoint, YearlyPoint};
use serde::Serialize;

/// A single headline number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarMetric {
    pub label: String,
    /// Raw value, `None` when the underlying set was empty
    pub value: Option<f64>,
    /// Value formatted for display (e.g. `"2274 cr"`)
    pub display: String,
}

impl ScalarMetric {
    /// Metric shown as a rounded amount followed by `unit`.
    ///
    /// Halves round to the nearest even integer, so 22.5 shows as 22.
    pub fn amount(label: impl Into<String>, value: Option<f64>, unit: &str) -> Self {
        let display = match value {
            Some(v) => format!("{} {}", v.round_ties_even(), unit),
            None => "-".to_string(),
        };
        ScalarMetric {
            label: label.into(),
            value,
            display,
        }
    }

    /// Metric shown as an unrounded amount followed by `unit`.
    pub fn exact_amount(label: impl Into<String>, value: Option<f64>, unit: &str) -> Self {
        let display = match value {
            Some(v) => format!("{} {}", v, unit),
            None => "-".to_string(),
        };
        ScalarMetric {
            label: label.into(),
            value,
            display,
        }
    }

    /// Plain integer count.
    pub fn count(label: impl Into<String>, count: usize) -> Self {
        ScalarMetric {
            label: label.into(),
            value: Some(count as f64),
            display: count.to_string(),
        }
    }
}

/// Chart type requested for a category series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// A labelled series plus how it should be drawn.
///
/// Point order is significant: rankings arrive already sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Draw the value axis on a logarithmic scale
    pub log_scale: bool,
    pub points: Vec<CategoryValue>,
}

impl ChartSeries {
    pub fn new(title: impl Into<String>, kind: ChartKind, points: Vec<CategoryValue>) -> Self {
        ChartSeries {
            title: title.into(),
            kind,
            x_label: String::new(),
            y_label: String::new(),
            log_scale: false,
            points,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Line series over months, labelled `"{month}-{year}"`.
    pub fn monthly(title: impl Into<String>, points: &[MonthlyPoint]) -> Self {
        let points = points
            .iter()
            .map(|p| CategoryValue::new(p.label(), p.value))
            .collect();
        ChartSeries::new(title, ChartKind::Line, points)
    }

    /// Line series over years.
    pub fn yearly(title: impl Into<String>, points: &[YearlyPoint]) -> Self {
        let points = points
            .iter()
            .map(|p| CategoryValue::new(p.year.to_string(), p.value))
            .collect();
        ChartSeries::new(title, ChartKind::Line, points)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }
}

/// A titled table of typed rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table<R> {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<R>,
}

impl<R: Serialize> Table<R> {
    pub fn new(title: impl Into<String>, columns: &[&'static str], rows: Vec<R>) -> Self {
        Table {
            title: title.into(),
            columns: columns.to_vec(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_metric_rounds_for_display() {
        let metric = ScalarMetric::amount("Total", Some(2274.6), "cr");
        assert_eq!(metric.display, "2275 cr");
        assert_eq!(metric.value, Some(2274.6));
    }

    #[test]
    fn test_amount_metric_rounds_halves_to_even() {
        assert_eq!(ScalarMetric::amount("Total", Some(22.5), "cr").display, "22 cr");
        assert_eq!(ScalarMetric::amount("Total", Some(23.5), "cr").display, "24 cr");
        assert_eq!(ScalarMetric::amount("Avg", Some(0.5), "Cr").display, "0 Cr");
    }

    #[test]
    fn test_metric_without_value() {
        let metric = ScalarMetric::amount("Avg", None, "Cr");
        assert_eq!(metric.display, "-");
    }

    #[test]
    fn test_monthly_series_labels() {
        let points = vec![
            MonthlyPoint { year: 2019, month: 12, value: 1.0 },
            MonthlyPoint { year: 2020, month: 1, value: 2.0 },
        ];
        let series = ChartSeries::monthly("Month-on-Month Analysis", &points);
        assert_eq!(series.kind, ChartKind::Line);
        assert_eq!(series.labels(), vec!["12-2019", "1-2020"]);
    }

    #[test]
    fn test_series_serializes_render_hint() {
        let series = ChartSeries::new("City-wise Funding", ChartKind::Bar, vec![])
            .with_axes("City", "Total Funding")
            .log_scale();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["log_scale"], true);
        assert_eq!(json["x_label"], "City");
    }
}
