//! Aggregation Engine
//!
//! Pure, read-only queries over a borrowed set of funding records. Every
//! operation either narrows a [`RecordSet`] (filters) or reduces it to a
//! derived series (grouped sums, counts, rankings, pivots). Nothing here
//! mutates the underlying records, and every operation returns an empty
//! result for an empty set rather than failing.
//!
//! Grouped results are collected in ascending label order and then stably
//! sorted by value, so equal values keep their label order.

use crate::funding_record::{FundingRecord, RecordField};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Errors raised for invalid query descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Grouping field does not exist in the record schema
    UnknownField(String),
    /// Aggregation kind is not one of `sum` / `count`
    UnknownAggregation(String),
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationError::UnknownField(field) => write!(f, "Unknown field: {}", field),
            AggregationError::UnknownAggregation(op) => write!(f, "Unknown aggregation: {}", op),
        }
    }
}

impl std::error::Error for AggregationError {}

/// How grouped amounts are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesAggregation {
    /// Sum of present amounts
    Sum,
    /// Number of present amounts
    Count,
}

impl FromStr for SeriesAggregation {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sum" | "total" => Ok(SeriesAggregation::Sum),
            "count" => Ok(SeriesAggregation::Count),
            _ => Err(AggregationError::UnknownAggregation(s.to_string())),
        }
    }
}

/// One group of a category series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub label: String,
    pub value: f64,
}

impl CategoryValue {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        CategoryValue {
            label: label.into(),
            value,
        }
    }
}

/// Aggregate for one (year, month) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub value: f64,
}

impl MonthlyPoint {
    /// Display label in `"{month}-{year}"` form, e.g. `"7-2019"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.month, self.year)
    }
}

/// Aggregate for one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyPoint {
    pub year: i32,
    pub value: f64,
}

/// Year × month funding totals.
///
/// `values[i][j]` is the total for `years[i]` in month `months[j]`. Months
/// always span 1-12 and cells without funding hold 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub years: Vec<i32>,
    pub months: Vec<u32>,
    pub values: Vec<Vec<f64>>,
}

impl HeatmapMatrix {
    /// Looks up a single cell; `None` if the year or month has no cell.
    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        let row = self.years.iter().position(|y| *y == year)?;
        let col = self.months.iter().position(|m| *m == month)?;
        self.values.get(row)?.get(col).copied()
    }
}

/// An (investor, record) pair produced by exploding the investors field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvestorRecord<'a> {
    pub investor: &'a str,
    pub record: &'a FundingRecord,
}

/// A borrowed, ordered selection of records.
///
/// Dataset order is preserved by every filter, which matters for the
/// "first matching record" rule and for head-of-set listings.
#[derive(Debug, Clone, Default)]
pub struct RecordSet<'a> {
    records: Vec<&'a FundingRecord>,
}

impl<'a> RecordSet<'a> {
    /// Wraps a slice of records.
    pub fn new(records: &'a [FundingRecord]) -> Self {
        RecordSet {
            records: records.iter().collect(),
        }
    }

    fn from_refs(records: Vec<&'a FundingRecord>) -> Self {
        RecordSet { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, &'a FundingRecord>> {
        self.records.iter().copied()
    }

    // Headline metrics

    /// Sum of every present amount.
    pub fn total_amount(&self) -> f64 {
        self.iter().filter_map(|r| r.amount).sum()
    }

    /// Largest single funding amount recorded for any startup.
    ///
    /// Each startup contributes its maximum single-record amount, not its
    /// cumulative total. `None` when no startup has an amount.
    pub fn max_single_startup_amount(&self) -> Option<f64> {
        let mut per_startup: BTreeMap<&str, f64> = BTreeMap::new();
        for record in self.iter() {
            if let (Some(startup), Some(amount)) = (record.startup.as_deref(), record.amount) {
                let entry = per_startup.entry(startup).or_insert(amount);
                if amount > *entry {
                    *entry = amount;
                }
            }
        }

        per_startup
            .into_values()
            .max_by_key(|v| OrderedFloat(*v))
    }

    /// Mean of per-startup cumulative funding (the "ticket size").
    pub fn average_startup_total(&self) -> Option<f64> {
        let totals = self.sum_by(RecordField::Startup);
        if totals.is_empty() {
            return None;
        }

        let sum: f64 = totals.iter().map(|c| c.value).sum();
        Some(sum / totals.len() as f64)
    }

    /// Number of distinct startup names.
    pub fn distinct_startup_count(&self) -> usize {
        self.iter()
            .filter_map(|r| r.startup.as_deref())
            .collect::<BTreeSet<_>>()
            .len()
    }

    // Grouping

    /// Sums amounts per value of `field`, largest first.
    ///
    /// Records with no value for `field` are left out. A group whose amounts
    /// are all missing still appears, with a total of 0.
    pub fn sum_by(&self, field: RecordField) -> Vec<CategoryValue> {
        let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
        for record in self.iter() {
            if let Some(key) = record.field(field) {
                *groups.entry(key).or_insert(0.0) += record.amount.unwrap_or(0.0);
            }
        }
        rank_descending(groups)
    }

    /// Counts records per value of `field`, most frequent first.
    pub fn count_by(&self, field: RecordField) -> Vec<CategoryValue> {
        let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
        for record in self.iter() {
            if let Some(key) = record.field(field) {
                *groups.entry(key).or_insert(0.0) += 1.0;
            }
        }
        rank_descending(groups)
    }

    /// Top `n` groups of `field` by summed amount, optionally within one year.
    pub fn top_n(&self, field: RecordField, n: usize, year: Option<i32>) -> Vec<CategoryValue> {
        let mut ranked = match year {
            Some(year) => self.filter_by_year(year).sum_by(field),
            None => self.sum_by(field),
        };
        ranked.truncate(n);
        ranked
    }

    /// Top `n` investors by number of records they appear in.
    pub fn top_investors_by_count(&self, n: usize) -> Vec<CategoryValue> {
        let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
        for pair in self.explode_investors() {
            *groups.entry(pair.investor).or_insert(0.0) += 1.0;
        }
        let mut ranked = rank_descending(groups);
        ranked.truncate(n);
        ranked
    }

    // Calendar aggregations

    /// Month-by-month aggregate of amounts in chronological order.
    ///
    /// Undated records are excluded. With [`SeriesAggregation::Count`] only
    /// records carrying an amount are counted.
    pub fn time_series(&self, aggregation: SeriesAggregation) -> Vec<MonthlyPoint> {
        let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for record in self.iter() {
            if let (Some(year), Some(month)) = (record.year(), record.month()) {
                let value = match aggregation {
                    SeriesAggregation::Sum => record.amount.unwrap_or(0.0),
                    SeriesAggregation::Count => {
                        if record.amount.is_some() {
                            1.0
                        } else {
                            0.0
                        }
                    }
                };
                *buckets.entry((year, month)).or_insert(0.0) += value;
            }
        }

        buckets
            .into_iter()
            .map(|((year, month), value)| MonthlyPoint { year, month, value })
            .collect()
    }

    /// Year-on-year funding totals, ascending by year.
    pub fn sum_by_year(&self) -> Vec<YearlyPoint> {
        let mut buckets: BTreeMap<i32, f64> = BTreeMap::new();
        for record in self.iter() {
            if let Some(year) = record.year() {
                *buckets.entry(year).or_insert(0.0) += record.amount.unwrap_or(0.0);
            }
        }

        buckets
            .into_iter()
            .map(|(year, value)| YearlyPoint { year, value })
            .collect()
    }

    /// Pivots monthly totals into a year × month matrix.
    pub fn heatmap_matrix(&self) -> HeatmapMatrix {
        let monthly = self.time_series(SeriesAggregation::Sum);
        let years: Vec<i32> = monthly
            .iter()
            .map(|p| p.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let months: Vec<u32> = (1..=12).collect();

        let mut values = vec![vec![0.0; months.len()]; years.len()];
        for point in &monthly {
            // years is sorted and built from the same points
            if let Ok(row) = years.binary_search(&point.year) {
                values[row][(point.month - 1) as usize] = point.value;
            }
        }

        HeatmapMatrix {
            years,
            months,
            values,
        }
    }

    // Filters

    /// Records whose raw investors string contains `name`.
    ///
    /// This is a literal, case-sensitive substring test on the comma-joined
    /// field, so "Accel" also matches "AccelPartners".
    pub fn filter_by_investor(&self, name: &str) -> RecordSet<'a> {
        self.filter(|r| r.investors.as_deref().is_some_and(|inv| inv.contains(name)))
    }

    /// Records in `sector`, optionally leaving out one startup.
    pub fn filter_by_sector(&self, sector: &str, exclude_startup: Option<&str>) -> RecordSet<'a> {
        self.filter(|r| {
            r.vertical.as_deref() == Some(sector)
                && !(exclude_startup.is_some() && r.startup.as_deref() == exclude_startup)
        })
    }

    /// Records for exactly the named startup.
    pub fn filter_by_startup(&self, startup: &str) -> RecordSet<'a> {
        self.filter(|r| r.startup.as_deref() == Some(startup))
    }

    /// Records dated within `year`.
    pub fn filter_by_year(&self, year: i32) -> RecordSet<'a> {
        self.filter(|r| r.year() == Some(year))
    }

    fn filter<F>(&self, predicate: F) -> RecordSet<'a>
    where
        F: Fn(&FundingRecord) -> bool,
    {
        RecordSet::from_refs(self.iter().filter(|r| predicate(*r)).collect())
    }

    /// First `n` records in dataset order.
    pub fn head(&self, n: usize) -> RecordSet<'a> {
        RecordSet::from_refs(self.iter().take(n).collect())
    }

    /// Representative record for an entity: the first one in dataset order.
    pub fn first_record(&self) -> Option<&'a FundingRecord> {
        self.records.first().copied()
    }

    /// The `n` largest individual records by amount.
    ///
    /// Ties keep dataset order; records without an amount sort last.
    pub fn largest_records(&self, n: usize) -> Vec<&'a FundingRecord> {
        let mut sorted: Vec<&'a FundingRecord> = self.iter().collect();
        sorted.sort_by_key(|r| (r.amount.is_none(), Reverse(OrderedFloat(r.amount.unwrap_or(0.0)))));
        sorted.truncate(n);
        sorted
    }

    // Investors

    /// One pair per investor named in each record.
    ///
    /// This is the only place the investors field is split; a record listing
    /// "A, B" yields a pair for "A" and a pair for "B".
    pub fn explode_investors(&self) -> Vec<InvestorRecord<'a>> {
        self.iter()
            .flat_map(|record| {
                record
                    .investor_names()
                    .map(move |investor| InvestorRecord { investor, record })
            })
            .collect()
    }

    // Selection lists

    /// Sorted distinct startup names.
    pub fn distinct_startups(&self) -> Vec<String> {
        self.iter()
            .filter_map(|r| r.startup.as_deref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Sorted distinct investor names, after exploding and trimming.
    pub fn distinct_investors(&self) -> Vec<String> {
        self.explode_investors()
            .into_iter()
            .map(|pair| pair.investor)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Sorted distinct years among dated records.
    pub fn distinct_years(&self) -> Vec<i32> {
        self.iter()
            .filter_map(|r| r.year())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Turns label-ordered groups into a series sorted by value, descending.
fn rank_descending(groups: BTreeMap<&str, f64>) -> Vec<CategoryValue> {
    let mut ranked: Vec<CategoryValue> = groups
        .into_iter()
        .map(|(label, value)| CategoryValue::new(label, value))
        .collect();
    // sort_by_key is stable, so ties stay in label order
    ranked.sort_by_key(|c| Reverse(OrderedFloat(c.value)));
    ranked
}
