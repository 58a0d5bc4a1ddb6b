use crate::aggregation::AggregationError;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date formats accepted in the `date` column, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// A single funding event: one row of the dataset.
///
/// A startup may appear in many records (one per funding round). The
/// `investors` field keeps the raw comma-joined string; per-investor
/// consumers must go through [`FundingRecord::investor_names`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRecord {
    /// Funding date, `None` if the source value could not be parsed
    pub date: Option<NaiveDate>,
    pub startup: Option<String>,
    /// Sector classification
    pub vertical: Option<String>,
    /// Sub-sector classification
    pub subvertical: Option<String>,
    pub city: Option<String>,
    /// Comma-separated investor names, untrimmed
    pub investors: Option<String>,
    /// Funding stage label (e.g. "Seed", "Series A")
    pub round: Option<String>,
    /// Amount in crore, `None` when absent
    pub amount: Option<f64>,
}

impl FundingRecord {
    /// Creates a fully populated record.
    ///
    /// Mostly useful for tests and fixtures; the loader builds records from CSV rows.
    pub fn new(
        date: Option<NaiveDate>,
        startup: impl Into<String>,
        vertical: impl Into<String>,
        city: impl Into<String>,
        investors: impl Into<String>,
        round: impl Into<String>,
        amount: Option<f64>,
    ) -> Self {
        FundingRecord {
            date,
            startup: Some(startup.into()),
            vertical: Some(vertical.into()),
            subvertical: None,
            city: Some(city.into()),
            investors: Some(investors.into()),
            round: Some(round.into()),
            amount,
        }
    }

    /// Calendar month (1-12) derived from `date`.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }

    /// Calendar year derived from `date`.
    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// Returns the value of a categorical field.
    pub fn field(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Startup => self.startup.as_deref(),
            RecordField::Vertical => self.vertical.as_deref(),
            RecordField::Subvertical => self.subvertical.as_deref(),
            RecordField::City => self.city.as_deref(),
            RecordField::Investors => self.investors.as_deref(),
            RecordField::Round => self.round.as_deref(),
        }
    }

    /// Splits the investors field on commas, trimming each name.
    ///
    /// Empty tokens (e.g. from a trailing comma) are skipped.
    pub fn investor_names(&self) -> impl Iterator<Item = &str> {
        self.investors
            .as_deref()
            .into_iter()
            .flat_map(|raw| raw.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Categorical fields a record set can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordField {
    Startup,
    Vertical,
    Subvertical,
    City,
    Investors,
    Round,
}

impl RecordField {
    /// Column name as it appears in the input file.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Startup => "startup",
            RecordField::Vertical => "vertical",
            RecordField::Subvertical => "subvertical",
            RecordField::City => "city",
            RecordField::Investors => "investors",
            RecordField::Round => "round",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(RecordField::Startup),
            "vertical" => Ok(RecordField::Vertical),
            "subvertical" => Ok(RecordField::Subvertical),
            "city" => Ok(RecordField::City),
            "investors" => Ok(RecordField::Investors),
            "round" => Ok(RecordField::Round),
            other => Err(AggregationError::UnknownField(other.to_string())),
        }
    }
}

/// Parses a raw date cell, returning `None` when no known format matches.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}
