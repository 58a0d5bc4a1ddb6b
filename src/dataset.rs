//! Dataset loading and the content-keyed snapshot cache.
//!
//! The dataset is read once from a CSV file, turned into an immutable
//! [`Dataset`] and shared by reference (usually behind an `Arc`) with every
//! view. Nothing mutates it after construction.

use crate::aggregation::RecordSet;
use crate::funding_record::{parse_date, FundingRecord};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Columns that must be present in the input header.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "date",
    "startup",
    "vertical",
    "subvertical",
    "city",
    "investors",
    "round",
    "amount",
];

/// Errors that abort a dataset load.
#[derive(Debug)]
pub enum DatasetError {
    /// The source file could not be read
    Io(std::io::Error),
    /// The CSV is structurally invalid (e.g. ragged rows)
    Csv(csv::Error),
    /// The header lacks a required column
    MissingColumn(String),
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "Failed to read dataset: {}", err),
            DatasetError::Csv(err) => write!(f, "Malformed dataset: {}", err),
            DatasetError::MissingColumn(col) => write!(f, "Dataset is missing column '{}'", col),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io(err) => Some(err),
            DatasetError::Csv(err) => Some(err),
            DatasetError::MissingColumn(_) => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(err: csv::Error) -> Self {
        DatasetError::Csv(err)
    }
}

/// Row as it appears in the file, before date and amount parsing.
#[derive(Debug, Deserialize)]
struct RawRow {
    date: Option<String>,
    startup: Option<String>,
    vertical: Option<String>,
    subvertical: Option<String>,
    city: Option<String>,
    investors: Option<String>,
    round: Option<String>,
    amount: Option<String>,
}

/// Counters describing how much of the input had to be recovered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    /// Rows whose date could not be parsed (date nulled)
    pub malformed_dates: usize,
    /// Rows with an absent or non-numeric amount
    pub missing_amounts: usize,
}

/// Immutable, in-memory funding dataset.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<FundingRecord>,
    summary: LoadSummary,
}

impl Dataset {
    /// Builds a dataset directly from records.
    pub fn from_records(records: Vec<FundingRecord>) -> Self {
        let summary = LoadSummary {
            rows: records.len(),
            malformed_dates: records.iter().filter(|r| r.date.is_none()).count(),
            missing_amounts: records.iter().filter(|r| r.amount.is_none()).count(),
        };
        Dataset { records, summary }
    }

    /// Loads a dataset from a CSV file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the CSV is malformed, or
    /// a required column is missing. Unparseable dates and amounts are not
    /// errors; they become `None`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_reader(bytes.as_slice())
    }

    /// Loads a dataset from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(DatasetError::MissingColumn(column.to_string()));
            }
        }

        let mut records = Vec::new();
        let mut summary = LoadSummary::default();

        for row in reader.deserialize::<RawRow>() {
            let row = row?;

            let date = row.date.as_deref().and_then(parse_date);
            if date.is_none() {
                summary.malformed_dates += 1;
            }

            let amount = row
                .amount
                .as_deref()
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite());
            if amount.is_none() {
                summary.missing_amounts += 1;
            }

            records.push(FundingRecord {
                date,
                startup: row.startup,
                vertical: row.vertical,
                subvertical: row.subvertical,
                city: row.city,
                investors: row.investors,
                round: row.round,
                amount,
            });
        }
        summary.rows = records.len();

        tracing::info!(
            rows = summary.rows,
            malformed_dates = summary.malformed_dates,
            missing_amounts = summary.missing_amounts,
            "Loaded funding dataset"
        );
        if summary.malformed_dates > 0 {
            tracing::warn!(
                "{} rows have unparseable dates and are excluded from date-keyed aggregations",
                summary.malformed_dates
            );
        }

        Ok(Dataset { records, summary })
    }

    /// Borrowed view over every record, the entry point for aggregation.
    pub fn records(&self) -> RecordSet<'_> {
        RecordSet::new(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }
}

/// Result of loading through a [`DatasetCache`].
#[derive(Debug, Clone)]
pub struct CacheLoad {
    pub dataset: Arc<Dataset>,
    /// `true` when the file content differed from the cached snapshot
    pub refreshed: bool,
}

struct CachedDataset {
    content_key: u64,
    dataset: Arc<Dataset>,
}

/// Caches the parsed dataset keyed by a hash of the source file's bytes.
///
/// Loading the same content twice returns the same `Arc`; the snapshot is
/// only replaced when the file content changes.
#[derive(Default)]
pub struct DatasetCache {
    cached: Mutex<Option<CachedDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        DatasetCache {
            cached: Mutex::new(None),
        }
    }

    /// Reads `path` and returns the cached snapshot if its content is unchanged.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<CacheLoad, DatasetError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load_bytes(&bytes)
    }

    /// Same as [`DatasetCache::load`] for file content that was already read.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<CacheLoad, DatasetError> {
        let content_key = content_key(bytes);

        let mut cached = self.cached.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(entry) = cached.as_ref() {
            if entry.content_key == content_key {
                tracing::debug!(content_key, "Dataset cache hit");
                return Ok(CacheLoad {
                    dataset: Arc::clone(&entry.dataset),
                    refreshed: false,
                });
            }
        }

        let dataset = Arc::new(Dataset::from_reader(bytes)?);
        *cached = Some(CachedDataset {
            content_key,
            dataset: Arc::clone(&dataset),
        });

        Ok(CacheLoad {
            dataset,
            refreshed: true,
        })
    }
}

fn content_key(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
