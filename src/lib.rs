pub mod funding_record;
pub mod dataset;
pub mod aggregation;
pub mod presentation;
pub mod selection;
pub mod views;
pub mod server;

#[cfg(test)]
mod integration_tests;

pub use funding_record::{parse_date, FundingRecord, RecordField};
pub use dataset::{CacheLoad, Dataset, DatasetCache, DatasetError, LoadSummary};
pub use aggregation::{
    AggregationError,
    CategoryValue,
    HeatmapMatrix,
    InvestorRecord,
    MonthlyPoint,
    RecordSet,
    SeriesAggregation,
    YearlyPoint,
};
pub use presentation::{ChartKind, ChartSeries, ScalarMetric, Table};
pub use selection::{ModeOption, MonthlyMetric, SelectionOptions, ViewMode};
pub use views::{investor_view, overall_view, startup_view, OverallParams, ViewError};
pub use server::{create_router, run_server, ApiError, AppState, ServerConfig};
