//! View Controllers
//!
//! Each view runs a fixed sequence of aggregation queries against the shared
//! dataset and packages the results for the presentation layer:
//!
//! - [`overall`]: market-wide metrics, rankings, heatmap and trends
//! - [`startup`]: drill-down for one startup
//! - [`investor`]: drill-down for one investor

pub mod investor;
pub mod overall;
pub mod startup;

pub use investor::{investor_view, InvestmentRow, InvestorView};
pub use overall::{overall_view, InvestorCountRow, OverallParams, OverallView, RankRow};
pub use startup::{startup_view, FundingRoundRow, SimilarCompanyRow, StartupOverview, StartupView};

use std::fmt;

/// Unit suffix used for every amount shown to the user.
pub const AMOUNT_UNIT: &str = "cr";

/// Errors surfaced by the drill-down views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// No record carries this startup name
    StartupNotFound(String),
    /// No record's investors field contains this name
    InvestorNotFound(String),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::StartupNotFound(name) => write!(f, "Startup not found: {}", name),
            ViewError::InvestorNotFound(name) => write!(f, "Investor not found: {}", name),
        }
    }
}

impl std::error::Error for ViewError {}
