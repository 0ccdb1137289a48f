//! Report exports.

pub mod exporter_csv;

use thiserror::Error;

pub use exporter_csv::{export_ranking_csv, export_route_history_csv, export_route_history_to_file};

/// Errors during report export.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Nothing to export
    #[error("No data to export")]
    NoData,

    #[error("Failed to write report: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
