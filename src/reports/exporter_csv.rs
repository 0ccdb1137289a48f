//! CSV export of route history and the leaderboard.

use std::io::Write;
use std::path::Path;

use super::ReportError;
use crate::gamification::RankedMessenger;
use crate::routes::RouteHistory;

/// Quote a free-text field when it holds a delimiter, quote or newline.
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Export route history records to CSV, one row per stop.
pub fn export_route_history_csv(records: &[RouteHistory]) -> Result<String, ReportError> {
    if records.is_empty() {
        return Err(ReportError::NoData);
    }

    let mut output = Vec::new();

    writeln!(
        output,
        "id,completed_at,messenger_id,messenger_name,client_id,client_name,vehicle_code,start_time,end_time,duration_minutes,star_rating,points_earned,completed_by,note"
    )
    .map_err(|e| ReportError::WriteFailed(e.to_string()))?;

    for record in records {
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.id,
            record.completed_at.to_rfc3339(),
            record.messenger_id,
            field(&record.messenger_name),
            record.client_id,
            field(&record.client_name),
            field(&record.vehicle_code),
            record.start_time.to_rfc3339(),
            record.end_time.to_rfc3339(),
            record.duration,
            record.star_rating,
            record.points_earned,
            field(&record.completed_by),
            field(&record.note),
        )
        .map_err(|e| ReportError::WriteFailed(e.to_string()))?;
    }

    String::from_utf8(output).map_err(|e| ReportError::WriteFailed(e.to_string()))
}

/// Export the leaderboard to CSV.
pub fn export_ranking_csv(ranking: &[RankedMessenger]) -> Result<String, ReportError> {
    if ranking.is_empty() {
        return Err(ReportError::NoData);
    }

    let mut output = Vec::new();

    writeln!(output, "rank,messenger_id,name,points")
        .map_err(|e| ReportError::WriteFailed(e.to_string()))?;

    for row in ranking {
        writeln!(
            output,
            "{},{},{},{}",
            row.rank,
            row.messenger_id,
            field(&row.name),
            row.points
        )
        .map_err(|e| ReportError::WriteFailed(e.to_string()))?;
    }

    String::from_utf8(output).map_err(|e| ReportError::WriteFailed(e.to_string()))
}

/// Export route history to CSV and write it to a file.
pub fn export_route_history_to_file(records: &[RouteHistory], path: &Path) -> Result<(), ReportError> {
    let content = export_route_history_csv(records)?;
    std::fs::write(path, content)?;
    Ok(())
}
