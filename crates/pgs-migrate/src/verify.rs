//! Post-migration verification reporter
//!
//! Collects active-connection and base-table counts for each migrated
//! database on both instances and renders a side-by-side report. Purely
//! diagnostic: it never fails the run; unobtainable counts render as `-`
//! and discrepancies are left for human review.

use pgs_core::VerificationRecord;
use pgs_db::DbProbe;

/// Collect paired counts for every database
pub async fn collect_records(
    probe: &dyn DbProbe,
    source_host: &str,
    target_host: &str,
    databases: &[String],
) -> Vec<VerificationRecord> {
    let mut records = Vec::with_capacity(databases.len());
    for database in databases {
        records.push(VerificationRecord {
            database: database.clone(),
            source_connections: count_or_none(
                probe.active_connections(source_host, database).await,
                database,
                "source connections",
            ),
            target_connections: count_or_none(
                probe.active_connections(target_host, database).await,
                database,
                "target connections",
            ),
            source_tables: count_or_none(
                probe.table_count(source_host, database).await,
                database,
                "source tables",
            ),
            target_tables: count_or_none(
                probe.table_count(target_host, database).await,
                database,
                "target tables",
            ),
        });
    }
    records
}

fn count_or_none(result: Result<i64, pgs_db::ProbeError>, database: &str, what: &str) -> Option<i64> {
    match result {
        Ok(count) => Some(count),
        Err(e) => {
            log::warn!("Could not read {what} for '{database}': {e}");
            None
        }
    }
}

/// Render the records as an aligned text table
pub fn render_report(records: &[VerificationRecord]) -> String {
    let headers = ["DATABASE", "SRC CONN", "DST CONN", "SRC TABLES", "DST TABLES"];
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.database.clone(),
                cell(r.source_connections),
                cell(r.target_connections),
                cell(r.source_tables),
                cell(r.target_tables),
            ]
        })
        .collect();

    let widths = column_widths(&headers, &rows);
    let mut out = String::new();

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{h:<w$}"))
        .collect();
    out.push_str(&header_parts.join("  "));
    out.push('\n');

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep_parts.join("  "));
    out.push('\n');

    for row in &rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        out.push_str(&row_parts.join("  "));
        out.push('\n');
    }

    out
}

fn cell(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}
