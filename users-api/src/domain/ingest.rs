//! Upload validation and the merge applied on every ingest.

use csv::Trim;

use crate::domain::{
    models::{normalize_phone, Table, PHONE_COLUMN, REQUIRED_COLUMNS},
    TableError,
};

/// Parses an uploaded CSV body. Only header names are trimmed.
pub fn parse_upload(content: &str) -> Result<Table, TableError> {
    Table::from_csv(content, Trim::Headers)
}

/// True when `content` parses as a table carrying every required column.
///
/// Parse failures, including empty input, count as invalid.
pub fn validate_structure(content: &str) -> bool {
    parse_upload(content)
        .map(|table| table.has_columns(&REQUIRED_COLUMNS))
        .unwrap_or(false)
}

/// Merges `incoming` on top of `existing`.
///
/// Phone numbers are normalized on both sides, rows are deduplicated by
/// phone keeping the last occurrence, and required columns missing from the
/// result are added with empty cells.
pub fn merge_tables(existing: Option<Table>, mut incoming: Table) -> Result<Table, TableError> {
    incoming.map_column(PHONE_COLUMN, normalize_phone)?;

    let mut merged = match existing {
        Some(mut existing) if !existing.columns().is_empty() => {
            existing.map_column(PHONE_COLUMN, normalize_phone)?;
            existing.concat(incoming)
        }
        _ => incoming,
    };
    merged.dedup_keep_last(PHONE_COLUMN)?;

    for column in REQUIRED_COLUMNS {
        merged.ensure_column(column);
    }

    Ok(merged)
}
