use serde::Serialize;

use super::Row;

/// One entry of the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub second_name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<Row<'_>> for UserRecord {
    fn from(row: Row<'_>) -> Self {
        let cell = |column: &str| row.get(column).unwrap_or_default().to_string();

        Self {
            id: cell("id"),
            name: cell("name"),
            surname: cell("surname"),
            second_name: cell("second_name"),
            email: cell("email"),
            phone_number: cell("phone_number"),
        }
    }
}

/// Row counts reported after a successful ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub existing_rows: usize,
    pub uploaded_rows: usize,
    pub stored_rows: usize,
}
