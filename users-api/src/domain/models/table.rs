use csv::{ReaderBuilder, Trim, WriterBuilder};
use itertools::Itertools;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::domain::TableError;

/// Columns every stored user table carries.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "name",
    "surname",
    "second_name",
    "email",
    "phone_number",
];

pub const ID_COLUMN: &str = "id";
pub const PHONE_COLUMN: &str = "phone_number";

/// An ordered, rectangular set of string rows over a named column list.
///
/// Every row holds exactly one cell per column. Missing cells are stored as
/// empty strings, which is also how they are written back to CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Value of the first column named `column`, if the table has it.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| self.cells[index].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter().map(String::as_str))
    }
}

/// Serializes as a map in the table's column order.
impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Serializes as a list of row maps.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Parses CSV text with a mandatory header row.
    ///
    /// Rows shorter than the header are padded with empty cells; rows longer
    /// than the header are rejected. `trim` controls whether only header names
    /// or header names and cell values are trimmed.
    pub fn from_csv(input: &str, trim: Trim) -> Result<Self, TableError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(trim)
            .from_reader(input.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.iter().all(|column| column.is_empty()) {
            return Err(TableError::Empty);
        }

        let mut table = Self::new(columns);
        for record in reader.records() {
            let record = record?;
            if record.len() > table.columns.len() {
                return Err(TableError::RaggedRow {
                    line: record.position().map(|pos| pos.line()).unwrap_or_default(),
                    expected: table.columns.len(),
                    found: record.len(),
                });
            }
            table.push_row(record.iter().map(str::to_string).collect());
        }

        Ok(table)
    }

    /// Serializes the table as CSV, header row first.
    pub fn to_csv(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        writer
            .into_inner()
            .map_err(|err| TableError::Io(err.into_error()))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn has_columns(&self, columns: &[&str]) -> bool {
        columns
            .iter()
            .all(|column| self.column_index(column).is_some())
    }

    /// Appends a row, padding it with empty cells up to the column count.
    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len().max(cells.len()), String::new());
        self.rows.push(cells);
    }

    /// First row whose `id` cell equals `id`, in table order.
    pub fn find_by_id(&self, id: &str) -> Option<Row<'_>> {
        self.rows().find(|row| row.get(ID_COLUMN) == Some(id))
    }

    /// Returns the index of `column`, appending it back-filled with empty
    /// cells when the table does not have it yet.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(index) = self.column_index(column) {
            return index;
        }

        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.columns.len() - 1
    }

    /// Rewrites every cell of `column` in place.
    pub fn map_column<F>(&mut self, column: &str, f: F) -> Result<(), TableError>
    where
        F: Fn(&str) -> String,
    {
        let index = self
            .column_index(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;

        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
        Ok(())
    }

    /// Appends the rows of `other` after this table's rows.
    ///
    /// Columns only `other` has are added after this table's columns; cells a
    /// source table did not have stay empty.
    pub fn concat(mut self, other: Table) -> Table {
        let positions: Vec<usize> = other
            .columns
            .iter()
            .map(|column| self.ensure_column(column))
            .collect();

        for row in other.rows {
            let mut cells = vec![String::new(); self.columns.len()];
            for (cell, &position) in row.into_iter().zip(&positions) {
                cells[position] = cell;
            }
            self.rows.push(cells);
        }

        self
    }

    /// Drops every row whose `column` value reappears later in the table.
    ///
    /// Surviving rows keep their relative order.
    pub fn dedup_keep_last(&mut self, column: &str) -> Result<(), TableError> {
        let index = self
            .column_index(column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;

        let mut kept: Vec<Vec<String>> = std::mem::take(&mut self.rows)
            .into_iter()
            .rev()
            .unique_by(|row| row[index].clone())
            .collect();
        kept.reverse();
        self.rows = kept;
        Ok(())
    }
}
