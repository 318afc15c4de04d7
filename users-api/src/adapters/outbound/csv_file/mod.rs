use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use csv::Trim;

use crate::domain::{models::Table, ports::outbound::UserTableRepository, StoreError};

/// User table persisted as a single CSV file.
///
/// Every read parses the whole file and every save rewrites it in place.
pub struct CsvUserTableRepository {
    path: PathBuf,
}

impl CsvUserTableRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Read {
            path: self.path.clone(),
            source,
        }
    }

    fn write_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl UserTableRepository for CsvUserTableRepository {
    async fn read_table(&self) -> Result<Option<Table>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.read_error(err)),
        };

        // A zero-length file is what a truncated first write leaves behind.
        if content.trim().is_empty() {
            return Ok(Some(Table::default()));
        }

        Table::from_csv(&content, Trim::All)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                path: self.path.clone(),
                source,
            })
    }

    async fn save_table(&self, table: &Table) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.write_error(err))?;
        }

        let bytes = table.to_csv().map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|err| self.write_error(err))
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::REQUIRED_COLUMNS;

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let repository = CsvUserTableRepository::new(dir.path().join("absent.csv"));

        assert!(repository.read_table().await.unwrap().is_none());
        assert!(repository.load_table().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_trims_headers_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, " id , name \n 1 , Ann \n").unwrap();
        let repository = CsvUserTableRepository::new(&path);

        let table = repository.load_table().await.unwrap();

        assert_eq!(table.columns(), ["id", "name"]);
        assert_eq!(table.find_by_id("1").unwrap().get("name"), Some("Ann"));
    }

    #[tokio::test]
    async fn blank_file_reads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "").unwrap();
        let repository = CsvUserTableRepository::new(&path);

        let table = repository.read_table().await.unwrap();

        assert_eq!(table, Some(Table::default()));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "id,name\n1,Ann,extra\n").unwrap();
        let repository = CsvUserTableRepository::new(&path);

        assert!(matches!(
            repository.read_table().await,
            Err(StoreError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn save_creates_parent_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("database.csv");
        let repository = CsvUserTableRepository::new(&path);

        let mut table = Table::new(REQUIRED_COLUMNS);
        table.push_row(vec!["1".into(), "Ann".into()]);
        repository.save_table(&table).await.unwrap();
        repository.save_table(&table).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "id,name,surname,second_name,email,phone_number\n1,Ann,,,,\n"
        );
        assert_eq!(repository.load_table().await.unwrap(), table);
    }
}
