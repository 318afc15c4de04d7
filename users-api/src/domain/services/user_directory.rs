use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ingest::{merge_tables, parse_upload, validate_structure},
    models::{IngestSummary, Table, UserRecord},
    ports::{inbound::UserDirectoryService, outbound::UserTableRepository},
    UserDirectoryError,
};

pub struct UserDirectoryServiceImpl<R> {
    repository: Arc<R>,
    // Held for the whole read-merge-write cycle so uploads to one process
    // cannot overwrite each other.
    write_lock: Mutex<()>,
}

impl<R: UserTableRepository> UserDirectoryServiceImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }

    /// Backing table for the read path, where any failure reads as no data.
    async fn lenient_table(&self) -> Table {
        match self.repository.load_table().await {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!("Serving empty user table, backing file unreadable: {}", err);
                Table::default()
            }
        }
    }

    async fn merge_upload(&self, content: &str) -> Result<IngestSummary, UserDirectoryError> {
        let incoming = parse_upload(content)?;
        if incoming.is_empty() {
            tracing::debug!("Upload has a header but no rows");
        }
        let uploaded_rows = incoming.len();

        let existing = self.repository.read_table().await?;
        let existing_rows = existing.as_ref().map_or(0, |table| table.len());

        let merged = merge_tables(existing, incoming)?;
        self.repository.save_table(&merged).await?;

        Ok(IngestSummary {
            existing_rows,
            uploaded_rows,
            stored_rows: merged.len(),
        })
    }
}

#[async_trait]
impl<R: UserTableRepository> UserDirectoryService for UserDirectoryServiceImpl<R> {
    async fn list_users(&self) -> Vec<UserRecord> {
        self.lenient_table()
            .await
            .rows()
            .map(UserRecord::from)
            .collect()
    }

    async fn get_user(&self, id: &str) -> Result<UserRecord, UserDirectoryError> {
        self.lenient_table()
            .await
            .find_by_id(id)
            .map(UserRecord::from)
            .ok_or_else(|| UserDirectoryError::UserNotFound(id.to_string()))
    }

    async fn raw_rows(&self) -> Result<Table, UserDirectoryError> {
        self.repository
            .read_table()
            .await?
            .ok_or(UserDirectoryError::DataFileNotFound)
    }

    fn validate_upload(&self, content: &str) -> bool {
        validate_structure(content)
    }

    async fn ingest_upload(&self, content: &str) -> Result<IngestSummary, UserDirectoryError> {
        let _guard = self.write_lock.lock().await;

        match self.merge_upload(content).await {
            Ok(summary) => {
                tracing::info!(
                    existing = summary.existing_rows,
                    uploaded = summary.uploaded_rows,
                    stored = summary.stored_rows,
                    "Merged upload into {}",
                    self.repository.location().display()
                );
                Ok(summary)
            }
            Err(err) => {
                tracing::error!("Failed to merge upload: {}", err);
                Err(err)
            }
        }
    }
}
