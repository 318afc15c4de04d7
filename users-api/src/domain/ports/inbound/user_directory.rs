use async_trait::async_trait;

use crate::domain::{
    models::{IngestSummary, Table, UserRecord},
    UserDirectoryError,
};

/// Inbound port for the user directory.
///
/// HTTP handlers only talk to the directory through this trait.
#[async_trait]
pub trait UserDirectoryService: Send + Sync + 'static {
    /// All users in file order. Read failures yield an empty list.
    async fn list_users(&self) -> Vec<UserRecord>;

    /// First user whose id matches `id`.
    async fn get_user(&self, id: &str) -> Result<UserRecord, UserDirectoryError>;

    /// Every row with all of its columns, in file order.
    ///
    /// Unlike [`list_users`](Self::list_users) this read is strict: a missing
    /// or malformed backing file is reported as an error.
    async fn raw_rows(&self) -> Result<Table, UserDirectoryError>;

    fn validate_upload(&self, content: &str) -> bool;

    /// Merges an uploaded CSV body into the backing file.
    async fn ingest_upload(&self, content: &str) -> Result<IngestSummary, UserDirectoryError>;
}
