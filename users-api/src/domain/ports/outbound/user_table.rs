use std::path::Path;

use async_trait::async_trait;

use crate::domain::{models::Table, StoreError};

/// Outbound port for the persisted user table.
#[async_trait]
pub trait UserTableRepository: Send + Sync + 'static {
    /// Reads the whole table. `None` when the backing file does not exist.
    async fn read_table(&self) -> Result<Option<Table>, StoreError>;

    /// Overwrites the backing file with `table`.
    async fn save_table(&self, table: &Table) -> Result<(), StoreError>;

    fn location(&self) -> &Path;

    /// Like [`read_table`](Self::read_table), with a missing file read as an
    /// empty table.
    async fn load_table(&self) -> Result<Table, StoreError> {
        Ok(self.read_table().await?.unwrap_or_default())
    }
}
