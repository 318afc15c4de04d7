use std::sync::Arc;

use crate::domain::ports::inbound::UserDirectoryService;

#[derive(Clone)]
pub struct AppState {
    pub user_directory: Arc<dyn UserDirectoryService>,
}

impl AppState {
    pub fn new(user_directory: impl UserDirectoryService) -> Self {
        Self {
            user_directory: Arc::new(user_directory),
        }
    }
}
