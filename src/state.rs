use crate::config::AppConfig;
use crate::services::notifications::NotificationDispatcher;
use crate::storage::DocumentStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: DocumentStore,
    pub notifications: NotificationDispatcher,
}
