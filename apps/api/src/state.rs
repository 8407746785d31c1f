use std::sync::Arc;

use sqlx::PgPool;

use crate::llm_client::ChatModel;
use crate::storage::FileStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Chat backend shared by every pipeline stage. Built once at startup.
    pub llm: Arc<dyn ChatModel>,
    pub storage: FileStorage,
}
