use anyhow::Result;
use ledger::{Coordinator, RoleAuthorizer};
use sea_orm::Database;
use std::sync::Arc;

use crate::schemas::AppState;

/// Initialize application configuration and state
pub async fn initialize_app_state() -> Result<AppState> {
    // Load configuration
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://procura.db".to_string());

    initialize_app_state_with_url(&database_url).await
}

/// Initialize application state against an explicit database URL
pub async fn initialize_app_state_with_url(database_url: &str) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    let coordinator = Arc::new(Coordinator::new(db.clone(), Arc::new(RoleAuthorizer)));

    Ok(AppState { db, coordinator })
}

/// Get bind address from environment or use default
pub fn get_bind_address() -> String {
    std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
