#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use ledger::{Coordinator, RoleAuthorizer};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// User IDs seeded by `setup_test_app_state`, in insertion order.
    pub const SUPERVISOR_ID: i32 = 1;
    pub const MANAGER_ID: i32 = 2;
    pub const VENDOR_ID: i32 = 1;
    pub const OP_CO_ID: i32 = 1;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, with reference data the workflow
    /// endpoints need: a supervisor, a project manager, a vendor and an
    /// operating company.
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        model::entities::user::ActiveModel {
            name: Set("Sam Supervisor".to_string()),
            email: Set("supervisor@example.com".to_string()),
            role: Set(model::entities::user::Role::Supervisor),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to create supervisor");

        model::entities::user::ActiveModel {
            name: Set("Pat Manager".to_string()),
            email: Set("manager@example.com".to_string()),
            role: Set(model::entities::user::Role::ProjectManager),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to create project manager");

        model::entities::vendor::ActiveModel {
            name: Set("Acme Supply".to_string()),
            contact_email: Set(Some("sales@acme.example".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to create vendor");

        model::entities::operating_company::ActiveModel {
            name: Set("Northwind Logistics".to_string()),
            code: Set("NWL".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .expect("Failed to create operating company");

        let coordinator = Arc::new(Coordinator::new(db.clone(), Arc::new(RoleAuthorizer)));
        AppState { db, coordinator }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is taken from RUST_LOG, defaulting to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }
}
