use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDateTime;
use ledger::{audit, Actor, EntityRef, LedgerError};
use model::entities::{history, user};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::schemas::ApiResponse;

pub mod budget_pools;
pub mod charge_outs;
pub mod expenses;
pub mod health;
pub mod om_expenses;
pub mod projects;
pub mod proposals;
pub mod purchase_orders;
pub mod summaries;

/// Request body shared by all workflow transition endpoints.
///
/// Authentication is out of scope for this service; callers are trusted to
/// have verified the identity behind `actor_user_id` already.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TransitionBody {
    /// User performing the action
    pub actor_user_id: i32,
    /// Optional note, stored in the audit trail
    pub note: Option<String>,
    /// Version the client last read; omitted means "latest"
    pub expected_version: Option<i32>,
}

/// One audit trail entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: i32,
    /// Action tag, e.g. "SUBMITTED" or "APPROVED"
    pub action: String,
    /// Free-form details, typically the reviewer's note
    pub details: Option<String>,
    /// User who performed the action
    pub user_id: i32,
    pub created_at: NaiveDateTime,
}

impl From<history::Model> for HistoryEntryResponse {
    fn from(model: history::Model) -> Self {
        Self {
            id: model.id,
            action: model.action,
            details: model.details,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

/// Shared implementation behind every `/{id}/history` endpoint.
pub(crate) async fn list_history(
    db: &DatabaseConnection,
    entity: EntityRef,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    match audit::list_for(db, entity).await {
        Ok(entries) => {
            debug!("Retrieved {} history entries for {:?}", entries.len(), entity);
            let response = ApiResponse {
                data: entries.into_iter().map(HistoryEntryResponse::from).collect(),
                message: "History retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("list_history", err)),
    }
}

/// Maps a ledger error onto the HTTP status the API promises.
pub(crate) fn status_for(operation: &str, err: LedgerError) -> StatusCode {
    match err {
        LedgerError::InvalidTransition { .. } | LedgerError::InvalidState(_) => {
            warn!("{} rejected: {}", operation, err);
            StatusCode::BAD_REQUEST
        }
        LedgerError::Forbidden(_) => {
            warn!("{} forbidden: {}", operation, err);
            StatusCode::FORBIDDEN
        }
        LedgerError::NotFound(_) => {
            warn!("{} target missing: {}", operation, err);
            StatusCode::NOT_FOUND
        }
        LedgerError::Conflict(_) => {
            warn!("{} lost a concurrent update: {}", operation, err);
            StatusCode::CONFLICT
        }
        LedgerError::Database(db_error) => {
            error!("{} failed with database error: {}", operation, db_error);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Resolves the acting user into a ledger `Actor`, with their stored role.
pub(crate) async fn load_actor(db: &DatabaseConnection, user_id: i32) -> Result<Actor, StatusCode> {
    match user::Entity::find_by_id(user_id).one(db).await {
        Ok(Some(user_model)) => Ok(Actor {
            user_id: user_model.id,
            role: user_model.role,
        }),
        Ok(None) => {
            warn!("Acting user {} not found", user_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to load acting user {}: {}", user_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
