use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::PoolSummary;
use ledger::summary;
use model::entities::{budget_category, budget_pool};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// One category allocation inside a pool
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CategoryInput {
    /// Category display name
    pub name: String,
    /// Short unique code within the pool (e.g. "HW")
    pub code: String,
    /// Allocated amount
    pub total_amount: Decimal,
}

/// Request body for creating a budget pool with its categories
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBudgetPoolRequest {
    /// Pool name
    pub name: String,
    /// Fiscal year the pool belongs to
    pub fiscal_year: i32,
    /// ISO 4217 currency code (e.g., "USD", "EUR")
    pub currency_code: String,
    /// Category allocations
    pub categories: Vec<CategoryInput>,
}

/// Budget pool response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetPoolResponse {
    pub id: i32,
    pub name: String,
    pub fiscal_year: i32,
    pub currency_code: String,
}

impl From<budget_pool::Model> for BudgetPoolResponse {
    fn from(model: budget_pool::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            fiscal_year: model.fiscal_year,
            currency_code: model.currency_code,
        }
    }
}

/// Create a new budget pool together with its category allocations
#[utoipa::path(
    post,
    path = "/api/v1/budget-pools",
    tag = "budget-pools",
    request_body = CreateBudgetPoolRequest,
    responses(
        (status = 201, description = "Budget pool created successfully", body = ApiResponse<BudgetPoolResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_budget_pool(
    State(state): State<AppState>,
    Json(request): Json<CreateBudgetPoolRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetPoolResponse>>), StatusCode> {
    trace!("Entering create_budget_pool function");
    debug!(
        "Creating budget pool '{}' for fiscal year {} with {} categories",
        request.name,
        request.fiscal_year,
        request.categories.len()
    );

    if request.categories.is_empty() {
        warn!("Rejecting budget pool '{}' with no categories", request.name);
        return Err(StatusCode::BAD_REQUEST);
    }
    if request
        .categories
        .iter()
        .any(|c| c.total_amount < Decimal::ZERO)
    {
        warn!("Rejecting budget pool '{}' with a negative allocation", request.name);
        return Err(StatusCode::BAD_REQUEST);
    }

    let result = state
        .db
        .transaction::<_, budget_pool::Model, sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let pool = budget_pool::ActiveModel {
                    name: Set(request.name),
                    fiscal_year: Set(request.fiscal_year),
                    currency_code: Set(request.currency_code),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                for category in request.categories {
                    budget_category::ActiveModel {
                        pool_id: Set(pool.id),
                        name: Set(category.name),
                        code: Set(category.code),
                        total_amount: Set(category.total_amount),
                        used_amount: Set(Decimal::ZERO),
                        version: Set(0),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(pool)
            })
        })
        .await;

    match result {
        Ok(pool) => {
            info!("Budget pool created successfully with ID: {}", pool.id);
            let response = ApiResponse {
                data: BudgetPoolResponse::from(pool),
                message: "Budget pool created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create budget pool: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all budget pools
#[utoipa::path(
    get,
    path = "/api/v1/budget-pools",
    tag = "budget-pools",
    responses(
        (status = 200, description = "Budget pools retrieved successfully", body = ApiResponse<Vec<BudgetPoolResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget_pools(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetPoolResponse>>>, StatusCode> {
    trace!("Entering get_budget_pools function");

    match budget_pool::Entity::find().all(&state.db).await {
        Ok(pools) => {
            debug!("Retrieved {} budget pools", pools.len());
            let response = ApiResponse {
                data: pools.into_iter().map(BudgetPoolResponse::from).collect(),
                message: "Budget pools retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve budget pools: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a budget pool with its consumption summary
#[utoipa::path(
    get,
    path = "/api/v1/budget-pools/{pool_id}",
    tag = "budget-pools",
    params(
        ("pool_id" = i32, Path, description = "Budget pool ID"),
    ),
    responses(
        (status = 200, description = "Budget pool retrieved successfully", body = ApiResponse<PoolSummary>),
        (status = 404, description = "Budget pool not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_budget_pool(
    Path(pool_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PoolSummary>>, StatusCode> {
    trace!("Entering get_budget_pool function for pool_id: {}", pool_id);

    match summary::pool_summary(&state.db, pool_id).await {
        Ok(pool_summary) => {
            info!("Successfully retrieved budget pool {}", pool_id);
            let response = ApiResponse {
                data: pool_summary,
                message: "Budget pool retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(crate::handlers::status_for("get_budget_pool", err)),
    }
}

/// Replace a pool's category allocations
///
/// Only legal while no consumption has been recorded against any category in
/// the pool; reshaping allocations under recorded spending would orphan the
/// consumed amounts.
#[utoipa::path(
    put,
    path = "/api/v1/budget-pools/{pool_id}/categories",
    tag = "budget-pools",
    params(
        ("pool_id" = i32, Path, description = "Budget pool ID"),
    ),
    request_body = Vec<CategoryInput>,
    responses(
        (status = 200, description = "Categories updated successfully", body = ApiResponse<PoolSummary>),
        (status = 400, description = "Pool already has recorded consumption", body = ErrorResponse),
        (status = 404, description = "Budget pool not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_pool_categories(
    Path(pool_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<Vec<CategoryInput>>,
) -> Result<Json<ApiResponse<PoolSummary>>, StatusCode> {
    trace!("Entering update_pool_categories for pool_id: {}", pool_id);

    if request.is_empty() || request.iter().any(|c| c.total_amount < Decimal::ZERO) {
        warn!("Invalid category allocations for pool {}", pool_id);
        return Err(StatusCode::BAD_REQUEST);
    }

    match budget_pool::Entity::find_by_id(pool_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget pool {} not found for category update", pool_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to lookup budget pool {}: {}", pool_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let consumed = budget_category::Entity::find()
        .filter(budget_category::Column::PoolId.eq(pool_id))
        .filter(budget_category::Column::UsedAmount.gt(Decimal::ZERO))
        .one(&state.db)
        .await;
    match consumed {
        Ok(Some(category)) => {
            warn!(
                "Pool {} has recorded consumption on category '{}', refusing reallocation",
                pool_id, category.code
            );
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(None) => {}
        Err(db_error) => {
            error!("Failed to check pool {} consumption: {}", pool_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let result = state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                budget_category::Entity::delete_many()
                    .filter(budget_category::Column::PoolId.eq(pool_id))
                    .exec(txn)
                    .await?;
                for category in request {
                    budget_category::ActiveModel {
                        pool_id: Set(pool_id),
                        name: Set(category.name),
                        code: Set(category.code),
                        total_amount: Set(category.total_amount),
                        used_amount: Set(Decimal::ZERO),
                        version: Set(0),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }
                Ok(())
            })
        })
        .await;

    if let Err(db_error) = result {
        error!("Failed to update pool {} categories: {}", pool_id, db_error);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    match summary::pool_summary(&state.db, pool_id).await {
        Ok(pool_summary) => {
            info!("Categories for pool {} updated successfully", pool_id);
            let response = ApiResponse {
                data: pool_summary,
                message: "Categories updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(crate::handlers::status_for("update_pool_categories", err)),
    }
}

/// Delete a budget pool
#[utoipa::path(
    delete,
    path = "/api/v1/budget-pools/{pool_id}",
    tag = "budget-pools",
    params(
        ("pool_id" = i32, Path, description = "Budget pool ID"),
    ),
    responses(
        (status = 200, description = "Budget pool deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Pool has recorded consumption", body = ErrorResponse),
        (status = 404, description = "Budget pool not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_budget_pool(
    Path(pool_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_budget_pool for pool_id: {}", pool_id);

    let consumed = budget_category::Entity::find()
        .filter(budget_category::Column::PoolId.eq(pool_id))
        .filter(budget_category::Column::UsedAmount.gt(Decimal::ZERO))
        .one(&state.db)
        .await;
    match consumed {
        Ok(Some(_)) => {
            warn!("Pool {} has recorded consumption, refusing delete", pool_id);
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(None) => {}
        Err(db_error) => {
            error!("Failed to check pool {} consumption: {}", pool_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match budget_pool::Entity::delete_by_id(pool_id).exec(&state.db).await {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Budget pool {} deleted successfully", pool_id);
                let response = ApiResponse {
                    data: format!("Budget pool {} deleted", pool_id),
                    message: "Budget pool deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Budget pool {} not found for deletion", pool_id);
                Err(StatusCode::NOT_FOUND)
            }
        }
        Err(db_error) => {
            error!("Failed to delete budget pool {}: {}", pool_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
