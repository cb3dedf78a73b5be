use crate::handlers::{load_actor, status_for, HistoryEntryResponse};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use ledger::{EntityRef, MonthlyRecordUpdate, NewOmExpense};
use model::entities::{budget_category, om_expense, om_monthly_record};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating an O&M expense
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateOmExpenseRequest {
    /// User performing the creation
    pub actor_user_id: i32,
    /// Expense name
    pub name: String,
    /// Budget category the expense belongs to
    pub category_id: i32,
    /// Fiscal year
    pub fiscal_year: i32,
    /// Annual budget
    pub budget_amount: Decimal,
    /// Per-month budget split; exactly 12 values when present
    pub monthly_budgets: Option<Vec<Decimal>>,
}

/// One row of a monthly record batch update
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MonthlyRecordInput {
    /// Month number, 1 through 12
    pub month: i32,
    /// New budget amount; omitted leaves the stored value
    pub budget_amount: Option<Decimal>,
    /// New actual amount; omitted leaves the stored value
    pub actual_amount: Option<Decimal>,
}

/// Request body for batch-updating monthly records
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateMonthlyRecordsRequest {
    /// User performing the update
    pub actor_user_id: i32,
    /// Version the client last read; omitted means "latest"
    pub expected_version: Option<i32>,
    /// Records to update
    pub records: Vec<MonthlyRecordInput>,
}

/// Monthly record response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRecordResponse {
    pub id: i32,
    pub month: i32,
    pub budget_amount: Decimal,
    pub actual_amount: Decimal,
}

impl From<om_monthly_record::Model> for MonthlyRecordResponse {
    fn from(model: om_monthly_record::Model) -> Self {
        Self {
            id: model.id,
            month: model.month,
            budget_amount: model.budget_amount,
            actual_amount: model.actual_amount,
        }
    }
}

/// O&M expense response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OmExpenseResponse {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub fiscal_year: i32,
    pub budget_amount: Decimal,
    /// Always the sum of the twelve monthly actuals
    pub actual_spent: Decimal,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub monthly_records: Vec<MonthlyRecordResponse>,
}

impl OmExpenseResponse {
    fn from_parts(model: om_expense::Model, records: Vec<om_monthly_record::Model>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category_id: model.category_id,
            fiscal_year: model.fiscal_year,
            budget_amount: model.budget_amount,
            actual_spent: model.actual_spent,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            monthly_records: records.into_iter().map(MonthlyRecordResponse::from).collect(),
        }
    }
}

async fn load_records(
    state: &AppState,
    om_expense_id: i32,
) -> Result<Vec<om_monthly_record::Model>, StatusCode> {
    om_monthly_record::Entity::find()
        .filter(om_monthly_record::Column::OmExpenseId.eq(om_expense_id))
        .order_by_asc(om_monthly_record::Column::Month)
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!(
                "Failed to load monthly records for om expense {}: {}",
                om_expense_id, db_error
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Create a new O&M expense with its twelve monthly records
#[utoipa::path(
    post,
    path = "/api/v1/om-expenses",
    tag = "om-expenses",
    request_body = CreateOmExpenseRequest,
    responses(
        (status = 201, description = "O&M expense created successfully", body = ApiResponse<OmExpenseResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Budget category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_om_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateOmExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OmExpenseResponse>>), StatusCode> {
    trace!("Entering create_om_expense function");
    debug!(
        "Creating O&M expense '{}' for fiscal year {}",
        request.name, request.fiscal_year
    );

    let actor = load_actor(&state.db, request.actor_user_id).await?;

    match budget_category::Entity::find_by_id(request.category_id)
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget category {} not found", request.category_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup budget category {}: {}",
                request.category_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let input = NewOmExpense {
        name: request.name,
        category_id: request.category_id,
        fiscal_year: request.fiscal_year,
        budget_amount: request.budget_amount,
        monthly_budgets: request.monthly_budgets,
    };

    match state.coordinator.create_om_expense(input, &actor).await {
        Ok(om) => {
            info!("O&M expense created successfully with ID: {}", om.id);
            let records = load_records(&state, om.id).await?;
            let response = ApiResponse {
                data: OmExpenseResponse::from_parts(om, records),
                message: "O&M expense created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => Err(status_for("create_om_expense", err)),
    }
}

/// Get all O&M expenses
#[utoipa::path(
    get,
    path = "/api/v1/om-expenses",
    tag = "om-expenses",
    responses(
        (status = 200, description = "O&M expenses retrieved successfully", body = ApiResponse<Vec<OmExpenseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_om_expenses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<OmExpenseResponse>>>, StatusCode> {
    trace!("Entering get_om_expenses function");

    let expenses = match om_expense::Entity::find().all(&state.db).await {
        Ok(expenses) => expenses,
        Err(db_error) => {
            error!("Failed to retrieve O&M expenses: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut responses = Vec::with_capacity(expenses.len());
    for om in expenses {
        let records = load_records(&state, om.id).await?;
        responses.push(OmExpenseResponse::from_parts(om, records));
    }

    debug!("Retrieved {} O&M expenses", responses.len());
    let response = ApiResponse {
        data: responses,
        message: "O&M expenses retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific O&M expense by ID
#[utoipa::path(
    get,
    path = "/api/v1/om-expenses/{om_expense_id}",
    tag = "om-expenses",
    params(
        ("om_expense_id" = i32, Path, description = "O&M expense ID"),
    ),
    responses(
        (status = 200, description = "O&M expense retrieved successfully", body = ApiResponse<OmExpenseResponse>),
        (status = 404, description = "O&M expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_om_expense(
    Path(om_expense_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OmExpenseResponse>>, StatusCode> {
    trace!("Entering get_om_expense for om_expense_id: {}", om_expense_id);

    match om_expense::Entity::find_by_id(om_expense_id).one(&state.db).await {
        Ok(Some(om)) => {
            let records = load_records(&state, om_expense_id).await?;
            let response = ApiResponse {
                data: OmExpenseResponse::from_parts(om, records),
                message: "O&M expense retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("O&M expense {} not found", om_expense_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve O&M expense {}: {}", om_expense_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Batch-update monthly records and recompute the actual spend
#[utoipa::path(
    put,
    path = "/api/v1/om-expenses/{om_expense_id}/monthly-records",
    tag = "om-expenses",
    params(
        ("om_expense_id" = i32, Path, description = "O&M expense ID"),
    ),
    request_body = UpdateMonthlyRecordsRequest,
    responses(
        (status = 200, description = "Monthly records updated successfully", body = ApiResponse<OmExpenseResponse>),
        (status = 400, description = "Invalid months in batch", body = ErrorResponse),
        (status = 404, description = "O&M expense not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_monthly_records(
    Path(om_expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateMonthlyRecordsRequest>,
) -> Result<Json<ApiResponse<OmExpenseResponse>>, StatusCode> {
    trace!("Entering update_monthly_records for om_expense_id: {}", om_expense_id);

    let actor = load_actor(&state.db, request.actor_user_id).await?;
    let expected_version = match request.expected_version {
        Some(version) => version,
        None => match om_expense::Entity::find_by_id(om_expense_id).one(&state.db).await {
            Ok(Some(om)) => om.version,
            Ok(None) => {
                warn!("O&M expense {} not found", om_expense_id);
                return Err(StatusCode::NOT_FOUND);
            }
            Err(db_error) => {
                error!("Failed to lookup O&M expense {}: {}", om_expense_id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        },
    };

    let batch = request
        .records
        .into_iter()
        .map(|record| MonthlyRecordUpdate {
            month: record.month,
            budget_amount: record.budget_amount,
            actual_amount: record.actual_amount,
        })
        .collect();

    match state
        .coordinator
        .update_monthly_records(om_expense_id, batch, &actor, expected_version)
        .await
    {
        Ok(om) => {
            info!(
                "Monthly records for O&M expense {} updated, actual spent {}",
                om_expense_id, om.actual_spent
            );
            let records = load_records(&state, om_expense_id).await?;
            let response = ApiResponse {
                data: OmExpenseResponse::from_parts(om, records),
                message: "Monthly records updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("update_monthly_records", err)),
    }
}

/// Get the audit history of an O&M expense
#[utoipa::path(
    get,
    path = "/api/v1/om-expenses/{om_expense_id}/history",
    tag = "om-expenses",
    params(
        ("om_expense_id" = i32, Path, description = "O&M expense ID"),
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_om_expense_history(
    Path(om_expense_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    crate::handlers::list_history(&state.db, EntityRef::OmExpense(om_expense_id)).await
}
