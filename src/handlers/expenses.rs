use crate::handlers::{load_actor, status_for, HistoryEntryResponse, TransitionBody};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use ledger::machine::ExpenseAction;
use ledger::{EntityRef, TransitionRequest};
use model::entities::budget_category;
use model::entities::expense::{self, ExpenseStatus};
use model::entities::expense_item;
use model::entities::purchase_order::{self, PurchaseOrderStatus};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// One expense line item
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ExpenseItemInput {
    /// Item description
    pub name: String,
    /// Item amount
    pub amount: Decimal,
}

/// Request body for creating an expense against an approved purchase order
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateExpenseRequest {
    /// Approved purchase order this expense invoices against
    pub purchase_order_id: i32,
    /// Budget category the expense will consume on approval
    pub budget_category_id: i32,
    /// Invoice number
    pub invoice_number: String,
    /// Invoice date (YYYY-MM-DD)
    pub invoice_date: NaiveDate,
    /// Line items
    pub items: Vec<ExpenseItemInput>,
}

/// Request body for updating a draft expense
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateExpenseRequest {
    /// Invoice number
    pub invoice_number: Option<String>,
    /// Invoice date (YYYY-MM-DD)
    pub invoice_date: Option<NaiveDate>,
    /// Replacement line items; omitted leaves items untouched
    pub items: Option<Vec<ExpenseItemInput>>,
}

/// Expense line item response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseItemResponse {
    pub id: i32,
    pub name: String,
    pub amount: Decimal,
}

impl From<expense_item::Model> for ExpenseItemResponse {
    fn from(model: expense_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            amount: model.amount,
        }
    }
}

/// Expense response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: i32,
    pub purchase_order_id: i32,
    pub budget_category_id: i32,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub status: ExpenseStatus,
    pub total_amount: Decimal,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<ExpenseItemResponse>,
}

impl ExpenseResponse {
    fn from_parts(model: expense::Model, items: Vec<expense_item::Model>) -> Self {
        Self {
            id: model.id,
            purchase_order_id: model.purchase_order_id,
            budget_category_id: model.budget_category_id,
            invoice_number: model.invoice_number,
            invoice_date: model.invoice_date,
            status: model.status,
            total_amount: model.total_amount,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items.into_iter().map(ExpenseItemResponse::from).collect(),
        }
    }
}

async fn find_expense(state: &AppState, expense_id: i32) -> Result<expense::Model, StatusCode> {
    match expense::Entity::find_by_id(expense_id).one(&state.db).await {
        Ok(Some(exp)) => Ok(exp),
        Ok(None) => {
            warn!("Expense {} not found", expense_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to lookup expense {}: {}", expense_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_items(
    state: &AppState,
    expense_id: i32,
) -> Result<Vec<expense_item::Model>, StatusCode> {
    expense_item::Entity::find()
        .filter(expense_item::Column::ExpenseId.eq(expense_id))
        .order_by_asc(expense_item::Column::SortOrder)
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to load items for expense {}: {}", expense_id, db_error);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn run_transition(
    state: &AppState,
    expense_id: i32,
    action: ExpenseAction,
    body: TransitionBody,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    let actor = load_actor(&state.db, body.actor_user_id).await?;
    let expected_version = match body.expected_version {
        Some(version) => version,
        None => find_expense(state, expense_id).await?.version,
    };

    let request = TransitionRequest {
        note: body.note,
        expected_version,
        approved_amount: None,
    };
    match state
        .coordinator
        .transition_expense(expense_id, action, &actor, request)
        .await
    {
        Ok(exp) => {
            info!("Expense {} transitioned to {:?}", expense_id, exp.status);
            let items = load_items(state, expense_id).await?;
            let response = ApiResponse {
                data: ExpenseResponse::from_parts(exp, items),
                message: format!("Expense {} successful", action.name()),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("transition_expense", err)),
    }
}

/// Create a new expense with its line items
///
/// Only legal against an approved purchase order; the invoice total is the
/// sum of the line items.
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    tag = "expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created successfully", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Invalid request or order not approved", body = ErrorResponse),
        (status = 404, description = "Purchase order or budget category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseResponse>>), StatusCode> {
    trace!("Entering create_expense function");
    debug!(
        "Creating expense '{}' against purchase order {} with {} items",
        request.invoice_number,
        request.purchase_order_id,
        request.items.len()
    );

    if request.items.iter().any(|item| item.amount < Decimal::ZERO) {
        warn!("Rejecting expense '{}' with negative line item", request.invoice_number);
        return Err(StatusCode::BAD_REQUEST);
    }

    match purchase_order::Entity::find_by_id(request.purchase_order_id)
        .one(&state.db)
        .await
    {
        Ok(Some(po)) if po.status == PurchaseOrderStatus::Approved => {}
        Ok(Some(po)) => {
            warn!(
                "Purchase order {} is {:?}, refusing expense",
                request.purchase_order_id, po.status
            );
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(None) => {
            warn!("Purchase order {} not found", request.purchase_order_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup purchase order {}: {}",
                request.purchase_order_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match budget_category::Entity::find_by_id(request.budget_category_id)
        .one(&state.db)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Budget category {} not found", request.budget_category_id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!(
                "Failed to lookup budget category {}: {}",
                request.budget_category_id, db_error
            );
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let total: Decimal = request.items.iter().map(|item| item.amount).sum();
    let now = Utc::now().naive_utc();

    let result = state
        .db
        .transaction::<_, expense::Model, sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let exp = expense::ActiveModel {
                    purchase_order_id: Set(request.purchase_order_id),
                    budget_category_id: Set(request.budget_category_id),
                    invoice_number: Set(request.invoice_number),
                    invoice_date: Set(request.invoice_date),
                    status: Set(ExpenseStatus::Draft),
                    total_amount: Set(total),
                    version: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                for (index, item) in request.items.into_iter().enumerate() {
                    expense_item::ActiveModel {
                        expense_id: Set(exp.id),
                        name: Set(item.name),
                        amount: Set(item.amount),
                        sort_order: Set(index as i32),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(exp)
            })
        })
        .await;

    match result {
        Ok(exp) => {
            info!("Expense created successfully with ID: {}", exp.id);
            let items = load_items(&state, exp.id).await?;
            let response = ApiResponse {
                data: ExpenseResponse::from_parts(exp, items),
                message: "Expense created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create expense: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all expenses
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    tag = "expenses",
    responses(
        (status = 200, description = "Expenses retrieved successfully", body = ApiResponse<Vec<ExpenseResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_expenses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ExpenseResponse>>>, StatusCode> {
    trace!("Entering get_expenses function");

    let expenses = match expense::Entity::find().all(&state.db).await {
        Ok(expenses) => expenses,
        Err(db_error) => {
            error!("Failed to retrieve expenses: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut responses = Vec::with_capacity(expenses.len());
    for exp in expenses {
        let items = load_items(&state, exp.id).await?;
        responses.push(ExpenseResponse::from_parts(exp, items));
    }

    debug!("Retrieved {} expenses", responses.len());
    let response = ApiResponse {
        data: responses,
        message: "Expenses retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific expense by ID
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{expense_id}",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "Expense retrieved successfully", body = ApiResponse<ExpenseResponse>),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    trace!("Entering get_expense for expense_id: {}", expense_id);

    let exp = find_expense(&state, expense_id).await?;
    let items = load_items(&state, expense_id).await?;
    let response = ApiResponse {
        data: ExpenseResponse::from_parts(exp, items),
        message: "Expense retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a draft expense
///
/// Replacing line items recomputes the invoice total.
#[utoipa::path(
    put,
    path = "/api/v1/expenses/{expense_id}",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated successfully", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Expense is not in Draft", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    trace!("Entering update_expense for expense_id: {}", expense_id);

    let existing = find_expense(&state, expense_id).await?;
    if existing.status != ExpenseStatus::Draft {
        warn!("Expense {} is {:?}, refusing update", expense_id, existing.status);
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(items) = &request.items {
        if items.iter().any(|item| item.amount < Decimal::ZERO) {
            warn!("Rejecting negative line item for expense {}", expense_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let result = state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let mut expense_active: expense::ActiveModel = existing.into();
                if let Some(invoice_number) = request.invoice_number {
                    expense_active.invoice_number = Set(invoice_number);
                }
                if let Some(invoice_date) = request.invoice_date {
                    expense_active.invoice_date = Set(invoice_date);
                }
                if let Some(items) = request.items {
                    expense_item::Entity::delete_many()
                        .filter(expense_item::Column::ExpenseId.eq(expense_id))
                        .exec(txn)
                        .await?;
                    expense_active.total_amount =
                        Set(items.iter().map(|item| item.amount).sum());
                    for (index, item) in items.into_iter().enumerate() {
                        expense_item::ActiveModel {
                            expense_id: Set(expense_id),
                            name: Set(item.name),
                            amount: Set(item.amount),
                            sort_order: Set(index as i32),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                    }
                }
                expense_active.updated_at = Set(Utc::now().naive_utc());
                expense_active.update(txn).await?;
                Ok(())
            })
        })
        .await;

    if let Err(db_error) = result {
        error!("Failed to update expense {}: {}", expense_id, db_error);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!("Expense {} updated successfully", expense_id);
    let exp = find_expense(&state, expense_id).await?;
    let items = load_items(&state, expense_id).await?;
    let response = ApiResponse {
        data: ExpenseResponse::from_parts(exp, items),
        message: "Expense updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a draft expense
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{expense_id}",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "Expense deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Expense is not in Draft", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_expense for expense_id: {}", expense_id);

    let existing = find_expense(&state, expense_id).await?;
    if existing.status != ExpenseStatus::Draft {
        warn!("Expense {} is {:?}, refusing delete", expense_id, existing.status);
        return Err(StatusCode::BAD_REQUEST);
    }

    match expense::Entity::delete_by_id(expense_id).exec(&state.db).await {
        Ok(_) => {
            info!("Expense {} deleted successfully", expense_id);
            let response = ApiResponse {
                data: format!("Expense {} deleted", expense_id),
                message: "Expense deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to delete expense {}: {}", expense_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Submit an expense for approval
#[utoipa::path(
    post,
    path = "/api/v1/expenses/{expense_id}/submit",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Expense submitted successfully", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Illegal transition or empty expense", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn submit_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    run_transition(&state, expense_id, ExpenseAction::Submit, body).await
}

/// Approve a submitted expense
///
/// Consumes the budget category's used amount by the invoice total in the
/// same transaction as the status change.
#[utoipa::path(
    post,
    path = "/api/v1/expenses/{expense_id}/approve",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Expense approved successfully", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not approve", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn approve_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    run_transition(&state, expense_id, ExpenseAction::Approve, body).await
}

/// Reject a submitted expense
#[utoipa::path(
    post,
    path = "/api/v1/expenses/{expense_id}/reject",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Expense rejected successfully", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not reject", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn reject_expense(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    run_transition(&state, expense_id, ExpenseAction::Reject, body).await
}

/// Mark an approved expense as paid
#[utoipa::path(
    post,
    path = "/api/v1/expenses/{expense_id}/mark-paid",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Expense marked as paid", body = ApiResponse<ExpenseResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Expense not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn mark_expense_paid(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ExpenseResponse>>, StatusCode> {
    run_transition(&state, expense_id, ExpenseAction::MarkPaid, body).await
}

/// Get the audit history of an expense
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{expense_id}/history",
    tag = "expenses",
    params(
        ("expense_id" = i32, Path, description = "Expense ID"),
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_expense_history(
    Path(expense_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    crate::handlers::list_history(&state.db, EntityRef::Expense(expense_id)).await
}
