use crate::handlers::{load_actor, status_for, HistoryEntryResponse, TransitionBody};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDateTime, Utc};
use ledger::machine::ChargeOutAction;
use ledger::{EntityRef, TransitionRequest};
use model::entities::charge_out::{self, ChargeOutStatus};
use model::entities::charge_out_item;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// One charge-out line, re-billing an expense to an operating company
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ChargeOutItemInput {
    /// Expense being charged out
    pub expense_id: i32,
    /// Amount charged for this expense
    pub amount: Decimal,
}

/// Request body for creating a charge-out
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateChargeOutRequest {
    /// Project the charged expenses belong to
    pub project_id: i32,
    /// Operating company being billed
    pub op_co_id: i32,
    /// Line items
    pub items: Vec<ChargeOutItemInput>,
}

/// Request body for updating a draft charge-out
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateChargeOutRequest {
    /// Operating company being billed
    pub op_co_id: Option<i32>,
    /// Replacement line items; omitted leaves items untouched
    pub items: Option<Vec<ChargeOutItemInput>>,
}

/// Charge-out line item response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargeOutItemResponse {
    pub id: i32,
    pub expense_id: i32,
    pub amount: Decimal,
}

impl From<charge_out_item::Model> for ChargeOutItemResponse {
    fn from(model: charge_out_item::Model) -> Self {
        Self {
            id: model.id,
            expense_id: model.expense_id,
            amount: model.amount,
        }
    }
}

/// Charge-out response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChargeOutResponse {
    pub id: i32,
    pub project_id: i32,
    pub op_co_id: i32,
    pub status: ChargeOutStatus,
    pub total_amount: Decimal,
    pub confirmed_by: Option<i32>,
    pub confirmed_at: Option<NaiveDateTime>,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<ChargeOutItemResponse>,
}

impl ChargeOutResponse {
    fn from_parts(model: charge_out::Model, items: Vec<charge_out_item::Model>) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            op_co_id: model.op_co_id,
            status: model.status,
            total_amount: model.total_amount,
            confirmed_by: model.confirmed_by,
            confirmed_at: model.confirmed_at,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items.into_iter().map(ChargeOutItemResponse::from).collect(),
        }
    }
}

async fn find_charge_out(
    state: &AppState,
    charge_out_id: i32,
) -> Result<charge_out::Model, StatusCode> {
    match charge_out::Entity::find_by_id(charge_out_id).one(&state.db).await {
        Ok(Some(co)) => Ok(co),
        Ok(None) => {
            warn!("Charge-out {} not found", charge_out_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to lookup charge-out {}: {}", charge_out_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_items(
    state: &AppState,
    charge_out_id: i32,
) -> Result<Vec<charge_out_item::Model>, StatusCode> {
    charge_out_item::Entity::find()
        .filter(charge_out_item::Column::ChargeOutId.eq(charge_out_id))
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!(
                "Failed to load items for charge-out {}: {}",
                charge_out_id, db_error
            );
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn run_transition(
    state: &AppState,
    charge_out_id: i32,
    action: ChargeOutAction,
    body: TransitionBody,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    let actor = load_actor(&state.db, body.actor_user_id).await?;
    let expected_version = match body.expected_version {
        Some(version) => version,
        None => find_charge_out(state, charge_out_id).await?.version,
    };

    let request = TransitionRequest {
        note: body.note,
        expected_version,
        approved_amount: None,
    };
    match state
        .coordinator
        .transition_charge_out(charge_out_id, action, &actor, request)
        .await
    {
        Ok(co) => {
            info!("Charge-out {} transitioned to {:?}", charge_out_id, co.status);
            let items = load_items(state, charge_out_id).await?;
            let response = ApiResponse {
                data: ChargeOutResponse::from_parts(co, items),
                message: format!("Charge-out {} successful", action.name()),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("transition_charge_out", err)),
    }
}

/// Create a new charge-out with its line items
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs",
    tag = "charge-outs",
    request_body = CreateChargeOutRequest,
    responses(
        (status = 201, description = "Charge-out created successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_charge_out(
    State(state): State<AppState>,
    Json(request): Json<CreateChargeOutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ChargeOutResponse>>), StatusCode> {
    trace!("Entering create_charge_out function");
    debug!(
        "Creating charge-out for project {} billing company {} with {} items",
        request.project_id,
        request.op_co_id,
        request.items.len()
    );

    if request.items.is_empty() {
        warn!("Rejecting charge-out with no line items");
        return Err(StatusCode::BAD_REQUEST);
    }
    if request.items.iter().any(|item| item.amount <= Decimal::ZERO) {
        warn!("Rejecting charge-out with non-positive line item");
        return Err(StatusCode::BAD_REQUEST);
    }

    let total: Decimal = request.items.iter().map(|item| item.amount).sum();
    let now = Utc::now().naive_utc();

    let result = state
        .db
        .transaction::<_, charge_out::Model, sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let co = charge_out::ActiveModel {
                    project_id: Set(request.project_id),
                    op_co_id: Set(request.op_co_id),
                    status: Set(ChargeOutStatus::Draft),
                    total_amount: Set(total),
                    version: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                for item in request.items {
                    charge_out_item::ActiveModel {
                        charge_out_id: Set(co.id),
                        expense_id: Set(item.expense_id),
                        amount: Set(item.amount),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(co)
            })
        })
        .await;

    match result {
        Ok(co) => {
            info!("Charge-out created successfully with ID: {}", co.id);
            let items = load_items(&state, co.id).await?;
            let response = ApiResponse {
                data: ChargeOutResponse::from_parts(co, items),
                message: "Charge-out created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create charge-out: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all charge-outs
#[utoipa::path(
    get,
    path = "/api/v1/charge-outs",
    tag = "charge-outs",
    responses(
        (status = 200, description = "Charge-outs retrieved successfully", body = ApiResponse<Vec<ChargeOutResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_charge_outs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ChargeOutResponse>>>, StatusCode> {
    trace!("Entering get_charge_outs function");

    let charge_outs = match charge_out::Entity::find().all(&state.db).await {
        Ok(charge_outs) => charge_outs,
        Err(db_error) => {
            error!("Failed to retrieve charge-outs: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut responses = Vec::with_capacity(charge_outs.len());
    for co in charge_outs {
        let items = load_items(&state, co.id).await?;
        responses.push(ChargeOutResponse::from_parts(co, items));
    }

    debug!("Retrieved {} charge-outs", responses.len());
    let response = ApiResponse {
        data: responses,
        message: "Charge-outs retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific charge-out by ID
#[utoipa::path(
    get,
    path = "/api/v1/charge-outs/{charge_out_id}",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    responses(
        (status = 200, description = "Charge-out retrieved successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    trace!("Entering get_charge_out for charge_out_id: {}", charge_out_id);

    let co = find_charge_out(&state, charge_out_id).await?;
    let items = load_items(&state, charge_out_id).await?;
    let response = ApiResponse {
        data: ChargeOutResponse::from_parts(co, items),
        message: "Charge-out retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a draft charge-out
#[utoipa::path(
    put,
    path = "/api/v1/charge-outs/{charge_out_id}",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = UpdateChargeOutRequest,
    responses(
        (status = 200, description = "Charge-out updated successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Charge-out is not in Draft", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateChargeOutRequest>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    trace!("Entering update_charge_out for charge_out_id: {}", charge_out_id);

    let existing = find_charge_out(&state, charge_out_id).await?;
    if existing.status != ChargeOutStatus::Draft {
        warn!(
            "Charge-out {} is {:?}, refusing update",
            charge_out_id, existing.status
        );
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(items) = &request.items {
        if items.is_empty() || items.iter().any(|item| item.amount <= Decimal::ZERO) {
            warn!("Rejecting invalid line items for charge-out {}", charge_out_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let result = state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let mut co_active: charge_out::ActiveModel = existing.into();
                if let Some(op_co_id) = request.op_co_id {
                    co_active.op_co_id = Set(op_co_id);
                }
                if let Some(items) = request.items {
                    charge_out_item::Entity::delete_many()
                        .filter(charge_out_item::Column::ChargeOutId.eq(charge_out_id))
                        .exec(txn)
                        .await?;
                    co_active.total_amount = Set(items.iter().map(|item| item.amount).sum());
                    for item in items {
                        charge_out_item::ActiveModel {
                            charge_out_id: Set(charge_out_id),
                            expense_id: Set(item.expense_id),
                            amount: Set(item.amount),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                    }
                }
                co_active.updated_at = Set(Utc::now().naive_utc());
                co_active.update(txn).await?;
                Ok(())
            })
        })
        .await;

    if let Err(db_error) = result {
        error!("Failed to update charge-out {}: {}", charge_out_id, db_error);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!("Charge-out {} updated successfully", charge_out_id);
    let co = find_charge_out(&state, charge_out_id).await?;
    let items = load_items(&state, charge_out_id).await?;
    let response = ApiResponse {
        data: ChargeOutResponse::from_parts(co, items),
        message: "Charge-out updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a charge-out
///
/// Legal in Draft and, uniquely among the workflow entities, in Rejected; a
/// rejected charge-out carries no billing effect worth preserving.
#[utoipa::path(
    delete,
    path = "/api/v1/charge-outs/{charge_out_id}",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    responses(
        (status = 200, description = "Charge-out deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Charge-out is not deletable", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_charge_out for charge_out_id: {}", charge_out_id);

    let existing = find_charge_out(&state, charge_out_id).await?;
    if !matches!(
        existing.status,
        ChargeOutStatus::Draft | ChargeOutStatus::Rejected
    ) {
        warn!(
            "Charge-out {} is {:?}, refusing delete",
            charge_out_id, existing.status
        );
        return Err(StatusCode::BAD_REQUEST);
    }

    match charge_out::Entity::delete_by_id(charge_out_id)
        .exec(&state.db)
        .await
    {
        Ok(_) => {
            info!("Charge-out {} deleted successfully", charge_out_id);
            let response = ApiResponse {
                data: format!("Charge-out {} deleted", charge_out_id),
                message: "Charge-out deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to delete charge-out {}: {}", charge_out_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Submit a charge-out to the operating company
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs/{charge_out_id}/submit",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Charge-out submitted successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn submit_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    run_transition(&state, charge_out_id, ChargeOutAction::Submit, body).await
}

/// Confirm a submitted charge-out
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs/{charge_out_id}/confirm",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Charge-out confirmed successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not confirm", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn confirm_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    run_transition(&state, charge_out_id, ChargeOutAction::Confirm, body).await
}

/// Reject a submitted charge-out
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs/{charge_out_id}/reject",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Charge-out rejected successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not reject", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn reject_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    run_transition(&state, charge_out_id, ChargeOutAction::Reject, body).await
}

/// Mark a confirmed charge-out as paid
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs/{charge_out_id}/mark-paid",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Charge-out marked as paid", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn mark_charge_out_paid(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    run_transition(&state, charge_out_id, ChargeOutAction::MarkPaid, body).await
}

/// Revert a charge-out back to Draft
///
/// Charge-outs carry no ledger effect, so the revert is a pure status change
/// that also clears the confirmation stamp.
#[utoipa::path(
    post,
    path = "/api/v1/charge-outs/{charge_out_id}/revert",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Charge-out reverted successfully", body = ApiResponse<ChargeOutResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Charge-out not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn revert_charge_out(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ChargeOutResponse>>, StatusCode> {
    run_transition(&state, charge_out_id, ChargeOutAction::Revert, body).await
}

/// Get the audit history of a charge-out
#[utoipa::path(
    get,
    path = "/api/v1/charge-outs/{charge_out_id}/history",
    tag = "charge-outs",
    params(
        ("charge_out_id" = i32, Path, description = "Charge-out ID"),
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_charge_out_history(
    Path(charge_out_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    crate::handlers::list_history(&state.db, EntityRef::ChargeOut(charge_out_id)).await
}
