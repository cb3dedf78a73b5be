use crate::handlers::{load_actor, status_for, HistoryEntryResponse, TransitionBody};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDateTime, Utc};
use ledger::machine::ProposalAction;
use ledger::{EntityRef, TransitionRequest};
use model::entities::budget_proposal::{self, ProposalStatus};
use model::entities::proposal_comment;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a budget proposal
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateProposalRequest {
    /// Project the proposal requests budget for
    pub project_id: i32,
    /// Proposal title
    pub title: String,
    /// Requested amount
    pub amount: Decimal,
}

/// Request body for updating a draft proposal
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateProposalRequest {
    /// Proposal title
    pub title: Option<String>,
    /// Requested amount
    pub amount: Option<Decimal>,
}

/// Request body for approving a proposal
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ApproveProposalRequest {
    /// User performing the approval
    pub actor_user_id: i32,
    /// Optional note, stored as a comment and in the audit trail
    pub note: Option<String>,
    /// Version the client last read; omitted means "latest"
    pub expected_version: Option<i32>,
    /// Granted amount; defaults to the requested amount
    pub approved_amount: Option<Decimal>,
}

/// Budget proposal response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProposalResponse {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub amount: Decimal,
    pub approved_amount: Option<Decimal>,
    pub status: ProposalStatus,
    pub approved_by: Option<i32>,
    pub approved_at: Option<NaiveDateTime>,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<budget_proposal::Model> for ProposalResponse {
    fn from(model: budget_proposal::Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            title: model.title,
            amount: model.amount,
            approved_amount: model.approved_amount,
            status: model.status,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Proposal comment response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub user_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl From<proposal_comment::Model> for CommentResponse {
    fn from(model: proposal_comment::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

async fn find_proposal(
    state: &AppState,
    proposal_id: i32,
) -> Result<budget_proposal::Model, StatusCode> {
    match budget_proposal::Entity::find_by_id(proposal_id)
        .one(&state.db)
        .await
    {
        Ok(Some(proposal)) => Ok(proposal),
        Ok(None) => {
            warn!("Budget proposal {} not found", proposal_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to lookup proposal {}: {}", proposal_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn run_transition(
    state: &AppState,
    proposal_id: i32,
    action: ProposalAction,
    actor_user_id: i32,
    note: Option<String>,
    expected_version: Option<i32>,
    approved_amount: Option<Decimal>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    let actor = load_actor(&state.db, actor_user_id).await?;
    let expected_version = match expected_version {
        Some(version) => version,
        None => find_proposal(state, proposal_id).await?.version,
    };

    let request = TransitionRequest {
        note,
        expected_version,
        approved_amount,
    };
    match state
        .coordinator
        .transition_proposal(proposal_id, action, &actor, request)
        .await
    {
        Ok(proposal) => {
            info!(
                "Proposal {} transitioned to {:?} by user {}",
                proposal_id, proposal.status, actor_user_id
            );
            let response = ApiResponse {
                data: ProposalResponse::from(proposal),
                message: format!("Proposal {} successful", action.name()),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("transition_proposal", err)),
    }
}

/// Create a new budget proposal in Draft
#[utoipa::path(
    post,
    path = "/api/v1/proposals",
    tag = "proposals",
    request_body = CreateProposalRequest,
    responses(
        (status = 201, description = "Proposal created successfully", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_proposal(
    State(state): State<AppState>,
    Json(request): Json<CreateProposalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProposalResponse>>), StatusCode> {
    trace!("Entering create_proposal function");
    debug!(
        "Creating proposal '{}' for project {} requesting {}",
        request.title, request.project_id, request.amount
    );

    if request.amount <= Decimal::ZERO {
        warn!("Rejecting proposal '{}' with non-positive amount", request.title);
        return Err(StatusCode::BAD_REQUEST);
    }

    let now = Utc::now().naive_utc();
    let new_proposal = budget_proposal::ActiveModel {
        project_id: Set(request.project_id),
        title: Set(request.title.clone()),
        amount: Set(request.amount),
        status: Set(ProposalStatus::Draft),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_proposal.insert(&state.db).await {
        Ok(proposal) => {
            info!("Proposal created successfully with ID: {}", proposal.id);
            let response = ApiResponse {
                data: ProposalResponse::from(proposal),
                message: "Proposal created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create proposal '{}': {}", request.title, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all budget proposals
#[utoipa::path(
    get,
    path = "/api/v1/proposals",
    tag = "proposals",
    responses(
        (status = 200, description = "Proposals retrieved successfully", body = ApiResponse<Vec<ProposalResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_proposals(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProposalResponse>>>, StatusCode> {
    trace!("Entering get_proposals function");

    match budget_proposal::Entity::find().all(&state.db).await {
        Ok(proposals) => {
            debug!("Retrieved {} proposals", proposals.len());
            let response = ApiResponse {
                data: proposals.into_iter().map(ProposalResponse::from).collect(),
                message: "Proposals retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve proposals: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a specific budget proposal by ID
#[utoipa::path(
    get,
    path = "/api/v1/proposals/{proposal_id}",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    responses(
        (status = 200, description = "Proposal retrieved successfully", body = ApiResponse<ProposalResponse>),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    trace!("Entering get_proposal function for proposal_id: {}", proposal_id);

    let proposal = find_proposal(&state, proposal_id).await?;
    let response = ApiResponse {
        data: ProposalResponse::from(proposal),
        message: "Proposal retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a budget proposal
///
/// Mutation is only legal while the proposal is editable (Draft or
/// MoreInfoRequired); a pending or decided proposal is immutable.
#[utoipa::path(
    put,
    path = "/api/v1/proposals/{proposal_id}",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    request_body = UpdateProposalRequest,
    responses(
        (status = 200, description = "Proposal updated successfully", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Proposal is not editable", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateProposalRequest>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    trace!("Entering update_proposal function for proposal_id: {}", proposal_id);

    let existing = find_proposal(&state, proposal_id).await?;
    if !matches!(
        existing.status,
        ProposalStatus::Draft | ProposalStatus::MoreInfoRequired
    ) {
        warn!(
            "Proposal {} is {:?}, refusing update",
            proposal_id, existing.status
        );
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(amount) = request.amount {
        if amount <= Decimal::ZERO {
            warn!("Rejecting non-positive amount for proposal {}", proposal_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let mut proposal_active: budget_proposal::ActiveModel = existing.into();
    if let Some(title) = request.title {
        proposal_active.title = Set(title);
    }
    if let Some(amount) = request.amount {
        proposal_active.amount = Set(amount);
    }
    proposal_active.updated_at = Set(Utc::now().naive_utc());

    match proposal_active.update(&state.db).await {
        Ok(updated) => {
            info!("Proposal {} updated successfully", proposal_id);
            let response = ApiResponse {
                data: ProposalResponse::from(updated),
                message: "Proposal updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update proposal {}: {}", proposal_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Delete a budget proposal
///
/// Only Draft proposals may be deleted; anything further along has audit
/// history worth keeping.
#[utoipa::path(
    delete,
    path = "/api/v1/proposals/{proposal_id}",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    responses(
        (status = 200, description = "Proposal deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Proposal is not in Draft", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_proposal function for proposal_id: {}", proposal_id);

    let existing = find_proposal(&state, proposal_id).await?;
    if existing.status != ProposalStatus::Draft {
        warn!(
            "Proposal {} is {:?}, refusing delete",
            proposal_id, existing.status
        );
        return Err(StatusCode::BAD_REQUEST);
    }

    match budget_proposal::Entity::delete_by_id(proposal_id)
        .exec(&state.db)
        .await
    {
        Ok(_) => {
            info!("Proposal {} deleted successfully", proposal_id);
            let response = ApiResponse {
                data: format!("Proposal {} deleted", proposal_id),
                message: "Proposal deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to delete proposal {}: {}", proposal_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Submit a proposal for approval
#[utoipa::path(
    post,
    path = "/api/v1/proposals/{proposal_id}/submit",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Proposal submitted successfully", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn submit_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    run_transition(
        &state,
        proposal_id,
        ProposalAction::Submit,
        body.actor_user_id,
        body.note,
        body.expected_version,
        None,
    )
    .await
}

/// Approve a pending proposal
///
/// Credits the project's approved budget by the granted amount in the same
/// transaction as the status change.
#[utoipa::path(
    post,
    path = "/api/v1/proposals/{proposal_id}/approve",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    request_body = ApproveProposalRequest,
    responses(
        (status = 200, description = "Proposal approved successfully", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not approve", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn approve_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<ApproveProposalRequest>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    run_transition(
        &state,
        proposal_id,
        ProposalAction::Approve,
        body.actor_user_id,
        body.note,
        body.expected_version,
        body.approved_amount,
    )
    .await
}

/// Reject a pending proposal
///
/// A rejection reason (`note`) is required.
#[utoipa::path(
    post,
    path = "/api/v1/proposals/{proposal_id}/reject",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Proposal rejected successfully", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Illegal transition or missing reason", body = ErrorResponse),
        (status = 403, description = "Actor may not reject", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn reject_proposal(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    run_transition(
        &state,
        proposal_id,
        ProposalAction::Reject,
        body.actor_user_id,
        body.note,
        body.expected_version,
        None,
    )
    .await
}

/// Send a pending proposal back for more information
#[utoipa::path(
    post,
    path = "/api/v1/proposals/{proposal_id}/request-more-info",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "More information requested", body = ApiResponse<ProposalResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not decide", body = ErrorResponse),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn request_more_info(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<ProposalResponse>>, StatusCode> {
    run_transition(
        &state,
        proposal_id,
        ProposalAction::RequestMoreInfo,
        body.actor_user_id,
        body.note,
        body.expected_version,
        None,
    )
    .await
}

/// Get all comments on a proposal
#[utoipa::path(
    get,
    path = "/api/v1/proposals/{proposal_id}/comments",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    responses(
        (status = 200, description = "Comments retrieved successfully", body = ApiResponse<Vec<CommentResponse>>),
        (status = 404, description = "Proposal not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_proposal_comments(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CommentResponse>>>, StatusCode> {
    trace!("Entering get_proposal_comments for proposal_id: {}", proposal_id);

    find_proposal(&state, proposal_id).await?;
    match proposal_comment::Entity::find()
        .filter(proposal_comment::Column::ProposalId.eq(proposal_id))
        .order_by_asc(proposal_comment::Column::CreatedAt)
        .order_by_asc(proposal_comment::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(comments) => {
            debug!("Retrieved {} comments for proposal {}", comments.len(), proposal_id);
            let response = ApiResponse {
                data: comments.into_iter().map(CommentResponse::from).collect(),
                message: "Comments retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve comments for proposal {}: {}",
                proposal_id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get the audit history of a proposal
#[utoipa::path(
    get,
    path = "/api/v1/proposals/{proposal_id}/history",
    tag = "proposals",
    params(
        ("proposal_id" = i32, Path, description = "Proposal ID"),
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_proposal_history(
    Path(proposal_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    crate::handlers::list_history(&state.db, EntityRef::BudgetProposal(proposal_id)).await
}
