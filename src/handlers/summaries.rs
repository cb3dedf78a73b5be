use crate::handlers::status_for;
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::{OmSummary, OpCoSummary, PoolSummary};
use ledger::summary;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace};
use utoipa::ToSchema;

/// Query parameters for the O&M summary
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OmSummaryQuery {
    /// Fiscal year to roll up
    pub fiscal_year: i32,
}

/// Get the consumption summary of a budget pool
#[utoipa::path(
    get,
    path = "/api/v1/summaries/pools/{pool_id}",
    tag = "summaries",
    params(
        ("pool_id" = i32, Path, description = "Budget pool ID"),
    ),
    responses(
        (status = 200, description = "Pool summary retrieved successfully", body = ApiResponse<PoolSummary>),
        (status = 404, description = "Budget pool not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_pool_summary(
    Path(pool_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PoolSummary>>, StatusCode> {
    trace!("Entering get_pool_summary for pool_id: {}", pool_id);

    match summary::pool_summary(&state.db, pool_id).await {
        Ok(pool_summary) => {
            info!("Pool summary for {} retrieved successfully", pool_id);
            let response = ApiResponse {
                data: pool_summary,
                message: "Pool summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("get_pool_summary", err)),
    }
}

/// Get charge-out totals grouped by operating company
#[utoipa::path(
    get,
    path = "/api/v1/summaries/opco",
    tag = "summaries",
    responses(
        (status = 200, description = "Operating company summary retrieved successfully", body = ApiResponse<OpCoSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_opco_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OpCoSummary>>, StatusCode> {
    trace!("Entering get_opco_summary function");

    match summary::opco_summary(&state.db).await {
        Ok(opco_summary) => {
            info!("Operating company summary retrieved successfully");
            let response = ApiResponse {
                data: opco_summary,
                message: "Operating company summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("get_opco_summary", err)),
    }
}

/// Get budget versus actual for all O&M expenses in a fiscal year
#[utoipa::path(
    get,
    path = "/api/v1/summaries/om",
    tag = "summaries",
    params(
        ("fiscal_year" = i32, Query, description = "Fiscal year to roll up"),
    ),
    responses(
        (status = 200, description = "O&M summary retrieved successfully", body = ApiResponse<OmSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_om_summary(
    Query(query): Query<OmSummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<OmSummary>>, StatusCode> {
    trace!("Entering get_om_summary for fiscal year {}", query.fiscal_year);

    match summary::om_summary(&state.db, query.fiscal_year).await {
        Ok(om_summary) => {
            info!("O&M summary for {} retrieved successfully", query.fiscal_year);
            let response = ApiResponse {
                data: om_summary,
                message: "O&M summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("get_om_summary", err)),
    }
}
