use crate::handlers::{load_actor, status_for, HistoryEntryResponse, TransitionBody};
use crate::schemas::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDateTime, Utc};
use ledger::machine::PurchaseOrderAction;
use ledger::{EntityRef, TransitionRequest};
use model::entities::purchase_order::{self, PurchaseOrderStatus};
use model::entities::purchase_order_item;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// One purchase order line item
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PurchaseOrderItemInput {
    /// Item description
    pub name: String,
    /// Quantity ordered
    pub quantity: i32,
    /// Price per unit
    pub unit_price: Decimal,
}

/// Request body for creating a purchase order
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    /// Project the order belongs to
    pub project_id: i32,
    /// Vendor fulfilling the order
    pub vendor_id: i32,
    /// Unique order number
    pub po_number: String,
    /// Line items
    pub items: Vec<PurchaseOrderItemInput>,
}

/// Request body for updating a draft purchase order
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    /// Vendor fulfilling the order
    pub vendor_id: Option<i32>,
    /// Replacement line items; omitted leaves items untouched
    pub items: Option<Vec<PurchaseOrderItemInput>>,
}

/// Purchase order line item response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderItemResponse {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl From<purchase_order_item::Model> for PurchaseOrderItemResponse {
    fn from(model: purchase_order_item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}

/// Purchase order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurchaseOrderResponse {
    pub id: i32,
    pub project_id: i32,
    pub vendor_id: i32,
    pub po_number: String,
    pub status: PurchaseOrderStatus,
    pub total_amount: Decimal,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub items: Vec<PurchaseOrderItemResponse>,
}

impl PurchaseOrderResponse {
    fn from_parts(model: purchase_order::Model, items: Vec<purchase_order_item::Model>) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            vendor_id: model.vendor_id,
            po_number: model.po_number,
            status: model.status,
            total_amount: model.total_amount,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            items: items.into_iter().map(PurchaseOrderItemResponse::from).collect(),
        }
    }
}

fn items_total(items: &[PurchaseOrderItemInput]) -> Decimal {
    items
        .iter()
        .map(|item| item.unit_price * Decimal::from(item.quantity))
        .sum()
}

async fn find_po(state: &AppState, po_id: i32) -> Result<purchase_order::Model, StatusCode> {
    match purchase_order::Entity::find_by_id(po_id).one(&state.db).await {
        Ok(Some(po)) => Ok(po),
        Ok(None) => {
            warn!("Purchase order {} not found", po_id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to lookup purchase order {}: {}", po_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn load_items(
    state: &AppState,
    po_id: i32,
) -> Result<Vec<purchase_order_item::Model>, StatusCode> {
    purchase_order_item::Entity::find()
        .filter(purchase_order_item::Column::PurchaseOrderId.eq(po_id))
        .order_by_asc(purchase_order_item::Column::SortOrder)
        .all(&state.db)
        .await
        .map_err(|db_error| {
            error!("Failed to load items for purchase order {}: {}", po_id, db_error);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn run_transition(
    state: &AppState,
    po_id: i32,
    action: PurchaseOrderAction,
    body: TransitionBody,
) -> Result<Json<ApiResponse<PurchaseOrderResponse>>, StatusCode> {
    let actor = load_actor(&state.db, body.actor_user_id).await?;
    let expected_version = match body.expected_version {
        Some(version) => version,
        None => find_po(state, po_id).await?.version,
    };

    let request = TransitionRequest {
        note: body.note,
        expected_version,
        approved_amount: None,
    };
    match state
        .coordinator
        .transition_purchase_order(po_id, action, &actor, request)
        .await
    {
        Ok(po) => {
            info!("Purchase order {} transitioned to {:?}", po_id, po.status);
            let items = load_items(state, po_id).await?;
            let response = ApiResponse {
                data: PurchaseOrderResponse::from_parts(po, items),
                message: format!("Purchase order {} successful", action.name()),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(status_for("transition_purchase_order", err)),
    }
}

/// Create a new purchase order with its line items
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders",
    tag = "purchase-orders",
    request_body = CreatePurchaseOrderRequest,
    responses(
        (status = 201, description = "Purchase order created successfully", body = ApiResponse<PurchaseOrderResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PurchaseOrderResponse>>), StatusCode> {
    trace!("Entering create_purchase_order function");
    debug!(
        "Creating purchase order '{}' for project {} with {} items",
        request.po_number,
        request.project_id,
        request.items.len()
    );

    if request
        .items
        .iter()
        .any(|item| item.quantity <= 0 || item.unit_price < Decimal::ZERO)
    {
        warn!("Rejecting purchase order '{}' with invalid line item", request.po_number);
        return Err(StatusCode::BAD_REQUEST);
    }

    let total = items_total(&request.items);
    let now = Utc::now().naive_utc();

    let result = state
        .db
        .transaction::<_, purchase_order::Model, sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let po = purchase_order::ActiveModel {
                    project_id: Set(request.project_id),
                    vendor_id: Set(request.vendor_id),
                    po_number: Set(request.po_number),
                    status: Set(PurchaseOrderStatus::Draft),
                    total_amount: Set(total),
                    version: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                for (index, item) in request.items.into_iter().enumerate() {
                    purchase_order_item::ActiveModel {
                        purchase_order_id: Set(po.id),
                        name: Set(item.name),
                        quantity: Set(item.quantity),
                        unit_price: Set(item.unit_price),
                        sort_order: Set(index as i32),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(po)
            })
        })
        .await;

    match result {
        Ok(po) => {
            info!("Purchase order created successfully with ID: {}", po.id);
            let items = load_items(&state, po.id).await?;
            let response = ApiResponse {
                data: PurchaseOrderResponse::from_parts(po, items),
                message: "Purchase order created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create purchase order: {}", db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get all purchase orders
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders",
    tag = "purchase-orders",
    responses(
        (status = 200, description = "Purchase orders retrieved successfully", body = ApiResponse<Vec<PurchaseOrderResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_purchase_orders(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PurchaseOrderResponse>>>, StatusCode> {
    trace!("Entering get_purchase_orders function");

    let orders = match purchase_order::Entity::find().all(&state.db).await {
        Ok(orders) => orders,
        Err(db_error) => {
            error!("Failed to retrieve purchase orders: {}", db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let mut responses = Vec::with_capacity(orders.len());
    for po in orders {
        let items = load_items(&state, po.id).await?;
        responses.push(PurchaseOrderResponse::from_parts(po, items));
    }

    debug!("Retrieved {} purchase orders", responses.len());
    let response = ApiResponse {
        data: responses,
        message: "Purchase orders retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Get a specific purchase order by ID
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{po_id}",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    responses(
        (status = 200, description = "Purchase order retrieved successfully", body = ApiResponse<PurchaseOrderResponse>),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_purchase_order(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PurchaseOrderResponse>>, StatusCode> {
    trace!("Entering get_purchase_order for po_id: {}", po_id);

    let po = find_po(&state, po_id).await?;
    let items = load_items(&state, po_id).await?;
    let response = ApiResponse {
        data: PurchaseOrderResponse::from_parts(po, items),
        message: "Purchase order retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update a draft purchase order
///
/// Replacing line items recomputes the stored total.
#[utoipa::path(
    put,
    path = "/api/v1/purchase-orders/{po_id}",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    request_body = UpdatePurchaseOrderRequest,
    responses(
        (status = 200, description = "Purchase order updated successfully", body = ApiResponse<PurchaseOrderResponse>),
        (status = 400, description = "Purchase order is not in Draft", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_purchase_order(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePurchaseOrderRequest>,
) -> Result<Json<ApiResponse<PurchaseOrderResponse>>, StatusCode> {
    trace!("Entering update_purchase_order for po_id: {}", po_id);

    let existing = find_po(&state, po_id).await?;
    if existing.status != PurchaseOrderStatus::Draft {
        warn!("Purchase order {} is {:?}, refusing update", po_id, existing.status);
        return Err(StatusCode::BAD_REQUEST);
    }
    if let Some(items) = &request.items {
        if items
            .iter()
            .any(|item| item.quantity <= 0 || item.unit_price < Decimal::ZERO)
        {
            warn!("Rejecting invalid line item for purchase order {}", po_id);
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let result = state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let mut po_active: purchase_order::ActiveModel = existing.into();
                if let Some(vendor_id) = request.vendor_id {
                    po_active.vendor_id = Set(vendor_id);
                }
                if let Some(items) = request.items {
                    purchase_order_item::Entity::delete_many()
                        .filter(purchase_order_item::Column::PurchaseOrderId.eq(po_id))
                        .exec(txn)
                        .await?;
                    po_active.total_amount = Set(items_total(&items));
                    for (index, item) in items.into_iter().enumerate() {
                        purchase_order_item::ActiveModel {
                            purchase_order_id: Set(po_id),
                            name: Set(item.name),
                            quantity: Set(item.quantity),
                            unit_price: Set(item.unit_price),
                            sort_order: Set(index as i32),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await?;
                    }
                }
                po_active.updated_at = Set(Utc::now().naive_utc());
                po_active.update(txn).await?;
                Ok(())
            })
        })
        .await;

    if let Err(db_error) = result {
        error!("Failed to update purchase order {}: {}", po_id, db_error);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    info!("Purchase order {} updated successfully", po_id);
    let po = find_po(&state, po_id).await?;
    let items = load_items(&state, po_id).await?;
    let response = ApiResponse {
        data: PurchaseOrderResponse::from_parts(po, items),
        message: "Purchase order updated successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Delete a draft purchase order
#[utoipa::path(
    delete,
    path = "/api/v1/purchase-orders/{po_id}",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    responses(
        (status = 200, description = "Purchase order deleted successfully", body = ApiResponse<String>),
        (status = 400, description = "Purchase order is not in Draft", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_purchase_order(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_purchase_order for po_id: {}", po_id);

    let existing = find_po(&state, po_id).await?;
    if existing.status != PurchaseOrderStatus::Draft {
        warn!("Purchase order {} is {:?}, refusing delete", po_id, existing.status);
        return Err(StatusCode::BAD_REQUEST);
    }

    match purchase_order::Entity::delete_by_id(po_id).exec(&state.db).await {
        Ok(_) => {
            info!("Purchase order {} deleted successfully", po_id);
            let response = ApiResponse {
                data: format!("Purchase order {} deleted", po_id),
                message: "Purchase order deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to delete purchase order {}: {}", po_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Submit a purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{po_id}/submit",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Purchase order submitted successfully", body = ApiResponse<PurchaseOrderResponse>),
        (status = 400, description = "Illegal transition or empty order", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn submit_purchase_order(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<PurchaseOrderResponse>>, StatusCode> {
    run_transition(&state, po_id, PurchaseOrderAction::Submit, body).await
}

/// Approve a submitted purchase order
#[utoipa::path(
    post,
    path = "/api/v1/purchase-orders/{po_id}/approve",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    request_body = TransitionBody,
    responses(
        (status = 200, description = "Purchase order approved successfully", body = ApiResponse<PurchaseOrderResponse>),
        (status = 400, description = "Illegal transition", body = ErrorResponse),
        (status = 403, description = "Actor may not approve", body = ErrorResponse),
        (status = 404, description = "Purchase order not found", body = ErrorResponse),
        (status = 409, description = "Concurrent modification", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn approve_purchase_order(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<ApiResponse<PurchaseOrderResponse>>, StatusCode> {
    run_transition(&state, po_id, PurchaseOrderAction::Approve, body).await
}

/// Get the audit history of a purchase order
#[utoipa::path(
    get,
    path = "/api/v1/purchase-orders/{po_id}/history",
    tag = "purchase-orders",
    params(
        ("po_id" = i32, Path, description = "Purchase order ID"),
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<HistoryEntryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_purchase_order_history(
    Path(po_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryResponse>>>, StatusCode> {
    crate::handlers::list_history(&state.db, EntityRef::PurchaseOrder(po_id)).await
}
