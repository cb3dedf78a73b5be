use crate::handlers::{
    budget_pools::{
        create_budget_pool, delete_budget_pool, get_budget_pool, get_budget_pools,
        update_pool_categories,
    },
    charge_outs::{
        confirm_charge_out, create_charge_out, delete_charge_out, get_charge_out,
        get_charge_out_history, get_charge_outs, mark_charge_out_paid, reject_charge_out,
        revert_charge_out, submit_charge_out, update_charge_out,
    },
    expenses::{
        approve_expense, create_expense, delete_expense, get_expense, get_expense_history,
        get_expenses, mark_expense_paid, reject_expense, submit_expense, update_expense,
    },
    health::health_check,
    om_expenses::{
        create_om_expense, get_om_expense, get_om_expense_history, get_om_expenses,
        update_monthly_records,
    },
    projects::{create_project, get_project, get_projects},
    proposals::{
        approve_proposal, create_proposal, delete_proposal, get_proposal, get_proposal_comments,
        get_proposal_history, get_proposals, reject_proposal, request_more_info, submit_proposal,
        update_proposal,
    },
    purchase_orders::{
        approve_purchase_order, create_purchase_order, delete_purchase_order, get_purchase_order,
        get_purchase_order_history, get_purchase_orders, submit_purchase_order,
        update_purchase_order,
    },
    summaries::{get_om_summary, get_opco_summary, get_pool_summary},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Budget pool routes
        .route("/api/v1/budget-pools", post(create_budget_pool))
        .route("/api/v1/budget-pools", get(get_budget_pools))
        .route("/api/v1/budget-pools/:pool_id", get(get_budget_pool))
        .route("/api/v1/budget-pools/:pool_id", delete(delete_budget_pool))
        .route(
            "/api/v1/budget-pools/:pool_id/categories",
            put(update_pool_categories),
        )
        // Project routes
        .route("/api/v1/projects", post(create_project))
        .route("/api/v1/projects", get(get_projects))
        .route("/api/v1/projects/:project_id", get(get_project))
        // Proposal routes
        .route("/api/v1/proposals", post(create_proposal))
        .route("/api/v1/proposals", get(get_proposals))
        .route("/api/v1/proposals/:proposal_id", get(get_proposal))
        .route("/api/v1/proposals/:proposal_id", put(update_proposal))
        .route("/api/v1/proposals/:proposal_id", delete(delete_proposal))
        .route("/api/v1/proposals/:proposal_id/submit", post(submit_proposal))
        .route("/api/v1/proposals/:proposal_id/approve", post(approve_proposal))
        .route("/api/v1/proposals/:proposal_id/reject", post(reject_proposal))
        .route(
            "/api/v1/proposals/:proposal_id/request-more-info",
            post(request_more_info),
        )
        .route(
            "/api/v1/proposals/:proposal_id/comments",
            get(get_proposal_comments),
        )
        .route(
            "/api/v1/proposals/:proposal_id/history",
            get(get_proposal_history),
        )
        // Purchase order routes
        .route("/api/v1/purchase-orders", post(create_purchase_order))
        .route("/api/v1/purchase-orders", get(get_purchase_orders))
        .route("/api/v1/purchase-orders/:po_id", get(get_purchase_order))
        .route("/api/v1/purchase-orders/:po_id", put(update_purchase_order))
        .route("/api/v1/purchase-orders/:po_id", delete(delete_purchase_order))
        .route(
            "/api/v1/purchase-orders/:po_id/submit",
            post(submit_purchase_order),
        )
        .route(
            "/api/v1/purchase-orders/:po_id/approve",
            post(approve_purchase_order),
        )
        .route(
            "/api/v1/purchase-orders/:po_id/history",
            get(get_purchase_order_history),
        )
        // Expense routes
        .route("/api/v1/expenses", post(create_expense))
        .route("/api/v1/expenses", get(get_expenses))
        .route("/api/v1/expenses/:expense_id", get(get_expense))
        .route("/api/v1/expenses/:expense_id", put(update_expense))
        .route("/api/v1/expenses/:expense_id", delete(delete_expense))
        .route("/api/v1/expenses/:expense_id/submit", post(submit_expense))
        .route("/api/v1/expenses/:expense_id/approve", post(approve_expense))
        .route("/api/v1/expenses/:expense_id/reject", post(reject_expense))
        .route("/api/v1/expenses/:expense_id/mark-paid", post(mark_expense_paid))
        .route("/api/v1/expenses/:expense_id/history", get(get_expense_history))
        // Charge-out routes
        .route("/api/v1/charge-outs", post(create_charge_out))
        .route("/api/v1/charge-outs", get(get_charge_outs))
        .route("/api/v1/charge-outs/:charge_out_id", get(get_charge_out))
        .route("/api/v1/charge-outs/:charge_out_id", put(update_charge_out))
        .route("/api/v1/charge-outs/:charge_out_id", delete(delete_charge_out))
        .route(
            "/api/v1/charge-outs/:charge_out_id/submit",
            post(submit_charge_out),
        )
        .route(
            "/api/v1/charge-outs/:charge_out_id/confirm",
            post(confirm_charge_out),
        )
        .route(
            "/api/v1/charge-outs/:charge_out_id/reject",
            post(reject_charge_out),
        )
        .route(
            "/api/v1/charge-outs/:charge_out_id/mark-paid",
            post(mark_charge_out_paid),
        )
        .route(
            "/api/v1/charge-outs/:charge_out_id/revert",
            post(revert_charge_out),
        )
        .route(
            "/api/v1/charge-outs/:charge_out_id/history",
            get(get_charge_out_history),
        )
        // O&M expense routes
        .route("/api/v1/om-expenses", post(create_om_expense))
        .route("/api/v1/om-expenses", get(get_om_expenses))
        .route("/api/v1/om-expenses/:om_expense_id", get(get_om_expense))
        .route(
            "/api/v1/om-expenses/:om_expense_id/monthly-records",
            put(update_monthly_records),
        )
        .route(
            "/api/v1/om-expenses/:om_expense_id/history",
            get(get_om_expense_history),
        )
        // Summary routes
        .route("/api/v1/summaries/pools/:pool_id", get(get_pool_summary))
        .route("/api/v1/summaries/opco", get(get_opco_summary))
        .route("/api/v1/summaries/om", get(get_om_summary))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
