use common::{
    CategoryUtilization, OmExpenseSummary, OmSummary, OpCoRollup, OpCoSummary, PoolSummary,
};
use ledger::Coordinator;
use model::entities::budget_proposal::ProposalStatus;
use model::entities::charge_out::ChargeOutStatus;
use model::entities::expense::ExpenseStatus;
use model::entities::project::ProjectStatus;
use model::entities::purchase_order::PurchaseOrderStatus;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{HistoryEntryResponse, TransitionBody};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Workflow coordinator, the only writer of statuses and balances
    pub coordinator: Arc<Coordinator>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::budget_pools::create_budget_pool,
        crate::handlers::budget_pools::get_budget_pools,
        crate::handlers::budget_pools::get_budget_pool,
        crate::handlers::budget_pools::update_pool_categories,
        crate::handlers::budget_pools::delete_budget_pool,
        crate::handlers::projects::create_project,
        crate::handlers::projects::get_projects,
        crate::handlers::projects::get_project,
        crate::handlers::proposals::create_proposal,
        crate::handlers::proposals::get_proposals,
        crate::handlers::proposals::get_proposal,
        crate::handlers::proposals::update_proposal,
        crate::handlers::proposals::delete_proposal,
        crate::handlers::proposals::submit_proposal,
        crate::handlers::proposals::approve_proposal,
        crate::handlers::proposals::reject_proposal,
        crate::handlers::proposals::request_more_info,
        crate::handlers::proposals::get_proposal_comments,
        crate::handlers::proposals::get_proposal_history,
        crate::handlers::purchase_orders::create_purchase_order,
        crate::handlers::purchase_orders::get_purchase_orders,
        crate::handlers::purchase_orders::get_purchase_order,
        crate::handlers::purchase_orders::update_purchase_order,
        crate::handlers::purchase_orders::delete_purchase_order,
        crate::handlers::purchase_orders::submit_purchase_order,
        crate::handlers::purchase_orders::approve_purchase_order,
        crate::handlers::purchase_orders::get_purchase_order_history,
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::get_expenses,
        crate::handlers::expenses::get_expense,
        crate::handlers::expenses::update_expense,
        crate::handlers::expenses::delete_expense,
        crate::handlers::expenses::submit_expense,
        crate::handlers::expenses::approve_expense,
        crate::handlers::expenses::reject_expense,
        crate::handlers::expenses::mark_expense_paid,
        crate::handlers::expenses::get_expense_history,
        crate::handlers::charge_outs::create_charge_out,
        crate::handlers::charge_outs::get_charge_outs,
        crate::handlers::charge_outs::get_charge_out,
        crate::handlers::charge_outs::update_charge_out,
        crate::handlers::charge_outs::delete_charge_out,
        crate::handlers::charge_outs::submit_charge_out,
        crate::handlers::charge_outs::confirm_charge_out,
        crate::handlers::charge_outs::reject_charge_out,
        crate::handlers::charge_outs::mark_charge_out_paid,
        crate::handlers::charge_outs::revert_charge_out,
        crate::handlers::charge_outs::get_charge_out_history,
        crate::handlers::om_expenses::create_om_expense,
        crate::handlers::om_expenses::get_om_expenses,
        crate::handlers::om_expenses::get_om_expense,
        crate::handlers::om_expenses::update_monthly_records,
        crate::handlers::om_expenses::get_om_expense_history,
        crate::handlers::summaries::get_pool_summary,
        crate::handlers::summaries::get_opco_summary,
        crate::handlers::summaries::get_om_summary,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            TransitionBody,
            HistoryEntryResponse,
            ProjectStatus,
            ProposalStatus,
            PurchaseOrderStatus,
            ExpenseStatus,
            ChargeOutStatus,
            PoolSummary,
            CategoryUtilization,
            OpCoSummary,
            OpCoRollup,
            OmSummary,
            OmExpenseSummary,
            crate::handlers::budget_pools::CategoryInput,
            crate::handlers::budget_pools::CreateBudgetPoolRequest,
            crate::handlers::budget_pools::BudgetPoolResponse,
            crate::handlers::projects::CreateProjectRequest,
            crate::handlers::projects::ProjectResponse,
            crate::handlers::proposals::CreateProposalRequest,
            crate::handlers::proposals::UpdateProposalRequest,
            crate::handlers::proposals::ApproveProposalRequest,
            crate::handlers::proposals::ProposalResponse,
            crate::handlers::proposals::CommentResponse,
            crate::handlers::purchase_orders::PurchaseOrderItemInput,
            crate::handlers::purchase_orders::CreatePurchaseOrderRequest,
            crate::handlers::purchase_orders::UpdatePurchaseOrderRequest,
            crate::handlers::purchase_orders::PurchaseOrderItemResponse,
            crate::handlers::purchase_orders::PurchaseOrderResponse,
            crate::handlers::expenses::ExpenseItemInput,
            crate::handlers::expenses::CreateExpenseRequest,
            crate::handlers::expenses::UpdateExpenseRequest,
            crate::handlers::expenses::ExpenseItemResponse,
            crate::handlers::expenses::ExpenseResponse,
            crate::handlers::charge_outs::ChargeOutItemInput,
            crate::handlers::charge_outs::CreateChargeOutRequest,
            crate::handlers::charge_outs::UpdateChargeOutRequest,
            crate::handlers::charge_outs::ChargeOutItemResponse,
            crate::handlers::charge_outs::ChargeOutResponse,
            crate::handlers::om_expenses::CreateOmExpenseRequest,
            crate::handlers::om_expenses::MonthlyRecordInput,
            crate::handlers::om_expenses::UpdateMonthlyRecordsRequest,
            crate::handlers::om_expenses::MonthlyRecordResponse,
            crate::handlers::om_expenses::OmExpenseResponse,
            crate::handlers::summaries::OmSummaryQuery,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "budget-pools", description = "Budget pool and category allocation endpoints"),
        (name = "projects", description = "Project endpoints"),
        (name = "proposals", description = "Budget proposal workflow endpoints"),
        (name = "purchase-orders", description = "Purchase order workflow endpoints"),
        (name = "expenses", description = "Expense workflow endpoints"),
        (name = "charge-outs", description = "Charge-out workflow endpoints"),
        (name = "om-expenses", description = "Operations & maintenance expense endpoints"),
        (name = "summaries", description = "Budget consumption rollup endpoints"),
    ),
    info(
        title = "Procura API",
        description = "IT Budget & Procurement Tracker API - budget ledger, approval workflows and audit history",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
