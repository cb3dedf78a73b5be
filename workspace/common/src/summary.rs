use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-category budget consumption row.
///
/// `utilization` is the used/total ratio; it is `None` when the category has
/// no allocation (`total_amount == 0`) rather than a division-by-zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryUtilization {
    pub category_id: i32,
    pub name: String,
    pub code: String,
    pub total_amount: Decimal,
    pub used_amount: Decimal,
    /// Fraction of the allocation consumed, e.g. 0.05 for 5%.
    pub utilization: Option<Decimal>,
}

/// Rollup for a single budget pool.
///
/// `total_amount` is always the sum of the category allocations; the pool
/// never stores a total of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PoolSummary {
    pub pool_id: i32,
    pub name: String,
    pub fiscal_year: i32,
    pub currency_code: String,
    pub total_amount: Decimal,
    pub used_amount: Decimal,
    pub utilization: Option<Decimal>,
    pub categories: Vec<CategoryUtilization>,
}

/// Charge-out totals for one operating company, split by workflow status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpCoRollup {
    pub op_co_id: i32,
    pub name: String,
    pub code: String,
    pub draft_amount: Decimal,
    pub submitted_amount: Decimal,
    pub confirmed_amount: Decimal,
    pub paid_amount: Decimal,
}

/// Charge-out rollups across all operating companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OpCoSummary {
    pub companies: Vec<OpCoRollup>,
    pub total_confirmed: Decimal,
    pub total_paid: Decimal,
}

/// Budget versus actual for a single O&M expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OmExpenseSummary {
    pub om_expense_id: i32,
    pub name: String,
    pub budget_amount: Decimal,
    pub actual_spent: Decimal,
    pub utilization: Option<Decimal>,
}

/// O&M rollup for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OmSummary {
    pub fiscal_year: i32,
    pub total_budget: Decimal,
    pub total_actual: Decimal,
    pub items: Vec<OmExpenseSummary>,
}
