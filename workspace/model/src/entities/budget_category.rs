use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A named slice of a pool's budget.
///
/// `used_amount` is a shared aggregate: it is mutated only through the ledger
/// balance store when an expense referencing this category is approved. The
/// budget is soft -- `used_amount` may exceed `total_amount`; overconsumption
/// is surfaced through utilization reporting, never hard-blocked.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub pool_id: i32,
    pub name: String,
    pub code: String,
    pub total_amount: Decimal,
    pub used_amount: Decimal,
    /// Bumped on every balance write; optimistic concurrency stamp.
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_pool::Entity",
        from = "Column::PoolId",
        to = "super::budget_pool::Column::Id"
    )]
    BudgetPool,
    #[sea_orm(has_many = "super::project::Entity")]
    Project,
    #[sea_orm(has_many = "super::expense::Entity")]
    Expense,
}

impl Related<super::budget_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetPool.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
