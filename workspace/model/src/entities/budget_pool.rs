use sea_orm::entity::prelude::*;

/// Top-level yearly budget container, divided into categories.
///
/// A pool has no stored total of its own: its total is always the sum of its
/// categories' allocations, computed at read time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_pools")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub fiscal_year: i32,
    /// ISO 4217 currency code, display attribute only. No conversion happens
    /// anywhere in the ledger.
    pub currency_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Categories cannot outlive their pool (cascade delete).
    #[sea_orm(has_many = "super::budget_category::Entity")]
    BudgetCategory,
    #[sea_orm(has_many = "super::project::Entity")]
    Project,
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategory.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
