use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};

/// Project lifecycle. Independent of the ledger workflow: the coordinator
/// never writes this field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "InProgress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Archived")]
    Archived,
}

/// A project drawing budget from one category.
///
/// `pool_id` is denormalized from the category for query convenience.
/// `approved_budget` is an aggregate owned by the ledger: the sum of approved
/// proposal amounts, written only via the balance store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub pool_id: i32,
    pub manager_id: i32,
    pub supervisor_id: i32,
    pub status: ProjectStatus,
    pub approved_budget: Decimal,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_category::Entity",
        from = "Column::CategoryId",
        to = "super::budget_category::Column::Id"
    )]
    BudgetCategory,
    #[sea_orm(
        belongs_to = "super::budget_pool::Entity",
        from = "Column::PoolId",
        to = "super::budget_pool::Column::Id"
    )]
    BudgetPool,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ManagerId",
        to = "super::user::Column::Id"
    )]
    Manager,
    #[sea_orm(has_many = "super::budget_proposal::Entity")]
    BudgetProposal,
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrder,
    #[sea_orm(has_many = "super::charge_out::Entity")]
    ChargeOut,
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategory.def()
    }
}

impl Related<super::budget_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetPool.def()
    }
}

impl Related<super::budget_proposal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetProposal.def()
    }
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
