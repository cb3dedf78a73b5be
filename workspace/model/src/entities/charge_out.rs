use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};

/// Charge-out workflow states. Unlike the other machines, Submitted,
/// Confirmed and Paid can all be reverted back to Draft to correct a
/// mistaken submission; charge-outs carry no ledger effect, so the revert is
/// a pure status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ChargeOutStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Submitted")]
    Submitted,
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

/// Allocation of recorded expenses to an operating company for
/// cross-billing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "charge_outs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub op_co_id: i32,
    pub status: ChargeOutStatus,
    /// Derived: sum of the item amounts.
    pub total_amount: Decimal,
    pub confirmed_by: Option<i32>,
    pub confirmed_at: Option<DateTime>,
    pub version: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::operating_company::Entity",
        from = "Column::OpCoId",
        to = "super::operating_company::Column::Id"
    )]
    OperatingCompany,
    #[sea_orm(has_many = "super::charge_out_item::Entity")]
    ChargeOutItem,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::operating_company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperatingCompany.def()
    }
}

impl Related<super::charge_out_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeOutItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
