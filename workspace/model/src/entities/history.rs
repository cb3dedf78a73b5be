use sea_orm::entity::prelude::*;
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};

/// Which workflow entity a history record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum HistoryEntityType {
    #[sea_orm(string_value = "BudgetProposal")]
    BudgetProposal,
    #[sea_orm(string_value = "PurchaseOrder")]
    PurchaseOrder,
    #[sea_orm(string_value = "Expense")]
    Expense,
    #[sea_orm(string_value = "ChargeOut")]
    ChargeOut,
    #[sea_orm(string_value = "OmExpense")]
    OmExpense,
}

/// Append-only record of one workflow transition. Never updated or deleted
/// once written.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_type: HistoryEntityType,
    pub entity_id: i32,
    /// Action tag, e.g. "SUBMITTED", "APPROVED".
    pub action: String,
    pub details: Option<String>,
    pub user_id: i32,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
