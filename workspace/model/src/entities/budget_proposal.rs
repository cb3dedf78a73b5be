use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};

/// Budget proposal workflow states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ProposalStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "PendingApproval")]
    PendingApproval,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "MoreInfoRequired")]
    MoreInfoRequired,
}

/// A request for project budget, drawn against the project's category.
///
/// `approved_amount` is set on approval (defaults to the requested amount)
/// and is the value added to the project's `approved_budget`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_proposals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub amount: Decimal,
    pub approved_amount: Option<Decimal>,
    pub status: ProposalStatus,
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTime>,
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
    #[sea_orm(has_many = "super::proposal_comment::Entity")]
    ProposalComment,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::proposal_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProposalComment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
