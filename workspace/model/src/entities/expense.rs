use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};

/// Expense workflow states. Approved and Paid are forward-only; Rejected is
/// terminal. There is no backward edge out of Approved, so an approved
/// expense's budget contribution never needs reversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ExpenseStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Submitted")]
    Submitted,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "Paid")]
    Paid,
}

/// An invoiced expense recorded against a purchase order.
///
/// On the transition to Approved, `total_amount` is added exactly once to the
/// owning category's `used_amount` through the balance store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchase_order_id: i32,
    pub budget_category_id: i32,
    pub invoice_number: String,
    pub invoice_date: Date,
    pub status: ExpenseStatus,
    /// Derived: sum of the line item amounts.
    pub total_amount: Decimal,
    pub version: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PurchaseOrderId",
        to = "super::purchase_order::Column::Id"
    )]
    PurchaseOrder,
    #[sea_orm(
        belongs_to = "super::budget_category::Entity",
        from = "Column::BudgetCategoryId",
        to = "super::budget_category::Column::Id"
    )]
    BudgetCategory,
    #[sea_orm(has_many = "super::expense_item::Entity")]
    ExpenseItem,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl Related<super::budget_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetCategory.def()
    }
}

impl Related<super::expense_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
