use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// One calendar month of an O&M expense. Unique per (parent, month).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "om_monthly_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub om_expense_id: i32,
    /// Calendar month, 1..=12.
    pub month: i32,
    pub budget_amount: Decimal,
    pub actual_amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::om_expense::Entity",
        from = "Column::OmExpenseId",
        to = "super::om_expense::Column::Id"
    )]
    OmExpense,
}

impl Related<super::om_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OmExpense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
