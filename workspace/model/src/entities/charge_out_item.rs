use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// One expense's share within a charge-out. The amount may be a partial
/// allocation of the referenced expense.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "charge_out_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub charge_out_id: i32,
    pub expense_id: i32,
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charge_out::Entity",
        from = "Column::ChargeOutId",
        to = "super::charge_out::Column::Id"
    )]
    ChargeOut,
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
}

impl Related<super::charge_out::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeOut.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
