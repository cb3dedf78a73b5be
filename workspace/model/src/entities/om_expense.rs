use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A recurring operations & maintenance expense tracked month by month.
///
/// Exactly twelve monthly records are created atomically with the parent.
/// `actual_spent` is never hand-edited: it is recomputed as the sum of the
/// monthly actuals whenever any monthly record changes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "om_expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category_id: i32,
    pub fiscal_year: i32,
    pub budget_amount: Decimal,
    pub actual_spent: Decimal,
    pub version: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_category::Entity",
        from = "Column::CategoryId",
        to = "super::budget_category::Column::Id"
    )]
    BudgetCategory,
    #[sea_orm(has_many = "super::om_monthly_record::Entity")]
    OmMonthlyRecord,
}

impl Related<super::om_monthly_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OmMonthlyRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
