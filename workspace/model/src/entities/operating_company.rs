use sea_orm::entity::prelude::*;

/// An operating company that approved costs can be charged out to.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "operating_companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::charge_out::Entity")]
    ChargeOut,
}

impl Related<super::charge_out::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeOut.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
