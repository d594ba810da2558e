use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Default, DeriveEntityModel)]
#[sea_orm(table_name = "rightcall")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub name: String,
    pub passwd: String,
    #[sea_orm(column_name = "authorization")]
    pub authorization: i32,
    pub description: Option<String>,
    pub commented: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
