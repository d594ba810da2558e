use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Default, DeriveEntityModel)]
#[sea_orm(table_name = "trunkfeatures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub context: Option<String>,
    pub description: Option<String>,
    pub commented: i32,
    pub endpoint_sip_uuid: Option<Uuid>,
    pub endpoint_custom_uuid: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
