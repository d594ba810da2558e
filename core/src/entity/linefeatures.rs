use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Default, DeriveEntityModel)]
#[sea_orm(table_name = "linefeatures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub name: Option<String>,
    pub number: Option<String>,
    pub context: String,
    pub device: Option<String>,
    pub provisioningid: i32,
    pub position: i32,
    pub commented: i32,
    pub caller_id_name: Option<String>,
    pub caller_id_num: Option<String>,
    pub endpoint_sip_uuid: Option<Uuid>,
    pub endpoint_custom_uuid: Option<Uuid>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
