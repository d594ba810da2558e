use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Default, DeriveEntityModel)]
#[sea_orm(table_name = "voicemail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub uniqueid: i32,
    pub tenant_uuid: Uuid,
    pub fullname: String,
    pub mailbox: String,
    pub context: String,
    pub password: String,
    pub email: Option<String>,
    pub language: Option<String>,
    pub commented: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
