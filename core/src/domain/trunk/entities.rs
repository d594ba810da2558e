use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trunk {
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub context: Option<String>,
    pub description: Option<String>,
    pub endpoint_sip_uuid: Option<Uuid>,
    pub endpoint_custom_uuid: Option<Uuid>,
    pub enabled: bool,
}

impl Trunk {
    pub fn new(tenant_uuid: Uuid) -> Self {
        Self {
            tenant_uuid,
            enabled: true,
            ..Default::default()
        }
    }
}
