use crate::domain::trunk::entities::Trunk;
use crate::entity::trunkfeatures;

impl From<&trunkfeatures::Model> for Trunk {
    fn from(model: &trunkfeatures::Model) -> Self {
        Self {
            id: model.id,
            tenant_uuid: model.tenant_uuid,
            context: model.context.clone(),
            description: model.description.clone(),
            endpoint_sip_uuid: model.endpoint_sip_uuid,
            endpoint_custom_uuid: model.endpoint_custom_uuid,
            enabled: model.commented == 0,
        }
    }
}

impl From<trunkfeatures::Model> for Trunk {
    fn from(model: trunkfeatures::Model) -> Self {
        Self::from(&model)
    }
}
