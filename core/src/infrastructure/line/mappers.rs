use crate::domain::line::entities::{Line, LineExtension};
use crate::entity::{line_extension, linefeatures};

impl From<&linefeatures::Model> for Line {
    fn from(model: &linefeatures::Model) -> Self {
        Self {
            id: model.id,
            tenant_uuid: model.tenant_uuid,
            name: model.name.clone(),
            number: model.number.clone(),
            context: model.context.clone(),
            device_id: model.device.clone(),
            provisioning_code: model.provisioningid,
            position: model.position,
            caller_id_name: model.caller_id_name.clone(),
            caller_id_num: model.caller_id_num.clone(),
            endpoint_sip_uuid: model.endpoint_sip_uuid,
            endpoint_custom_uuid: model.endpoint_custom_uuid,
            description: model.description.clone(),
            enabled: model.commented == 0,
        }
    }
}

impl From<linefeatures::Model> for Line {
    fn from(model: linefeatures::Model) -> Self {
        Self::from(&model)
    }
}

impl From<&line_extension::Model> for LineExtension {
    fn from(model: &line_extension::Model) -> Self {
        Self {
            line_id: model.line_id,
            extension_id: model.extension_id,
            main_extension: model.main_extension,
        }
    }
}

impl From<line_extension::Model> for LineExtension {
    fn from(model: line_extension::Model) -> Self {
        Self::from(&model)
    }
}
