use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::context::entities::{Context, ContextType};
use crate::entity::context::Model as ContextModel;
use crate::infrastructure::mapping::{Converter, FieldBinding};

pub fn converter() -> Result<Converter<ContextModel, Context>, DaoError> {
    Converter::new(vec![
        FieldBinding {
            source: "id",
            model: "id",
            to_model: |row, c| c.id = row.id,
            to_source: |c, row| row.id = c.id,
        },
        FieldBinding {
            source: "uuid",
            model: "uuid",
            to_model: |row, c| c.uuid = row.uuid,
            to_source: |c, row| row.uuid = c.uuid,
        },
        FieldBinding {
            source: "tenant_uuid",
            model: "tenant_uuid",
            to_model: |row, c| c.tenant_uuid = row.tenant_uuid,
            to_source: |c, row| row.tenant_uuid = c.tenant_uuid,
        },
        FieldBinding {
            source: "name",
            model: "name",
            to_model: |row, c| c.name = row.name.clone(),
            to_source: |c, row| row.name = c.name.clone(),
        },
        FieldBinding {
            source: "displayname",
            model: "label",
            to_model: |row, c| c.label = row.displayname.clone(),
            to_source: |c, row| row.displayname = c.label.clone(),
        },
        FieldBinding {
            source: "contexttype",
            model: "context_type",
            to_model: |row, c| c.context_type = ContextType::parse_lossy(&row.contexttype),
            to_source: |c, row| row.contexttype = c.context_type.as_str().to_string(),
        },
        FieldBinding {
            source: "description",
            model: "description",
            to_model: |row, c| c.description = row.description.clone(),
            to_source: |c, row| row.description = c.description.clone(),
        },
        FieldBinding {
            source: "commented",
            model: "enabled",
            to_model: |row, c| c.enabled = row.commented == 0,
            to_source: |c, row| row.commented = i32::from(!c.enabled),
        },
    ])
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_round_trip() {
        let context = Context {
            id: 3,
            uuid: Uuid::new_v4(),
            tenant_uuid: Uuid::new_v4(),
            name: "default".to_string(),
            label: Some("Default".to_string()),
            context_type: ContextType::Incall,
            description: None,
            enabled: false,
        };
        let converter = converter().unwrap();
        assert_eq!(converter.to_model(&converter.to_source(&context)), context);
    }

    #[test]
    fn test_unknown_stored_type_degrades_to_internal() {
        let row = ContextModel {
            contexttype: "inward".to_string(),
            ..Default::default()
        };
        let context = converter().unwrap().to_model(&row);
        assert_eq!(context.context_type, ContextType::Internal);
    }
}
