use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::extension::entities::Extension;
use crate::entity::extensions::Model as ExtensionModel;
use crate::infrastructure::mapping::{Converter, FieldBinding};

pub fn converter() -> Result<Converter<ExtensionModel, Extension>, DaoError> {
    Converter::new(vec![
        FieldBinding {
            source: "id",
            model: "id",
            to_model: |row, e| e.id = row.id,
            to_source: |e, row| row.id = e.id,
        },
        FieldBinding {
            source: "exten",
            model: "exten",
            to_model: |row, e| e.exten = row.exten.clone(),
            to_source: |e, row| row.exten = e.exten.clone(),
        },
        FieldBinding {
            source: "context",
            model: "context",
            to_model: |row, e| e.context = row.context.clone(),
            to_source: |e, row| row.context = e.context.clone(),
        },
        FieldBinding {
            source: "type",
            model: "destination_type",
            to_model: |row, e| e.destination_type = row.r#type.clone(),
            to_source: |e, row| row.r#type = e.destination_type.clone(),
        },
        FieldBinding {
            source: "typeval",
            model: "destination_id",
            to_model: |row, e| e.destination_id = row.typeval.clone(),
            to_source: |e, row| row.typeval = e.destination_id.clone(),
        },
        FieldBinding {
            source: "commented",
            model: "enabled",
            to_model: |row, e| e.enabled = row.commented == 0,
            to_source: |e, row| row.commented = i32::from(!e.enabled),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let extension = Extension {
            id: 12,
            exten: "1000".to_string(),
            context: "default".to_string(),
            destination_type: "user".to_string(),
            destination_id: "7".to_string(),
            enabled: false,
        };
        let converter = converter().unwrap();
        assert_eq!(converter.to_model(&converter.to_source(&extension)), extension);
    }
}
