use crate::domain::call_permission::entities::{CallPermission, CallPermissionMode};
use crate::domain::common::entities::app_errors::DaoError;
use crate::entity::rightcall::Model as RightcallModel;
use crate::infrastructure::mapping::{Converter, FieldBinding, empty_when_none, none_when_empty};

pub fn converter() -> Result<Converter<RightcallModel, CallPermission>, DaoError> {
    Converter::new(vec![
        FieldBinding {
            source: "id",
            model: "id",
            to_model: |row, p| p.id = row.id,
            to_source: |p, row| row.id = p.id,
        },
        FieldBinding {
            source: "tenant_uuid",
            model: "tenant_uuid",
            to_model: |row, p| p.tenant_uuid = row.tenant_uuid,
            to_source: |p, row| row.tenant_uuid = p.tenant_uuid,
        },
        FieldBinding {
            source: "name",
            model: "name",
            to_model: |row, p| p.name = row.name.clone(),
            to_source: |p, row| row.name = p.name.clone(),
        },
        FieldBinding {
            source: "passwd",
            model: "password",
            to_model: |row, p| p.password = none_when_empty(&row.passwd),
            to_source: |p, row| row.passwd = empty_when_none(&p.password),
        },
        FieldBinding {
            source: "authorization",
            model: "mode",
            to_model: |row, p| p.mode = CallPermissionMode::from_authorization(row.authorization),
            to_source: |p, row| row.authorization = p.mode.authorization(),
        },
        FieldBinding {
            source: "description",
            model: "description",
            to_model: |row, p| p.description = row.description.clone(),
            to_source: |p, row| row.description = p.description.clone(),
        },
        FieldBinding {
            source: "commented",
            model: "enabled",
            to_model: |row, p| p.enabled = row.commented == 0,
            to_source: |p, row| row.commented = i32::from(!p.enabled),
        },
    ])
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_round_trip() {
        let permission = CallPermission {
            id: 5,
            tenant_uuid: Uuid::new_v4(),
            name: "international".to_string(),
            password: Some("1234".to_string()),
            mode: CallPermissionMode::Allow,
            description: None,
            enabled: true,
        };
        let converter = converter().unwrap();
        assert_eq!(converter.to_model(&converter.to_source(&permission)), permission);
    }

    #[test]
    fn test_authorization_flag_coercion() {
        let row = RightcallModel {
            authorization: 1,
            passwd: String::new(),
            ..Default::default()
        };
        let permission = converter().unwrap().to_model(&row);
        assert_eq!(permission.mode, CallPermissionMode::Allow);
        assert_eq!(permission.password, None);
    }
}
