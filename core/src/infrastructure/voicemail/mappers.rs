use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::voicemail::entities::Voicemail;
use crate::entity::voicemail::Model as VoicemailModel;
use crate::infrastructure::mapping::{Converter, FieldBinding, empty_when_none, none_when_empty};

pub fn converter() -> Result<Converter<VoicemailModel, Voicemail>, DaoError> {
    Converter::new(vec![
        FieldBinding {
            source: "uniqueid",
            model: "id",
            to_model: |row, vm| vm.id = row.uniqueid,
            to_source: |vm, row| row.uniqueid = vm.id,
        },
        FieldBinding {
            source: "tenant_uuid",
            model: "tenant_uuid",
            to_model: |row, vm| vm.tenant_uuid = row.tenant_uuid,
            to_source: |vm, row| row.tenant_uuid = vm.tenant_uuid,
        },
        FieldBinding {
            source: "fullname",
            model: "name",
            to_model: |row, vm| vm.name = row.fullname.clone(),
            to_source: |vm, row| row.fullname = vm.name.clone(),
        },
        FieldBinding {
            source: "mailbox",
            model: "number",
            to_model: |row, vm| vm.number = row.mailbox.clone(),
            to_source: |vm, row| row.mailbox = vm.number.clone(),
        },
        FieldBinding {
            source: "context",
            model: "context",
            to_model: |row, vm| vm.context = row.context.clone(),
            to_source: |vm, row| row.context = vm.context.clone(),
        },
        FieldBinding {
            source: "password",
            model: "password",
            to_model: |row, vm| vm.password = none_when_empty(&row.password),
            to_source: |vm, row| row.password = empty_when_none(&vm.password),
        },
        FieldBinding {
            source: "email",
            model: "email",
            to_model: |row, vm| vm.email = row.email.clone(),
            to_source: |vm, row| row.email = vm.email.clone(),
        },
        FieldBinding {
            source: "language",
            model: "language",
            to_model: |row, vm| vm.language = row.language.clone(),
            to_source: |vm, row| row.language = vm.language.clone(),
        },
        FieldBinding {
            source: "commented",
            model: "enabled",
            to_model: |row, vm| vm.enabled = row.commented == 0,
            to_source: |vm, row| row.commented = i32::from(!vm.enabled),
        },
    ])
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_row_to_model() {
        let tenant_uuid = Uuid::new_v4();
        let row = VoicemailModel {
            uniqueid: 42,
            tenant_uuid,
            fullname: "Ashton".to_string(),
            mailbox: "1000".to_string(),
            context: "default".to_string(),
            password: String::new(),
            email: Some("ashton@example.org".to_string()),
            language: None,
            commented: 0,
        };

        let voicemail = converter().unwrap().to_model(&row);
        assert_eq!(voicemail.id, 42);
        assert_eq!(voicemail.name, "Ashton");
        assert_eq!(voicemail.number, "1000");
        assert_eq!(voicemail.password, None);
        assert!(voicemail.enabled);
    }

    #[test]
    fn test_round_trip() {
        let voicemail = Voicemail {
            id: 42,
            tenant_uuid: Uuid::new_v4(),
            name: "Ashton".to_string(),
            number: "1000".to_string(),
            context: "default".to_string(),
            password: Some("1234".to_string()),
            email: None,
            language: Some("fr_FR".to_string()),
            enabled: true,
        };
        let converter = converter().unwrap();
        assert_eq!(converter.to_model(&converter.to_source(&voicemail)), voicemail);
    }
}
