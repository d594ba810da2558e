use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Voicemail {
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub name: String,
    pub number: String,
    pub context: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub language: Option<String>,
    pub enabled: bool,
}

impl Voicemail {
    pub fn new(tenant_uuid: Uuid, name: String, number: String, context: String) -> Self {
        Self {
            id: 0,
            tenant_uuid,
            name,
            number,
            context,
            password: None,
            email: None,
            language: None,
            enabled: true,
        }
    }

    pub fn check_mandatory(&self) -> Result<(), DaoError> {
        if self.name.is_empty() {
            return Err(DaoError::missing_field("name"));
        }
        if self.number.is_empty() {
            return Err(DaoError::missing_field("number"));
        }
        if !self.number.chars().all(|c| c.is_ascii_digit()) {
            return Err(DaoError::invalid_input(
                "number",
                format!("'{}' is not numeric", self.number),
            ));
        }
        if self.context.is_empty() {
            return Err(DaoError::missing_field("context"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Voicemail {
        Voicemail::new(
            Uuid::new_v4(),
            "Ashton".to_string(),
            "1000".to_string(),
            "default".to_string(),
        )
    }

    #[test]
    fn test_check_mandatory() {
        assert!(sample().check_mandatory().is_ok());

        let mut voicemail = sample();
        voicemail.name.clear();
        assert_eq!(
            voicemail.check_mandatory().unwrap_err().to_string(),
            "missing mandatory field: name"
        );

        let mut voicemail = sample();
        voicemail.number = "12a4".to_string();
        assert!(voicemail.check_mandatory().unwrap_err().to_string().contains("number"));
    }
}
