use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::generate_uuid_v7;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub firstname: String,
    pub lastname: Option<String>,
    /// Denormalized display identity; recomputed by the user fixer.
    pub caller_id: Option<String>,
    pub voicemail_id: Option<i32>,
    pub music_on_hold: Option<String>,
    pub enabled: bool,
}

impl User {
    pub fn new(tenant_uuid: Uuid, firstname: String) -> Self {
        Self {
            uuid: generate_uuid_v7(),
            tenant_uuid,
            firstname,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn fullname(&self) -> String {
        match self.lastname.as_deref() {
            Some(lastname) if !lastname.is_empty() => format!("{} {}", self.firstname, lastname),
            _ => self.firstname.clone(),
        }
    }

    pub fn check_mandatory(&self) -> Result<(), DaoError> {
        if self.firstname.is_empty() {
            return Err(DaoError::missing_field("firstname"));
        }
        Ok(())
    }
}

/// Quoted display name, optionally followed by the number, as understood by
/// telephony endpoints: `"John Doe" <1000>`.
pub fn caller_id_for(fullname: &str, number: Option<&str>) -> String {
    match number {
        Some(number) => format!("\"{fullname}\" <{number}>"),
        None => format!("\"{fullname}\""),
    }
}

/// Association row between a user and one of its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLine {
    pub user_id: i32,
    pub line_id: i32,
    pub main_user: bool,
    pub main_line: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullname() {
        let mut user = User::new(Uuid::new_v4(), "John".to_string());
        assert_eq!(user.fullname(), "John");

        user.lastname = Some("Doe".to_string());
        assert_eq!(user.fullname(), "John Doe");

        user.lastname = Some(String::new());
        assert_eq!(user.fullname(), "John");
    }

    #[test]
    fn test_caller_id_for() {
        assert_eq!(caller_id_for("John Doe", None), "\"John Doe\"");
        assert_eq!(caller_id_for("John Doe", Some("1000")), "\"John Doe\" <1000>");
    }

    #[test]
    fn test_check_mandatory() {
        let user = User::new(Uuid::new_v4(), String::new());
        assert_eq!(
            user.check_mandatory().unwrap_err().to_string(),
            "missing mandatory field: firstname"
        );
    }
}
