use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;

/// Storage keeps this as the `authorization` integer: 0 denies, 1 allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallPermissionMode {
    #[default]
    Deny,
    Allow,
}

impl CallPermissionMode {
    pub fn from_authorization(value: i32) -> Self {
        if value == 1 {
            CallPermissionMode::Allow
        } else {
            CallPermissionMode::Deny
        }
    }

    pub fn authorization(&self) -> i32 {
        match self {
            CallPermissionMode::Deny => 0,
            CallPermissionMode::Allow => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallPermission {
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub name: String,
    pub password: Option<String>,
    pub mode: CallPermissionMode,
    pub description: Option<String>,
    pub enabled: bool,
}

impl CallPermission {
    pub fn new(tenant_uuid: Uuid, name: String) -> Self {
        Self {
            tenant_uuid,
            name,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn check_mandatory(&self) -> Result<(), DaoError> {
        if self.name.is_empty() {
            return Err(DaoError::missing_field("name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trip() {
        assert_eq!(CallPermissionMode::from_authorization(0), CallPermissionMode::Deny);
        assert_eq!(CallPermissionMode::from_authorization(1), CallPermissionMode::Allow);
        assert_eq!(CallPermissionMode::from_authorization(7), CallPermissionMode::Deny);
        assert_eq!(CallPermissionMode::Allow.authorization(), 1);
    }
}
