use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::generate_provisioning_code;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub id: i32,
    pub tenant_uuid: Uuid,
    pub name: Option<String>,
    /// Denormalized from the main extension; recomputed by the line fixer.
    pub number: Option<String>,
    pub context: String,
    pub device_id: Option<String>,
    pub provisioning_code: i32,
    pub position: i32,
    pub caller_id_name: Option<String>,
    pub caller_id_num: Option<String>,
    pub endpoint_sip_uuid: Option<Uuid>,
    pub endpoint_custom_uuid: Option<Uuid>,
    pub description: Option<String>,
    pub enabled: bool,
}

impl Line {
    pub fn new(tenant_uuid: Uuid, context: String) -> Self {
        Self {
            tenant_uuid,
            context,
            provisioning_code: generate_provisioning_code(),
            position: 1,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn check_mandatory(&self) -> Result<(), DaoError> {
        if self.context.is_empty() {
            return Err(DaoError::missing_field("context"));
        }
        if self.position < 1 {
            return Err(DaoError::invalid_input(
                "position",
                format!("{} is not a valid line position", self.position),
            ));
        }
        Ok(())
    }
}

/// Association row between a line and one of its extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineExtension {
    pub line_id: i32,
    pub extension_id: i32,
    pub main_extension: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_gets_a_provisioning_code() {
        let line = Line::new(Uuid::new_v4(), "default".to_string());
        assert!((100_000..1_000_000).contains(&line.provisioning_code));
        assert_eq!(line.position, 1);
        assert!(line.enabled);
    }

    #[test]
    fn test_check_mandatory() {
        let mut line = Line::new(Uuid::new_v4(), "default".to_string());
        assert!(line.check_mandatory().is_ok());

        line.position = 0;
        assert!(line.check_mandatory().unwrap_err().to_string().contains("position"));

        line.context.clear();
        assert_eq!(
            line.check_mandatory().unwrap_err().to_string(),
            "missing mandatory field: context"
        );
    }
}
