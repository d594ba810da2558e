use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::generate_uuid_v7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    #[default]
    Internal,
    Incall,
    Outcall,
    Services,
    Others,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Internal => "internal",
            ContextType::Incall => "incall",
            ContextType::Outcall => "outcall",
            ContextType::Services => "services",
            ContextType::Others => "others",
        }
    }

    pub fn parse(value: &str) -> Result<Self, DaoError> {
        match value {
            "internal" => Ok(ContextType::Internal),
            "incall" => Ok(ContextType::Incall),
            "outcall" => Ok(ContextType::Outcall),
            "services" => Ok(ContextType::Services),
            "others" => Ok(ContextType::Others),
            other => Err(DaoError::invalid_input("contexttype", other.to_string())),
        }
    }

    /// Reading back a stored value: the schema constrains the column, so an
    /// unexpected value degrades to the default rather than failing a read.
    pub fn parse_lossy(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Context {
    pub id: i32,
    pub uuid: Uuid,
    pub tenant_uuid: Uuid,
    pub name: String,
    pub label: Option<String>,
    pub context_type: ContextType,
    pub description: Option<String>,
    pub enabled: bool,
}

impl Context {
    pub fn new(tenant_uuid: Uuid, name: String, context_type: ContextType) -> Self {
        Self {
            id: 0,
            uuid: generate_uuid_v7(),
            tenant_uuid,
            name,
            label: None,
            context_type,
            description: None,
            enabled: true,
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
    fn test_context_type_parse() {
        assert_eq!(ContextType::parse("incall").unwrap(), ContextType::Incall);
        assert!(ContextType::parse("inward").is_err());
        assert_eq!(ContextType::parse_lossy("inward"), ContextType::Internal);
    }

    #[test]
    fn test_check_mandatory() {
        let mut context = Context::new(Uuid::new_v4(), "default".to_string(), ContextType::Internal);
        assert!(context.check_mandatory().is_ok());

        context.name.clear();
        let err = context.check_mandatory().unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory field: name");
    }
}
