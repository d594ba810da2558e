use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::common::entities::app_errors::DaoError;

/// Destination id used when an extension points at nothing.
pub const UNATTACHED: &str = "0";

static EXTEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9*#]+$").expect("valid exten regex"));

// Asterisk pattern syntax: `_` prefix, then digit classes and wildcards.
static EXTEN_PATTERN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_\+?[0-9*#XZN.!\[\]\-]+$").expect("valid exten pattern regex"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    pub id: i32,
    pub exten: String,
    pub context: String,
    pub destination_type: String,
    pub destination_id: String,
    pub enabled: bool,
}

impl Default for Extension {
    fn default() -> Self {
        Self {
            id: 0,
            exten: String::new(),
            context: String::new(),
            destination_type: "user".to_string(),
            destination_id: UNATTACHED.to_string(),
            enabled: true,
        }
    }
}

impl Extension {
    pub fn new(exten: String, context: String) -> Self {
        Self {
            exten,
            context,
            ..Default::default()
        }
    }

    pub fn is_pattern(&self) -> bool {
        self.exten.starts_with('_')
    }

    pub fn check_mandatory(&self) -> Result<(), DaoError> {
        if self.exten.is_empty() {
            return Err(DaoError::missing_field("exten"));
        }
        if self.context.is_empty() {
            return Err(DaoError::missing_field("context"));
        }
        validate_exten(&self.exten)
    }
}

pub fn validate_exten(exten: &str) -> Result<(), DaoError> {
    let valid = if exten.starts_with('_') {
        EXTEN_PATTERN_REGEX.is_match(exten)
    } else {
        EXTEN_REGEX.is_match(exten)
    };
    if valid {
        Ok(())
    } else {
        Err(DaoError::invalid_input(
            "exten",
            format!("'{exten}' is not a valid extension number or pattern"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_exten() {
        assert!(validate_exten("1000").is_ok());
        assert!(validate_exten("*10").is_ok());
        assert!(validate_exten("+33123456789").is_ok());
        assert!(validate_exten("_+33XXXX").is_ok());
        assert!(validate_exten("_8[1-5]XX.").is_ok());

        assert!(validate_exten("12 34").is_err());
        assert!(validate_exten("abcd").is_err());
        assert!(validate_exten("1X2").is_err());
    }

    #[test]
    fn test_check_mandatory() {
        let extension = Extension::new("1000".to_string(), "default".to_string());
        assert!(extension.check_mandatory().is_ok());
        assert_eq!(extension.destination_id, UNATTACHED);

        let missing = Extension::new(String::new(), "default".to_string());
        assert_eq!(
            missing.check_mandatory().unwrap_err().to_string(),
            "missing mandatory field: exten"
        );

        let invalid = Extension::new("12ab".to_string(), "default".to_string());
        let err = invalid.check_mandatory().unwrap_err();
        assert!(err.to_string().contains("exten"));
    }
}
