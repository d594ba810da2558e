//! Declarative row ↔ model conversion.
//!
//! Each resource whose storage vocabulary differs from its domain
//! vocabulary declares one mapping table: a list of field bindings, each
//! naming the storage field and the model field and carrying the copy
//! functions for both directions. The table is the single source of truth
//! for which fields move between representations; anything not bound is
//! left untouched, which is what lets `update_source` preserve primary keys
//! on edits. Coercions (flag inversion, empty string to `None`, stored
//! integer to enum) live inside individual bindings.

use std::fmt;

use crate::domain::common::entities::app_errors::DaoError;

pub struct FieldBinding<S, M> {
    pub source: &'static str,
    pub model: &'static str,
    pub to_model: fn(&S, &mut M),
    pub to_source: fn(&M, &mut S),
}

impl<S, M> Clone for FieldBinding<S, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, M> Copy for FieldBinding<S, M> {}

pub struct Converter<S, M> {
    bindings: Vec<FieldBinding<S, M>>,
}

impl<S, M> Converter<S, M> {
    /// Field names must be unique on both sides, otherwise the reverse
    /// mapping would be ambiguous.
    pub fn new(bindings: Vec<FieldBinding<S, M>>) -> Result<Self, DaoError> {
        for (i, binding) in bindings.iter().enumerate() {
            for other in &bindings[..i] {
                if binding.source == other.source {
                    return Err(DaoError::AmbiguousMapping {
                        field: binding.source,
                    });
                }
                if binding.model == other.model {
                    return Err(DaoError::AmbiguousMapping {
                        field: binding.model,
                    });
                }
            }
        }
        Ok(Self { bindings })
    }

    pub fn to_model(&self, source: &S) -> M
    where
        M: Default,
    {
        let mut model = M::default();
        self.update_model(&mut model, source);
        model
    }

    pub fn to_source(&self, model: &M) -> S
    where
        S: Default,
    {
        let mut source = S::default();
        self.update_source(&mut source, model);
        source
    }

    pub fn update_model(&self, model: &mut M, source: &S) {
        for binding in &self.bindings {
            (binding.to_model)(source, model);
        }
    }

    pub fn update_source(&self, source: &mut S, model: &M) {
        for binding in &self.bindings {
            (binding.to_source)(model, source);
        }
    }
}

impl<S, M> Clone for Converter<S, M> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<S, M> fmt::Debug for Converter<S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .bindings
            .iter()
            .map(|b| format!("{}<->{}", b.source, b.model))
            .collect();
        f.debug_struct("Converter").field("bindings", &pairs).finish()
    }
}

pub fn none_when_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn empty_when_none(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Row {
        uniqueid: i32,
        fullname: String,
        password: String,
        commented: i32,
    }

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Mailbox {
        id: i32,
        name: String,
        password: Option<String>,
        enabled: bool,
    }

    fn converter() -> Converter<Row, Mailbox> {
        Converter::new(vec![
            FieldBinding {
                source: "uniqueid",
                model: "id",
                to_model: |row: &Row, m: &mut Mailbox| m.id = row.uniqueid,
                to_source: |m, row| row.uniqueid = m.id,
            },
            FieldBinding {
                source: "fullname",
                model: "name",
                to_model: |row, m| m.name = row.fullname.clone(),
                to_source: |m, row| row.fullname = m.name.clone(),
            },
            FieldBinding {
                source: "password",
                model: "password",
                to_model: |row, m| m.password = none_when_empty(&row.password),
                to_source: |m, row| row.password = empty_when_none(&m.password),
            },
            FieldBinding {
                source: "commented",
                model: "enabled",
                to_model: |row, m| m.enabled = row.commented == 0,
                to_source: |m, row| row.commented = i32::from(!m.enabled),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_to_model_applies_renames_and_coercions() {
        let row = Row {
            uniqueid: 42,
            fullname: "Ashton".to_string(),
            password: String::new(),
            commented: 1,
        };
        let model = converter().to_model(&row);
        assert_eq!(
            model,
            Mailbox {
                id: 42,
                name: "Ashton".to_string(),
                password: None,
                enabled: false,
            }
        );
    }

    #[test]
    fn test_round_trip() {
        let model = Mailbox {
            id: 7,
            name: "Casa".to_string(),
            password: Some("1234".to_string()),
            enabled: true,
        };
        let converter = converter();
        assert_eq!(converter.to_model(&converter.to_source(&model)), model);
    }

    #[test]
    fn test_update_source_preserves_unmapped_state() {
        let mut row = Row {
            uniqueid: 42,
            fullname: "old".to_string(),
            password: "po".to_string(),
            commented: 0,
        };
        let model = Mailbox {
            id: 42,
            name: "new".to_string(),
            password: None,
            enabled: false,
        };
        converter().update_source(&mut row, &model);
        assert_eq!(row.uniqueid, 42);
        assert_eq!(row.fullname, "new");
        assert_eq!(row.password, "");
        assert_eq!(row.commented, 1);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let result: Result<Converter<Row, Mailbox>, _> = Converter::new(vec![
            FieldBinding {
                source: "fullname",
                model: "name",
                to_model: |row, m| m.name = row.fullname.clone(),
                to_source: |m, row| row.fullname = m.name.clone(),
            },
            FieldBinding {
                source: "fullname",
                model: "label",
                to_model: |_, _| {},
                to_source: |_, _| {},
            },
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "ambiguous field mapping: fullname");
    }
}
