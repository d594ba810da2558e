use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::voicemail::{entities::Voicemail, ports::VoicemailRepository};
use crate::entity::userfeatures::{Column as UserColumn, Entity as UserEntity};
use crate::entity::voicemail::{ActiveModel, Column, Entity, Model};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::mapping::Converter;
use crate::infrastructure::search::{self, SearchConfig};
use crate::infrastructure::voicemail::mappers;

#[derive(Clone)]
pub struct PostgresVoicemailRepository {
    pub db: DatabaseConnection,
    converter: Converter<Model, Voicemail>,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "voicemail",
        [
            ("id", Column::Uniqueid),
            ("name", Column::Fullname),
            ("number", Column::Mailbox),
            ("context", Column::Context),
            ("email", Column::Email),
            ("language", Column::Language),
        ],
        vec![Column::Fullname, Column::Mailbox, Column::Email],
        Column::Mailbox,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresVoicemailRepository {
    pub fn new(db: DatabaseConnection) -> Result<Self, DaoError> {
        Ok(Self {
            db,
            converter: mappers::converter()?,
            config: search_config(),
            notifier: Arc::new(TracingEventPublisher),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn EventPublisher>) -> Self {
        self.notifier = notifier;
        self
    }

    fn active_model(row: Model) -> ActiveModel {
        ActiveModel {
            uniqueid: Set(row.uniqueid),
            tenant_uuid: Set(row.tenant_uuid),
            fullname: Set(row.fullname),
            mailbox: Set(row.mailbox),
            context: Set(row.context),
            password: Set(row.password),
            email: Set(row.email),
            language: Set(row.language),
            commented: Set(row.commented),
        }
    }
}

impl VoicemailRepository for PostgresVoicemailRepository {
    async fn get(&self, voicemail_id: i32) -> Result<Voicemail, DaoError> {
        self.find(voicemail_id)
            .await?
            .ok_or_else(|| DaoError::not_found("voicemail", format!("id={voicemail_id}")))
    }

    async fn find(&self, voicemail_id: i32) -> Result<Option<Voicemail>, DaoError> {
        let row = Entity::find_by_id(voicemail_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch voicemail {}: {}", voicemail_id, e);
                DaoError::storage("voicemail", e)
            })?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<Voicemail, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(self.converter.to_model(&row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<Voicemail>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<Voicemail>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(|row| self.converter.to_model(&row)))
    }

    async fn create(&self, voicemail: Voicemail) -> Result<Voicemail, DaoError> {
        voicemail.check_mandatory()?;

        let mut active = Self::active_model(self.converter.to_source(&voicemail));
        active.uniqueid = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create voicemail: {}", e);
                DaoError::storage("voicemail", e)
            })?;

        let created = self.converter.to_model(&created);
        notify(self.notifier.as_ref(), EventOp::Created, "voicemail", &created);
        Ok(created)
    }

    async fn edit(&self, voicemail: Voicemail) -> Result<Voicemail, DaoError> {
        voicemail.check_mandatory()?;

        let mut row = Entity::find_by_id(voicemail.id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch voicemail {}: {}", voicemail.id, e);
                DaoError::storage("voicemail", e)
            })?
            .ok_or_else(|| DaoError::not_found("voicemail", format!("id={}", voicemail.id)))?;
        self.converter.update_source(&mut row, &voicemail);

        let updated = Entity::update(Self::active_model(row))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit voicemail {}: {}", voicemail.id, e);
                DaoError::storage("voicemail", e)
            })?;

        let updated = self.converter.to_model(&updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "voicemail", &updated);
        Ok(updated)
    }

    async fn delete(&self, voicemail_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("voicemail", e)
        })?;

        let row = Entity::find_by_id(voicemail_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch voicemail {}: {}", voicemail_id, e);
                DaoError::storage("voicemail", e)
            })?
            .ok_or_else(|| DaoError::not_found("voicemail", format!("id={voicemail_id}")))?;

        let attached = UserEntity::find()
            .filter(UserColumn::Voicemailid.eq(voicemail_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count users of voicemail {}: {}", voicemail_id, e);
                DaoError::storage("voicemail", e)
            })?;
        if attached > 0 {
            return Err(DaoError::conflict(
                "voicemail",
                format!("still attached to {attached} user(s)"),
            ));
        }

        Entity::delete_by_id(voicemail_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to delete voicemail {}: {}", voicemail_id, e);
                DaoError::storage("voicemail", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to delete voicemail {}: {}", voicemail_id, e);
            DaoError::storage("voicemail", e)
        })?;

        let deleted = self.converter.to_model(&row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "voicemail", &deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use uuid::Uuid;

    use super::*;
    use crate::domain::common::entities::app_errors::ErrorKind;

    fn row(id: i32, fullname: &str) -> Model {
        Model {
            uniqueid: id,
            tenant_uuid: Uuid::nil(),
            fullname: fullname.to_string(),
            mailbox: "1000".to_string(),
            context: "default".to_string(),
            password: String::new(),
            email: None,
            language: None,
            commented: 0,
        }
    }

    fn repository(db: MockDatabase) -> PostgresVoicemailRepository {
        PostgresVoicemailRepository::new(db.into_connection()).unwrap()
    }

    #[tokio::test]
    async fn test_find_returns_none_where_get_errors() {
        let repository = repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<Model>::new(), Vec::<Model>::new()]),
        );

        assert_eq!(repository.find(42).await.unwrap(), None);

        let err = repository.get(42).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "voicemail not found (id=42)");
    }

    #[tokio::test]
    async fn test_get_maps_the_row() {
        let repository = repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row(42, "Ashton")]]),
        );

        let voicemail = repository.get(42).await.unwrap();
        assert_eq!(voicemail.id, 42);
        assert_eq!(voicemail.name, "Ashton");
        assert!(voicemail.enabled);
    }

    #[tokio::test]
    async fn test_create_validates_before_writing() {
        let repository = repository(MockDatabase::new(DatabaseBackend::Postgres));

        let voicemail = Voicemail::new(
            Uuid::nil(),
            String::new(),
            "1000".to_string(),
            "default".to_string(),
        );
        let err = repository.create(voicemail).await.unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory field: name");
    }

    #[tokio::test]
    async fn test_delete_refuses_while_a_user_is_attached() {
        let repository = repository(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row(42, "Ashton")]])
                .append_query_results([vec![BTreeMap::from([(
                    "num_items",
                    Value::BigInt(Some(1)),
                )])]]),
        );

        let err = repository.delete(42).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("still attached"));
    }
}
