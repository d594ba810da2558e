use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::extension::{entities::Extension, ports::ExtensionRepository};
use crate::entity::extensions::{ActiveModel, Column, Entity, Model};
use crate::entity::line_extension::{
    Column as LineExtensionColumn, Entity as LineExtensionEntity,
};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::extension::mappers;
use crate::infrastructure::mapping::Converter;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresExtensionRepository {
    pub db: DatabaseConnection,
    converter: Converter<Model, Extension>,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

// Tenancy of an extension derives from its context, so there is no tenant
// column to scope on.
fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "extension",
        [
            ("id", Column::Id),
            ("exten", Column::Exten),
            ("context", Column::Context),
            ("type", Column::Type),
            ("typeval", Column::Typeval),
        ],
        vec![Column::Exten, Column::Context],
        Column::Exten,
    )
}

impl PostgresExtensionRepository {
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
            id: Set(row.id),
            commented: Set(row.commented),
            context: Set(row.context),
            exten: Set(row.exten),
            r#type: Set(row.r#type),
            typeval: Set(row.typeval),
        }
    }
}

impl ExtensionRepository for PostgresExtensionRepository {
    async fn get(&self, extension_id: i32) -> Result<Extension, DaoError> {
        self.find(extension_id)
            .await?
            .ok_or_else(|| DaoError::not_found("extension", format!("id={extension_id}")))
    }

    async fn find(&self, extension_id: i32) -> Result<Option<Extension>, DaoError> {
        let row = Entity::find_by_id(extension_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<Extension, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(self.converter.to_model(&row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<Extension>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<Extension>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(|row| self.converter.to_model(&row)))
    }

    async fn create(&self, extension: Extension) -> Result<Extension, DaoError> {
        extension.check_mandatory()?;

        let mut active = Self::active_model(self.converter.to_source(&extension));
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create extension: {}", e);
                DaoError::storage("extension", e)
            })?;

        let created = self.converter.to_model(&created);
        notify(self.notifier.as_ref(), EventOp::Created, "extension", &created);
        Ok(created)
    }

    async fn edit(&self, extension: Extension) -> Result<Extension, DaoError> {
        extension.check_mandatory()?;

        let mut row = Entity::find_by_id(extension.id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch extension {}: {}", extension.id, e);
                DaoError::storage("extension", e)
            })?
            .ok_or_else(|| DaoError::not_found("extension", format!("id={}", extension.id)))?;
        self.converter.update_source(&mut row, &extension);

        let updated = Entity::update(Self::active_model(row))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit extension {}: {}", extension.id, e);
                DaoError::storage("extension", e)
            })?;

        let updated = self.converter.to_model(&updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "extension", &updated);
        Ok(updated)
    }

    async fn delete(&self, extension_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("extension", e)
        })?;

        let row = Entity::find_by_id(extension_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?
            .ok_or_else(|| DaoError::not_found("extension", format!("id={extension_id}")))?;

        let attached = LineExtensionEntity::find()
            .filter(LineExtensionColumn::ExtensionId.eq(extension_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count lines of extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?;
        if attached > 0 {
            return Err(DaoError::conflict(
                "extension",
                "still associated to a line",
            ));
        }

        Entity::delete_by_id(extension_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to delete extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to delete extension {}: {}", extension_id, e);
            DaoError::storage("extension", e)
        })?;

        let deleted = self.converter.to_model(&row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "extension", &deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;

    #[tokio::test]
    async fn test_create_rejects_invalid_exten_before_writing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repository = PostgresExtensionRepository::new(db).unwrap();

        let extension = Extension::new("12ab".to_string(), "default".to_string());
        let err = repository.create(extension).await.unwrap_err();
        assert!(err.to_string().contains("exten"));
    }
}
