use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::context::{entities::Context, ports::ContextRepository};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::entity::context::{ActiveModel, Column, Entity, Model};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::context::mappers;
use crate::infrastructure::mapping::Converter;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresContextRepository {
    pub db: DatabaseConnection,
    converter: Converter<Model, Context>,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "context",
        [
            ("id", Column::Id),
            ("uuid", Column::Uuid),
            ("name", Column::Name),
            ("label", Column::Displayname),
            ("type", Column::Contexttype),
            ("description", Column::Description),
        ],
        vec![Column::Name, Column::Displayname, Column::Description],
        Column::Name,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresContextRepository {
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
            uuid: Set(row.uuid),
            tenant_uuid: Set(row.tenant_uuid),
            name: Set(row.name),
            displayname: Set(row.displayname),
            contexttype: Set(row.contexttype),
            description: Set(row.description),
            commented: Set(row.commented),
        }
    }
}

impl ContextRepository for PostgresContextRepository {
    async fn get(&self, context_id: i32) -> Result<Context, DaoError> {
        self.find(context_id)
            .await?
            .ok_or_else(|| DaoError::not_found("context", format!("id={context_id}")))
    }

    async fn find(&self, context_id: i32) -> Result<Option<Context>, DaoError> {
        let row = Entity::find_by_id(context_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch context {}: {}", context_id, e);
                DaoError::storage("context", e)
            })?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<Context, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(self.converter.to_model(&row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<Context>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<Context>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(|row| self.converter.to_model(&row)))
    }

    async fn create(&self, context: Context) -> Result<Context, DaoError> {
        context.check_mandatory()?;

        let mut active = Self::active_model(self.converter.to_source(&context));
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create context: {}", e);
                DaoError::storage("context", e)
            })?;

        let created = self.converter.to_model(&created);
        notify(self.notifier.as_ref(), EventOp::Created, "context", &created);
        Ok(created)
    }

    async fn edit(&self, context: Context) -> Result<Context, DaoError> {
        context.check_mandatory()?;

        let mut row = Entity::find_by_id(context.id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch context {}: {}", context.id, e);
                DaoError::storage("context", e)
            })?
            .ok_or_else(|| DaoError::not_found("context", format!("id={}", context.id)))?;
        self.converter.update_source(&mut row, &context);

        let updated = Entity::update(Self::active_model(row))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit context {}: {}", context.id, e);
                DaoError::storage("context", e)
            })?;

        let updated = self.converter.to_model(&updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "context", &updated);
        Ok(updated)
    }

    async fn delete(&self, context_id: i32) -> Result<(), DaoError> {
        let row = Entity::find_by_id(context_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch context {}: {}", context_id, e);
                DaoError::storage("context", e)
            })?
            .ok_or_else(|| DaoError::not_found("context", format!("id={context_id}")))?;

        Entity::delete_by_id(context_id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to delete context {}: {}", context_id, e);
                DaoError::storage("context", e)
            })?;

        let deleted = self.converter.to_model(&row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "context", &deleted);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;
    use crate::domain::context::entities::ContextType;

    #[tokio::test]
    async fn test_create_validates_before_writing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repository = PostgresContextRepository::new(db).unwrap();

        let context = Context::new(Uuid::nil(), String::new(), ContextType::Internal);
        let err = repository.create(context).await.unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory field: name");
    }

    #[tokio::test]
    async fn test_find_on_empty_table() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let repository = PostgresContextRepository::new(db).unwrap();

        assert_eq!(repository.find(42).await.unwrap(), None);
    }
}
