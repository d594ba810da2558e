use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{DatabaseConnection, EntityTrait};
use tracing::error;

use crate::domain::call_permission::{entities::CallPermission, ports::CallPermissionRepository};
use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::entity::rightcall::{ActiveModel, Column, Entity, Model};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::call_permission::mappers;
use crate::infrastructure::mapping::Converter;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresCallPermissionRepository {
    pub db: DatabaseConnection,
    converter: Converter<Model, CallPermission>,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "call_permission",
        [
            ("id", Column::Id),
            ("name", Column::Name),
            ("description", Column::Description),
        ],
        vec![Column::Name, Column::Description],
        Column::Name,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresCallPermissionRepository {
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
            tenant_uuid: Set(row.tenant_uuid),
            name: Set(row.name),
            passwd: Set(row.passwd),
            authorization: Set(row.authorization),
            description: Set(row.description),
            commented: Set(row.commented),
        }
    }
}

impl CallPermissionRepository for PostgresCallPermissionRepository {
    async fn get(&self, call_permission_id: i32) -> Result<CallPermission, DaoError> {
        self.find(call_permission_id).await?.ok_or_else(|| {
            DaoError::not_found("call_permission", format!("id={call_permission_id}"))
        })
    }

    async fn find(&self, call_permission_id: i32) -> Result<Option<CallPermission>, DaoError> {
        let row = Entity::find_by_id(call_permission_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch call permission {}: {}", call_permission_id, e);
                DaoError::storage("call_permission", e)
            })?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<CallPermission, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(self.converter.to_model(&row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<CallPermission>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(|row| self.converter.to_model(&row)))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<CallPermission>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(|row| self.converter.to_model(&row)))
    }

    async fn create(&self, call_permission: CallPermission) -> Result<CallPermission, DaoError> {
        call_permission.check_mandatory()?;

        let mut active = Self::active_model(self.converter.to_source(&call_permission));
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create call permission: {}", e);
                DaoError::storage("call_permission", e)
            })?;

        let created = self.converter.to_model(&created);
        notify(self.notifier.as_ref(), EventOp::Created, "call_permission", &created);
        Ok(created)
    }

    async fn edit(&self, call_permission: CallPermission) -> Result<CallPermission, DaoError> {
        call_permission.check_mandatory()?;

        let mut row = Entity::find_by_id(call_permission.id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch call permission {}: {}", call_permission.id, e);
                DaoError::storage("call_permission", e)
            })?
            .ok_or_else(|| {
                DaoError::not_found("call_permission", format!("id={}", call_permission.id))
            })?;
        self.converter.update_source(&mut row, &call_permission);

        let updated = Entity::update(Self::active_model(row))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit call permission {}: {}", call_permission.id, e);
                DaoError::storage("call_permission", e)
            })?;

        let updated = self.converter.to_model(&updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "call_permission", &updated);
        Ok(updated)
    }

    async fn delete(&self, call_permission_id: i32) -> Result<(), DaoError> {
        let row = Entity::find_by_id(call_permission_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch call permission {}: {}", call_permission_id, e);
                DaoError::storage("call_permission", e)
            })?
            .ok_or_else(|| {
                DaoError::not_found("call_permission", format!("id={call_permission_id}"))
            })?;

        Entity::delete_by_id(call_permission_id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to delete call permission {}: {}", call_permission_id, e);
                DaoError::storage("call_permission", e)
            })?;

        let deleted = self.converter.to_model(&row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "call_permission", &deleted);
        Ok(())
    }
}
