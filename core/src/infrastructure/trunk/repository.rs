use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use tracing::error;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::trunk::{entities::Trunk, ports::TrunkRepository};
use crate::entity::endpoint_sip::Entity as EndpointSipEntity;
use crate::entity::linefeatures::{Column as LineColumn, Entity as LineEntity};
use crate::entity::trunkfeatures::{ActiveModel, Column, Entity, Model};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresTrunkRepository {
    pub db: DatabaseConnection,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "trunk",
        [
            ("id", Column::Id),
            ("context", Column::Context),
            ("description", Column::Description),
        ],
        vec![Column::Context, Column::Description],
        Column::Id,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresTrunkRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: search_config(),
            notifier: Arc::new(TracingEventPublisher),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn EventPublisher>) -> Self {
        self.notifier = notifier;
        self
    }

    fn active_model(trunk: &Trunk) -> ActiveModel {
        ActiveModel {
            id: Set(trunk.id),
            tenant_uuid: Set(trunk.tenant_uuid),
            context: Set(trunk.context.clone()),
            description: Set(trunk.description.clone()),
            commented: Set(i32::from(!trunk.enabled)),
            endpoint_sip_uuid: Set(trunk.endpoint_sip_uuid),
            endpoint_custom_uuid: Set(trunk.endpoint_custom_uuid),
        }
    }

    async fn fetch(&self, trunk_id: i32) -> Result<Model, DaoError> {
        Entity::find_by_id(trunk_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?
            .ok_or_else(|| DaoError::not_found("trunk", format!("id={trunk_id}")))
    }
}

impl TrunkRepository for PostgresTrunkRepository {
    async fn get(&self, trunk_id: i32) -> Result<Trunk, DaoError> {
        self.find(trunk_id)
            .await?
            .ok_or_else(|| DaoError::not_found("trunk", format!("id={trunk_id}")))
    }

    async fn find(&self, trunk_id: i32) -> Result<Option<Trunk>, DaoError> {
        let row = Entity::find_by_id(trunk_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;
        Ok(row.map(Trunk::from))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<Trunk, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(Trunk::from(row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<Trunk>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(Trunk::from))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<Trunk>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(Trunk::from))
    }

    async fn create(&self, trunk: Trunk) -> Result<Trunk, DaoError> {
        let mut active = Self::active_model(&trunk);
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create trunk: {}", e);
                DaoError::storage("trunk", e)
            })?;

        let created = Trunk::from(created);
        notify(self.notifier.as_ref(), EventOp::Created, "trunk", &created);
        Ok(created)
    }

    async fn edit(&self, trunk: Trunk) -> Result<Trunk, DaoError> {
        self.fetch(trunk.id).await?;

        let updated = Entity::update(Self::active_model(&trunk))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit trunk {}: {}", trunk.id, e);
                DaoError::storage("trunk", e)
            })?;

        let updated = Trunk::from(updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "trunk", &updated);
        Ok(updated)
    }

    async fn delete(&self, trunk_id: i32) -> Result<(), DaoError> {
        let row = self.fetch(trunk_id).await?;

        Entity::delete_by_id(trunk_id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to delete trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;

        let deleted = Trunk::from(row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "trunk", &deleted);
        Ok(())
    }

    async fn associate_endpoint_sip(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("trunk", e)
        })?;

        let mut row = Entity::find_by_id(trunk_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?
            .ok_or_else(|| DaoError::not_found("trunk", format!("id={trunk_id}")))?;

        if row.endpoint_sip_uuid == Some(endpoint_uuid) {
            return Ok(());
        }
        if row.endpoint_custom_uuid.is_some() {
            return Err(DaoError::conflict(
                "trunk",
                "a custom endpoint is already associated",
            ));
        }
        if row.endpoint_sip_uuid.is_some() {
            return Err(DaoError::conflict(
                "trunk",
                "a sip endpoint is already associated",
            ));
        }

        EndpointSipEntity::find_by_id(endpoint_uuid)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch endpoint {}: {}", endpoint_uuid, e);
                DaoError::storage("endpoint_sip", e)
            })?
            .ok_or_else(|| DaoError::not_found("endpoint_sip", format!("uuid={endpoint_uuid}")))?;

        let used_by_line = LineEntity::find()
            .filter(LineColumn::EndpointSipUuid.eq(endpoint_uuid))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to check endpoint {}: {}", endpoint_uuid, e);
                DaoError::storage("endpoint_sip", e)
            })?;
        if used_by_line.is_some() {
            return Err(DaoError::conflict(
                "endpoint_sip",
                "already associated to a line",
            ));
        }

        row.endpoint_sip_uuid = Some(endpoint_uuid);
        let updated = Entity::update(Self::active_model(&Trunk::from(&row)))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to associate endpoint to trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to associate endpoint to trunk {}: {}", trunk_id, e);
            DaoError::storage("trunk", e)
        })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "trunk", &Trunk::from(updated));
        Ok(())
    }

    async fn dissociate_endpoint_sip(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(trunk_id).await?;
        if row.endpoint_sip_uuid != Some(endpoint_uuid) {
            return Err(DaoError::conflict("trunk", "endpoint is not associated"));
        }

        row.endpoint_sip_uuid = None;
        let updated = Entity::update(Self::active_model(&Trunk::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to dissociate endpoint from trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "trunk", &Trunk::from(updated));
        Ok(())
    }

    async fn associate_endpoint_custom(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(trunk_id).await?;

        if row.endpoint_custom_uuid == Some(endpoint_uuid) {
            return Ok(());
        }
        if row.endpoint_sip_uuid.is_some() {
            return Err(DaoError::conflict(
                "trunk",
                "a sip endpoint is already associated",
            ));
        }
        if row.endpoint_custom_uuid.is_some() {
            return Err(DaoError::conflict(
                "trunk",
                "a custom endpoint is already associated",
            ));
        }

        row.endpoint_custom_uuid = Some(endpoint_uuid);
        let updated = Entity::update(Self::active_model(&Trunk::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to associate endpoint to trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "trunk", &Trunk::from(updated));
        Ok(())
    }

    async fn dissociate_endpoint_custom(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(trunk_id).await?;
        if row.endpoint_custom_uuid != Some(endpoint_uuid) {
            return Err(DaoError::conflict("trunk", "endpoint is not associated"));
        }

        row.endpoint_custom_uuid = None;
        let updated = Entity::update(Self::active_model(&Trunk::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to dissociate endpoint from trunk {}: {}", trunk_id, e);
                DaoError::storage("trunk", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "trunk", &Trunk::from(updated));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;

    fn trunk_row(id: i32) -> Model {
        Model {
            id,
            tenant_uuid: Uuid::nil(),
            context: Some("to-extern".to_string()),
            description: None,
            commented: 0,
            endpoint_sip_uuid: None,
            endpoint_custom_uuid: None,
        }
    }

    #[tokio::test]
    async fn test_two_endpoint_types_cannot_share_a_trunk() {
        let mut row = trunk_row(3);
        row.endpoint_custom_uuid = Some(Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let repository = PostgresTrunkRepository::new(db);

        let err = repository
            .associate_endpoint_sip(3, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "trunk: a custom endpoint is already associated");
    }
}
