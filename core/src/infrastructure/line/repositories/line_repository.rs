use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::error;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::generate_provisioning_code;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::line::{entities::Line, ports::LineRepository};
use crate::entity::endpoint_sip::Entity as EndpointSipEntity;
use crate::entity::linefeatures::{ActiveModel, Column, Entity, Model};
use crate::entity::user_line::{Column as UserLineColumn, Entity as UserLineEntity};
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresLineRepository {
    pub db: DatabaseConnection,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "line",
        [
            ("id", Column::Id),
            ("name", Column::Name),
            ("number", Column::Number),
            ("context", Column::Context),
            ("device_id", Column::Device),
            ("provisioning_code", Column::Provisioningid),
            ("description", Column::Description),
        ],
        vec![Column::Name, Column::Number, Column::Context, Column::Description],
        Column::Name,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresLineRepository {
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

    fn active_model(line: &Line) -> ActiveModel {
        ActiveModel {
            id: Set(line.id),
            tenant_uuid: Set(line.tenant_uuid),
            name: Set(line.name.clone()),
            number: Set(line.number.clone()),
            context: Set(line.context.clone()),
            device: Set(line.device_id.clone()),
            provisioningid: Set(line.provisioning_code),
            position: Set(line.position),
            commented: Set(i32::from(!line.enabled)),
            caller_id_name: Set(line.caller_id_name.clone()),
            caller_id_num: Set(line.caller_id_num.clone()),
            endpoint_sip_uuid: Set(line.endpoint_sip_uuid),
            endpoint_custom_uuid: Set(line.endpoint_custom_uuid),
            description: Set(line.description.clone()),
        }
    }

    async fn fetch(&self, line_id: i32) -> Result<Model, DaoError> {
        Entity::find_by_id(line_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))
    }
}

impl LineRepository for PostgresLineRepository {
    async fn get(&self, line_id: i32) -> Result<Line, DaoError> {
        self.find(line_id)
            .await?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))
    }

    async fn find(&self, line_id: i32) -> Result<Option<Line>, DaoError> {
        let row = Entity::find_by_id(line_id).one(&self.db).await.map_err(|e| {
            error!("failed to fetch line {}: {}", line_id, e);
            DaoError::storage("line", e)
        })?;
        Ok(row.map(Line::from))
    }

    async fn get_by(&self, criteria: Criteria) -> Result<Line, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(Line::from(row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<Line>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(Line::from))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<Line>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(Line::from))
    }

    async fn create(&self, mut line: Line) -> Result<Line, DaoError> {
        line.check_mandatory()?;
        if line.provisioning_code == 0 {
            line.provisioning_code = generate_provisioning_code();
        }

        let mut active = Self::active_model(&line);
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create line: {}", e);
                DaoError::storage("line", e)
            })?;

        let created = Line::from(created);
        notify(self.notifier.as_ref(), EventOp::Created, "line", &created);
        Ok(created)
    }

    async fn edit(&self, line: Line) -> Result<Line, DaoError> {
        line.check_mandatory()?;
        self.fetch(line.id).await?;

        let updated = Entity::update(Self::active_model(&line))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit line {}: {}", line.id, e);
                DaoError::storage("line", e)
            })?;

        let updated = Line::from(updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "line", &updated);
        Ok(updated)
    }

    async fn delete(&self, line_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("line", e)
        })?;

        let row = Entity::find_by_id(line_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))?;

        let attached = UserLineEntity::find()
            .filter(UserLineColumn::LineId.eq(line_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count users of line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;
        if attached > 0 {
            return Err(DaoError::conflict(
                "line",
                format!("still associated to {attached} user(s)"),
            ));
        }

        Entity::delete_by_id(line_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to delete line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to delete line {}: {}", line_id, e);
            DaoError::storage("line", e)
        })?;

        let deleted = Line::from(row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "line", &deleted);
        Ok(())
    }

    async fn associate_endpoint_sip(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("line", e)
        })?;

        let mut row = Entity::find_by_id(line_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))?;

        if row.endpoint_sip_uuid == Some(endpoint_uuid) {
            return Ok(());
        }
        if row.endpoint_custom_uuid.is_some() {
            return Err(DaoError::conflict(
                "line",
                "a custom endpoint is already associated",
            ));
        }
        if row.endpoint_sip_uuid.is_some() {
            return Err(DaoError::conflict(
                "line",
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

        let already_used = Entity::find()
            .filter(Column::EndpointSipUuid.eq(endpoint_uuid))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to check endpoint {}: {}", endpoint_uuid, e);
                DaoError::storage("endpoint_sip", e)
            })?;
        if already_used.is_some() {
            return Err(DaoError::conflict(
                "endpoint_sip",
                "already associated to another line",
            ));
        }

        row.endpoint_sip_uuid = Some(endpoint_uuid);
        let updated = Entity::update(Self::active_model(&Line::from(&row)))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to associate endpoint to line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to associate endpoint to line {}: {}", line_id, e);
            DaoError::storage("line", e)
        })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "line", &Line::from(updated));
        Ok(())
    }

    async fn dissociate_endpoint_sip(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(line_id).await?;
        if row.endpoint_sip_uuid != Some(endpoint_uuid) {
            return Err(DaoError::conflict("line", "endpoint is not associated"));
        }

        row.endpoint_sip_uuid = None;
        let updated = Entity::update(Self::active_model(&Line::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to dissociate endpoint from line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "line", &Line::from(updated));
        Ok(())
    }

    async fn associate_endpoint_custom(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(line_id).await?;

        if row.endpoint_custom_uuid == Some(endpoint_uuid) {
            return Ok(());
        }
        if row.endpoint_sip_uuid.is_some() {
            return Err(DaoError::conflict(
                "line",
                "a sip endpoint is already associated",
            ));
        }
        if row.endpoint_custom_uuid.is_some() {
            return Err(DaoError::conflict(
                "line",
                "a custom endpoint is already associated",
            ));
        }

        row.endpoint_custom_uuid = Some(endpoint_uuid);
        let updated = Entity::update(Self::active_model(&Line::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to associate endpoint to line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "line", &Line::from(updated));
        Ok(())
    }

    async fn dissociate_endpoint_custom(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> Result<(), DaoError> {
        let mut row = self.fetch(line_id).await?;
        if row.endpoint_custom_uuid != Some(endpoint_uuid) {
            return Err(DaoError::conflict("line", "endpoint is not associated"));
        }

        row.endpoint_custom_uuid = None;
        let updated = Entity::update(Self::active_model(&Line::from(&row)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to dissociate endpoint from line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "line", &Line::from(updated));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;

    fn line_row(id: i32) -> Model {
        Model {
            id,
            tenant_uuid: Uuid::nil(),
            context: "default".to_string(),
            provisioningid: 123456,
            position: 1,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_two_endpoint_types_cannot_share_a_line() {
        let mut row = line_row(3);
        row.endpoint_custom_uuid = Some(Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let repository = PostgresLineRepository::new(db);

        let err = repository
            .associate_endpoint_sip(3, Uuid::new_v4())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "line: a custom endpoint is already associated");
    }

    #[tokio::test]
    async fn test_create_rejects_missing_context() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repository = PostgresLineRepository::new(db);

        let line = Line::new(Uuid::nil(), String::new());
        let err = repository.create(line).await.unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory field: context");
    }
}
