use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::line::{entities::LineExtension, ports::LineExtensionRepository};
use crate::entity::extensions::Entity as ExtensionEntity;
use crate::entity::line_extension::{ActiveModel, Column, Entity, Model};
use crate::entity::linefeatures::Entity as LineEntity;
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::fixes::{ExtensionFixer, LineFixer};

#[derive(Clone)]
pub struct PostgresLineExtensionRepository {
    pub db: DatabaseConnection,
    notifier: Arc<dyn EventPublisher>,
}

impl PostgresLineExtensionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            notifier: Arc::new(TracingEventPublisher),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn EventPublisher>) -> Self {
        self.notifier = notifier;
        self
    }
}

impl LineExtensionRepository for PostgresLineExtensionRepository {
    async fn associate(&self, line_id: i32, extension_id: i32) -> Result<LineExtension, DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("line_extension", e)
        })?;

        LineEntity::find_by_id(line_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))?;

        ExtensionEntity::find_by_id(extension_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?
            .ok_or_else(|| DaoError::not_found("extension", format!("id={extension_id}")))?;

        let existing = Entity::find()
            .filter(Column::ExtensionId.eq(extension_id))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to check extension {}: {}", extension_id, e);
                DaoError::storage("line_extension", e)
            })?;
        if let Some(existing) = existing {
            let reason = if existing.line_id == line_id {
                "already associated to this line"
            } else {
                "already associated to another line"
            };
            return Err(DaoError::conflict("extension", reason));
        }

        // The first extension of a line becomes its main extension.
        let has_main = Entity::find()
            .filter(Column::LineId.eq(line_id))
            .filter(Column::MainExtension.eq(true))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count extensions of line {}: {}", line_id, e);
                DaoError::storage("line_extension", e)
            })?
            > 0;

        let created = Entity::insert(ActiveModel {
            id: NotSet,
            line_id: Set(line_id),
            extension_id: Set(extension_id),
            main_extension: Set(!has_main),
        })
        .exec_with_returning(&txn)
        .await
        .map_err(|e| {
            error!("failed to associate extension {} to line {}: {}", extension_id, line_id, e);
            DaoError::storage("line_extension", e)
        })?;

        LineFixer::new(&txn).fix(line_id).await?;
        ExtensionFixer::new(&txn).fix(extension_id).await?;

        txn.commit().await.map_err(|e| {
            error!("failed to associate extension {} to line {}: {}", extension_id, line_id, e);
            DaoError::storage("line_extension", e)
        })?;

        let created = LineExtension::from(created);
        notify(self.notifier.as_ref(), EventOp::Created, "line_extension", &created);
        Ok(created)
    }

    async fn dissociate(&self, line_id: i32, extension_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("line_extension", e)
        })?;

        let row = Entity::find()
            .filter(Column::LineId.eq(line_id))
            .filter(Column::ExtensionId.eq(extension_id))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch association: {}", e);
                DaoError::storage("line_extension", e)
            })?
            .ok_or_else(|| {
                DaoError::not_found(
                    "line_extension",
                    format!("line_id={line_id}, extension_id={extension_id}"),
                )
            })?;

        Entity::delete_by_id(row.id).exec(&txn).await.map_err(|e| {
            error!("failed to dissociate extension {} from line {}: {}", extension_id, line_id, e);
            DaoError::storage("line_extension", e)
        })?;

        LineFixer::new(&txn).fix(line_id).await?;
        ExtensionFixer::new(&txn).fix(extension_id).await?;

        txn.commit().await.map_err(|e| {
            error!("failed to dissociate extension {} from line {}: {}", extension_id, line_id, e);
            DaoError::storage("line_extension", e)
        })?;

        notify(
            self.notifier.as_ref(),
            EventOp::Deleted,
            "line_extension",
            &LineExtension::from(row),
        );
        Ok(())
    }

    async fn find_all_by_line(&self, line_id: i32) -> Result<Vec<LineExtension>, DaoError> {
        let rows = Entity::find()
            .filter(Column::LineId.eq(line_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch extensions of line {}: {}", line_id, e);
                DaoError::storage("line_extension", e)
            })?;
        Ok(rows.iter().map(LineExtension::from).collect())
    }

    async fn find_by_extension(&self, extension_id: i32) -> Result<Option<LineExtension>, DaoError> {
        let row = Entity::find()
            .filter(Column::ExtensionId.eq(extension_id))
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch line of extension {}: {}", extension_id, e);
                DaoError::storage("line_extension", e)
            })?;
        Ok(row.map(LineExtension::from))
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::entity::linefeatures;

    #[tokio::test]
    async fn test_associate_requires_an_existing_line() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<linefeatures::Model>::new()])
            .into_connection();
        let repository = PostgresLineExtensionRepository::new(db);

        let err = repository.associate(3, 4).await.unwrap_err();
        assert_eq!(err.to_string(), "line not found (id=3)");
    }

    #[tokio::test]
    async fn test_dissociate_unknown_pair_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new()])
            .into_connection();
        let repository = PostgresLineExtensionRepository::new(db);

        let err = repository.dissociate(3, 4).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "line_extension not found (line_id=3, extension_id=4)"
        );
    }
}
