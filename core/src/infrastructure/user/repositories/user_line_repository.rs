use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::user::{entities::UserLine, ports::UserLineRepository};
use crate::entity::line_extension::{
    Column as LineExtensionColumn, Entity as LineExtensionEntity,
};
use crate::entity::linefeatures::Entity as LineEntity;
use crate::entity::user_line::{ActiveModel, Column, Entity, Model};
use crate::entity::userfeatures::Entity as UserEntity;
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::fixes::{ExtensionFixer, UserFixer};

#[derive(Clone)]
pub struct PostgresUserLineRepository {
    pub db: DatabaseConnection,
    notifier: Arc<dyn EventPublisher>,
}

impl PostgresUserLineRepository {
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

    /// The extensions of a line point at the line's main user, so both
    /// mutations below refresh them.
    async fn fix_extensions_of_line(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        line_id: i32,
    ) -> Result<(), DaoError> {
        let associations = LineExtensionEntity::find()
            .filter(LineExtensionColumn::LineId.eq(line_id))
            .all(txn)
            .await
            .map_err(|e| {
                error!("failed to fetch extensions of line {}: {}", line_id, e);
                DaoError::storage("line_extension", e)
            })?;
        let fixer = ExtensionFixer::new(txn);
        for association in associations {
            fixer.fix(association.extension_id).await?;
        }
        Ok(())
    }
}

impl UserLineRepository for PostgresUserLineRepository {
    async fn associate(&self, user_id: i32, line_id: i32) -> Result<UserLine, DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("user_line", e)
        })?;

        UserEntity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))?;

        LineEntity::find_by_id(line_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))?;

        let existing = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::LineId.eq(line_id))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to check association: {}", e);
                DaoError::storage("user_line", e)
            })?;
        if existing.is_some() {
            return Err(DaoError::conflict("user_line", "already associated"));
        }

        // First user on the line owns it; first line of a user is its main.
        let line_has_users = Entity::find()
            .filter(Column::LineId.eq(line_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count users of line {}: {}", line_id, e);
                DaoError::storage("user_line", e)
            })?
            > 0;
        let user_has_lines = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count lines of user {}: {}", user_id, e);
                DaoError::storage("user_line", e)
            })?
            > 0;

        let created = Entity::insert(ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            line_id: Set(line_id),
            main_user: Set(!line_has_users),
            main_line: Set(!user_has_lines),
        })
        .exec_with_returning(&txn)
        .await
        .map_err(|e| {
            error!("failed to associate user {} to line {}: {}", user_id, line_id, e);
            DaoError::storage("user_line", e)
        })?;

        UserFixer::new(&txn).fix(user_id).await?;
        self.fix_extensions_of_line(&txn, line_id).await?;

        txn.commit().await.map_err(|e| {
            error!("failed to associate user {} to line {}: {}", user_id, line_id, e);
            DaoError::storage("user_line", e)
        })?;

        let created = UserLine::from(created);
        notify(self.notifier.as_ref(), EventOp::Created, "user_line", &created);
        Ok(created)
    }

    async fn dissociate(&self, user_id: i32, line_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("user_line", e)
        })?;

        let row = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::LineId.eq(line_id))
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch association: {}", e);
                DaoError::storage("user_line", e)
            })?
            .ok_or_else(|| {
                DaoError::not_found("user_line", format!("user_id={user_id}, line_id={line_id}"))
            })?;

        if row.main_user {
            let others = Entity::find()
                .filter(Column::LineId.eq(line_id))
                .filter(Column::UserId.ne(user_id))
                .count(&txn)
                .await
                .map_err(|e| {
                    error!("failed to count users of line {}: {}", line_id, e);
                    DaoError::storage("user_line", e)
                })?;
            if others > 0 {
                return Err(DaoError::conflict(
                    "user_line",
                    "secondary users are still associated to the line",
                ));
            }
        }

        Entity::delete_by_id(row.id).exec(&txn).await.map_err(|e| {
            error!("failed to dissociate user {} from line {}: {}", user_id, line_id, e);
            DaoError::storage("user_line", e)
        })?;

        UserFixer::new(&txn).fix(user_id).await?;
        self.fix_extensions_of_line(&txn, line_id).await?;

        txn.commit().await.map_err(|e| {
            error!("failed to dissociate user {} from line {}: {}", user_id, line_id, e);
            DaoError::storage("user_line", e)
        })?;

        notify(
            self.notifier.as_ref(),
            EventOp::Deleted,
            "user_line",
            &UserLine::from(row),
        );
        Ok(())
    }

    async fn find_all_by_user(&self, user_id: i32) -> Result<Vec<UserLine>, DaoError> {
        let rows = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch lines of user {}: {}", user_id, e);
                DaoError::storage("user_line", e)
            })?;
        Ok(rows.iter().map(UserLine::from).collect())
    }

    async fn find_all_by_line(&self, line_id: i32) -> Result<Vec<UserLine>, DaoError> {
        let rows = Entity::find()
            .filter(Column::LineId.eq(line_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch users of line {}: {}", line_id, e);
                DaoError::storage("user_line", e)
            })?;
        Ok(rows.iter().map(UserLine::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::domain::common::entities::app_errors::ErrorKind;

    fn association(user_id: i32, line_id: i32, main_user: bool) -> Model {
        Model {
            id: 1,
            user_id,
            line_id,
            main_user,
            main_line: true,
        }
    }

    #[tokio::test]
    async fn test_main_user_cannot_leave_while_secondaries_remain() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![association(7, 3, true)]])
            .append_query_results([vec![std::collections::BTreeMap::from([(
                "num_items",
                sea_orm::Value::BigInt(Some(2)),
            )])]])
            .into_connection();
        let repository = PostgresUserLineRepository::new(db);

        let err = repository.dissociate(7, 3).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
        assert!(err.to_string().contains("secondary users"));
    }
}
