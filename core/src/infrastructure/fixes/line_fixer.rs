use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, error};

use crate::domain::common::entities::app_errors::DaoError;
use crate::entity::extensions::Entity as ExtensionEntity;
use crate::entity::line_extension::{Column as LineExtensionColumn, Entity as LineExtensionEntity};
use crate::entity::linefeatures::{Column as LineColumn, Entity as LineEntity};

pub struct LineFixer<'c, C: ConnectionTrait> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> LineFixer<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Overwrite the line's denormalized number, context and caller id
    /// number from its current main extension. A line without a main
    /// extension loses its number and keeps its own context.
    pub async fn fix(&self, line_id: i32) -> Result<(), DaoError> {
        let line = LineEntity::find_by_id(line_id)
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?
            .ok_or_else(|| DaoError::not_found("line", format!("id={line_id}")))?;

        let main = LineExtensionEntity::find()
            .filter(LineExtensionColumn::LineId.eq(line_id))
            .filter(LineExtensionColumn::MainExtension.eq(true))
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch main extension of line {}: {}", line_id, e);
                DaoError::storage("line_extension", e)
            })?;

        let extension = match main {
            Some(association) => ExtensionEntity::find_by_id(association.extension_id)
                .one(self.conn)
                .await
                .map_err(|e| {
                    error!("failed to fetch extension: {}", e);
                    DaoError::storage("extension", e)
                })?,
            None => None,
        };

        let (number, context) = match &extension {
            Some(extension) => (Some(extension.exten.clone()), extension.context.clone()),
            None => (None, line.context.clone()),
        };
        debug!("fixing line {}: number={:?} context={}", line_id, number, context);

        LineEntity::update_many()
            .col_expr(LineColumn::Number, Expr::value(number.clone()))
            .col_expr(LineColumn::CallerIdNum, Expr::value(number))
            .col_expr(LineColumn::Context, Expr::value(context))
            .filter(LineColumn::Id.eq(line_id))
            .exec(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fix line {}: {}", line_id, e);
                DaoError::storage("line", e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::line_extension;
    use crate::entity::linefeatures;

    fn line_row(id: i32) -> linefeatures::Model {
        linefeatures::Model {
            id,
            context: "default".to_string(),
            provisioningid: 123456,
            position: 1,
            number: Some("1000".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_line_without_main_extension_loses_its_number() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![line_row(3)]])
            .append_query_results([Vec::<line_extension::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        LineFixer::new(&db).fix(3).await.unwrap();

        let log = db.into_transaction_log();
        let update = format!("{:?}", log.last().unwrap());
        assert!(update.contains("UPDATE"));
        assert!(update.contains("number"));
    }

    #[tokio::test]
    async fn test_missing_line_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<linefeatures::Model>::new()])
            .into_connection();

        let err = LineFixer::new(&db).fix(3).await.unwrap_err();
        assert_eq!(err.to_string(), "line not found (id=3)");
    }
}
