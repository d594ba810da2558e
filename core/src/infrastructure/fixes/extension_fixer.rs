use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, error};

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::extension::entities::UNATTACHED;
use crate::entity::extensions::{Column as ExtensionColumn, Entity as ExtensionEntity};
use crate::entity::line_extension::{Column as LineExtensionColumn, Entity as LineExtensionEntity};
use crate::entity::user_line::{Column as UserLineColumn, Entity as UserLineEntity};

pub struct ExtensionFixer<'c, C: ConnectionTrait> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> ExtensionFixer<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Point the extension at the main user of the line it is attached to.
    /// Unattached extensions, and extensions on a line without users, fall
    /// back to `type = "user", typeval = "0"`.
    pub async fn fix(&self, extension_id: i32) -> Result<(), DaoError> {
        ExtensionEntity::find_by_id(extension_id)
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?
            .ok_or_else(|| DaoError::not_found("extension", format!("id={extension_id}")))?;

        let association = LineExtensionEntity::find()
            .filter(LineExtensionColumn::ExtensionId.eq(extension_id))
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch line of extension {}: {}", extension_id, e);
                DaoError::storage("line_extension", e)
            })?;

        let typeval = match association {
            Some(association) => {
                let main_user = UserLineEntity::find()
                    .filter(UserLineColumn::LineId.eq(association.line_id))
                    .filter(UserLineColumn::MainUser.eq(true))
                    .one(self.conn)
                    .await
                    .map_err(|e| {
                        error!("failed to fetch main user of line {}: {}", association.line_id, e);
                        DaoError::storage("user_line", e)
                    })?;
                match main_user {
                    Some(user_line) => user_line.user_id.to_string(),
                    None => UNATTACHED.to_string(),
                }
            }
            None => UNATTACHED.to_string(),
        };
        debug!("fixing extension {}: typeval={}", extension_id, typeval);

        ExtensionEntity::update_many()
            .col_expr(ExtensionColumn::Type, Expr::value("user"))
            .col_expr(ExtensionColumn::Typeval, Expr::value(typeval))
            .filter(ExtensionColumn::Id.eq(extension_id))
            .exec(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fix extension {}: {}", extension_id, e);
                DaoError::storage("extension", e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::extensions;
    use crate::entity::line_extension;
    use crate::entity::user_line;

    fn extension_row(id: i32) -> extensions::Model {
        extensions::Model {
            id,
            commented: 0,
            context: "default".to_string(),
            exten: "1000".to_string(),
            r#type: "user".to_string(),
            typeval: "7".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unattached_extension_resets_to_sentinel() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![extension_row(4)]])
            .append_query_results([Vec::<line_extension::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        ExtensionFixer::new(&db).fix(4).await.unwrap();
    }

    #[tokio::test]
    async fn test_attached_extension_points_at_the_main_user() {
        let association = line_extension::Model {
            id: 1,
            line_id: 9,
            extension_id: 4,
            main_extension: true,
        };
        let main_user = user_line::Model {
            id: 1,
            user_id: 7,
            line_id: 9,
            main_user: true,
            main_line: true,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![extension_row(4)]])
            .append_query_results([vec![association]])
            .append_query_results([vec![main_user]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        ExtensionFixer::new(&db).fix(4).await.unwrap();
    }
}
