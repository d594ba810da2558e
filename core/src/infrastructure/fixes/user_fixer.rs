use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::{debug, error};

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::user::entities::caller_id_for;
use crate::entity::endpoint_sip::{Column as EndpointSipColumn, Entity as EndpointSipEntity};
use crate::entity::linefeatures::Entity as LineEntity;
use crate::entity::user_line::{Column as UserLineColumn, Entity as UserLineEntity};
use crate::entity::userfeatures::{Column as UserColumn, Entity as UserEntity};

pub struct UserFixer<'c, C: ConnectionTrait> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> UserFixer<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    /// Recompute the user's caller id from the current name and main line,
    /// and propagate it to the SIP endpoint of that line when there is one.
    pub async fn fix(&self, user_id: i32) -> Result<(), DaoError> {
        let user = UserEntity::find_by_id(user_id)
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))?;

        let main_line = UserLineEntity::find()
            .filter(UserLineColumn::UserId.eq(user_id))
            .filter(UserLineColumn::MainLine.eq(true))
            .one(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fetch main line of user {}: {}", user_id, e);
                DaoError::storage("user_line", e)
            })?;

        let line = match main_line {
            Some(user_line) => LineEntity::find_by_id(user_line.line_id)
                .one(self.conn)
                .await
                .map_err(|e| {
                    error!("failed to fetch line: {}", e);
                    DaoError::storage("line", e)
                })?,
            None => None,
        };

        let fullname = fullname_of(&user.firstname, &user.lastname);
        let number = line.as_ref().and_then(|line| line.number.clone());
        let caller_id = caller_id_for(&fullname, number.as_deref());
        debug!("fixing user {}: callerid={}", user_id, caller_id);

        UserEntity::update_many()
            .col_expr(UserColumn::Callerid, Expr::value(caller_id.clone()))
            .filter(UserColumn::Id.eq(user_id))
            .exec(self.conn)
            .await
            .map_err(|e| {
                error!("failed to fix user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?;

        if let Some(line) = line
            && let Some(endpoint_uuid) = line.endpoint_sip_uuid
        {
            EndpointSipEntity::update_many()
                .col_expr(EndpointSipColumn::Callerid, Expr::value(caller_id))
                .filter(EndpointSipColumn::Uuid.eq(endpoint_uuid))
                .exec(self.conn)
                .await
                .map_err(|e| {
                    error!("failed to fix endpoint of user {}: {}", user_id, e);
                    DaoError::storage("endpoint_sip", e)
                })?;
        }

        Ok(())
    }
}

fn fullname_of(firstname: &str, lastname: &str) -> String {
    if lastname.is_empty() {
        firstname.to_string()
    } else {
        format!("{firstname} {lastname}")
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;
    use crate::entity::user_line;
    use crate::entity::userfeatures;

    #[test]
    fn test_fullname_of() {
        assert_eq!(fullname_of("John", "Doe"), "John Doe");
        assert_eq!(fullname_of("John", ""), "John");
    }

    #[tokio::test]
    async fn test_user_without_a_line_still_gets_a_caller_id() {
        let user = userfeatures::Model {
            id: 7,
            firstname: "John".to_string(),
            lastname: "Doe".to_string(),
            ..Default::default()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .append_query_results([Vec::<user_line::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        UserFixer::new(&db).fix(7).await.unwrap();

        let log = db.into_transaction_log();
        let update = format!("{:?}", log.last().unwrap());
        assert!(update.contains("John Doe"));
    }
}
