use std::sync::Arc;

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::error;
use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::generate_uuid_v7;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::event::{EventOp, EventPublisher, notify};
use crate::domain::user::entities::caller_id_for;
use crate::domain::user::{entities::User, ports::UserRepository};
use crate::entity::user_line::{Column as UserLineColumn, Entity as UserLineEntity};
use crate::entity::userfeatures::{ActiveModel, Column, Entity, Model};
use crate::entity::voicemail::Entity as VoicemailEntity;
use crate::infrastructure::bus::TracingEventPublisher;
use crate::infrastructure::search::{self, SearchConfig};

#[derive(Clone)]
pub struct PostgresUserRepository {
    pub db: DatabaseConnection,
    config: SearchConfig<Entity>,
    notifier: Arc<dyn EventPublisher>,
}

fn search_config() -> SearchConfig<Entity> {
    SearchConfig::new(
        "user",
        [
            ("id", Column::Id),
            ("uuid", Column::Uuid),
            ("firstname", Column::Firstname),
            ("lastname", Column::Lastname),
            ("caller_id", Column::Callerid),
            ("voicemail_id", Column::Voicemailid),
        ],
        vec![Column::Firstname, Column::Lastname, Column::Callerid],
        Column::Lastname,
    )
    .with_tenant_column(Column::TenantUuid)
}

impl PostgresUserRepository {
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

    fn active_model(user: &User) -> ActiveModel {
        ActiveModel {
            id: Set(user.id),
            uuid: Set(user.uuid),
            tenant_uuid: Set(user.tenant_uuid),
            firstname: Set(user.firstname.clone()),
            lastname: Set(user.lastname.clone().unwrap_or_default()),
            callerid: Set(user.caller_id.clone()),
            voicemailid: Set(user.voicemail_id),
            musiconhold: Set(user.music_on_hold.clone().unwrap_or_default()),
            commented: Set(i32::from(!user.enabled)),
        }
    }

    async fn fetch(&self, user_id: i32) -> Result<Model, DaoError> {
        Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("failed to fetch user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))
    }
}

impl UserRepository for PostgresUserRepository {
    async fn get(&self, user_id: i32) -> Result<User, DaoError> {
        self.find(user_id)
            .await?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))
    }

    async fn find(&self, user_id: i32) -> Result<Option<User>, DaoError> {
        let row = Entity::find_by_id(user_id).one(&self.db).await.map_err(|e| {
            error!("failed to fetch user {}: {}", user_id, e);
            DaoError::storage("user", e)
        })?;
        Ok(row.map(User::from))
    }

    async fn get_by_uuid(&self, uuid: Uuid) -> Result<User, DaoError> {
        self.get_by(Criteria::new().and("uuid", uuid)).await
    }

    async fn get_by(&self, criteria: Criteria) -> Result<User, DaoError> {
        let row = search::get_by(&self.db, &self.config, &criteria).await?;
        Ok(User::from(row))
    }

    async fn find_by(&self, criteria: Criteria) -> Result<Option<User>, DaoError> {
        let row = search::find_by(&self.db, &self.config, &criteria).await?;
        Ok(row.map(User::from))
    }

    async fn search(&self, params: SearchParams) -> Result<SearchResult<User>, DaoError> {
        let result = search::search(&self.db, &self.config, &params).await?;
        Ok(result.map(User::from))
    }

    async fn create(&self, mut user: User) -> Result<User, DaoError> {
        user.check_mandatory()?;
        if user.uuid.is_nil() {
            user.uuid = generate_uuid_v7();
        }
        if user.caller_id.is_none() {
            user.caller_id = Some(caller_id_for(&user.fullname(), None));
        }

        let mut active = Self::active_model(&user);
        active.id = NotSet;

        let created = Entity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(|e| {
                error!("failed to create user: {}", e);
                DaoError::storage("user", e)
            })?;

        let created = User::from(created);
        notify(self.notifier.as_ref(), EventOp::Created, "user", &created);
        Ok(created)
    }

    async fn edit(&self, user: User) -> Result<User, DaoError> {
        user.check_mandatory()?;
        self.fetch(user.id).await?;

        let updated = Entity::update(Self::active_model(&user))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to edit user {}: {}", user.id, e);
                DaoError::storage("user", e)
            })?;

        let updated = User::from(updated);
        notify(self.notifier.as_ref(), EventOp::Edited, "user", &updated);
        Ok(updated)
    }

    async fn delete(&self, user_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("user", e)
        })?;

        let row = Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))?;

        let attached = UserLineEntity::find()
            .filter(UserLineColumn::UserId.eq(user_id))
            .count(&txn)
            .await
            .map_err(|e| {
                error!("failed to count lines of user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?;
        if attached > 0 {
            return Err(DaoError::conflict(
                "user",
                format!("still associated to {attached} line(s)"),
            ));
        }

        Entity::delete_by_id(user_id)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to delete user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to delete user {}: {}", user_id, e);
            DaoError::storage("user", e)
        })?;

        let deleted = User::from(row);
        notify(self.notifier.as_ref(), EventOp::Deleted, "user", &deleted);
        Ok(())
    }

    async fn associate_voicemail(&self, user_id: i32, voicemail_id: i32) -> Result<(), DaoError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("failed to open transaction: {}", e);
            DaoError::storage("user", e)
        })?;

        let mut user = Entity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?
            .ok_or_else(|| DaoError::not_found("user", format!("id={user_id}")))?;

        VoicemailEntity::find_by_id(voicemail_id)
            .one(&txn)
            .await
            .map_err(|e| {
                error!("failed to fetch voicemail {}: {}", voicemail_id, e);
                DaoError::storage("voicemail", e)
            })?
            .ok_or_else(|| DaoError::not_found("voicemail", format!("id={voicemail_id}")))?;

        user.voicemailid = Some(voicemail_id);
        let updated = Entity::update(Self::active_model(&User::from(&user)))
            .exec(&txn)
            .await
            .map_err(|e| {
                error!("failed to associate voicemail to user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?;
        txn.commit().await.map_err(|e| {
            error!("failed to associate voicemail to user {}: {}", user_id, e);
            DaoError::storage("user", e)
        })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "user", &User::from(updated));
        Ok(())
    }

    async fn dissociate_voicemail(&self, user_id: i32) -> Result<(), DaoError> {
        let mut user = self.fetch(user_id).await?;
        if user.voicemailid.is_none() {
            return Ok(());
        }

        user.voicemailid = None;
        let updated = Entity::update(Self::active_model(&User::from(&user)))
            .exec(&self.db)
            .await
            .map_err(|e| {
                error!("failed to dissociate voicemail from user {}: {}", user_id, e);
                DaoError::storage("user", e)
            })?;

        notify(self.notifier.as_ref(), EventOp::Edited, "user", &User::from(updated));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::*;
    use crate::domain::common::entities::app_errors::ErrorKind;
    use crate::entity::voicemail;

    #[tokio::test]
    async fn test_create_validates_before_writing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repository = PostgresUserRepository::new(db);

        let err = repository
            .create(User::new(Uuid::nil(), String::new()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "missing mandatory field: firstname");
    }

    #[tokio::test]
    async fn test_associate_missing_voicemail_is_not_found() {
        let user = Model {
            id: 7,
            uuid: Uuid::new_v4(),
            firstname: "John".to_string(),
            ..Default::default()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user]])
            .append_query_results([Vec::<voicemail::Model>::new()])
            .into_connection();
        let repository = PostgresUserRepository::new(db);

        let err = repository.associate_voicemail(7, 42).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "voicemail not found (id=42)");
    }
}
