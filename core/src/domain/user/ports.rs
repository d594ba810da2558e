use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::user::entities::{User, UserLine};

#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn get(&self, user_id: i32) -> impl Future<Output = Result<User, DaoError>> + Send;

    fn find(&self, user_id: i32) -> impl Future<Output = Result<Option<User>, DaoError>> + Send;

    fn get_by_uuid(&self, uuid: Uuid) -> impl Future<Output = Result<User, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria) -> impl Future<Output = Result<User, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<User>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<User>, DaoError>> + Send;

    fn create(&self, user: User) -> impl Future<Output = Result<User, DaoError>> + Send;

    fn edit(&self, user: User) -> impl Future<Output = Result<User, DaoError>> + Send;

    fn delete(&self, user_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn associate_voicemail(
        &self,
        user_id: i32,
        voicemail_id: i32,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn dissociate_voicemail(&self, user_id: i32)
    -> impl Future<Output = Result<(), DaoError>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait UserLineRepository: Send + Sync {
    fn associate(
        &self,
        user_id: i32,
        line_id: i32,
    ) -> impl Future<Output = Result<UserLine, DaoError>> + Send;

    /// The main user cannot leave a line while secondary users remain.
    fn dissociate(
        &self,
        user_id: i32,
        line_id: i32,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn find_all_by_user(
        &self,
        user_id: i32,
    ) -> impl Future<Output = Result<Vec<UserLine>, DaoError>> + Send;

    fn find_all_by_line(
        &self,
        line_id: i32,
    ) -> impl Future<Output = Result<Vec<UserLine>, DaoError>> + Send;
}
