use crate::domain::call_permission::entities::CallPermission;
use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};

#[cfg_attr(test, mockall::automock)]
pub trait CallPermissionRepository: Send + Sync {
    fn get(
        &self,
        call_permission_id: i32,
    ) -> impl Future<Output = Result<CallPermission, DaoError>> + Send;

    fn find(
        &self,
        call_permission_id: i32,
    ) -> impl Future<Output = Result<Option<CallPermission>, DaoError>> + Send;

    fn get_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<CallPermission, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<CallPermission>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<CallPermission>, DaoError>> + Send;

    fn create(
        &self,
        call_permission: CallPermission,
    ) -> impl Future<Output = Result<CallPermission, DaoError>> + Send;

    fn edit(
        &self,
        call_permission: CallPermission,
    ) -> impl Future<Output = Result<CallPermission, DaoError>> + Send;

    fn delete(&self, call_permission_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;
}
