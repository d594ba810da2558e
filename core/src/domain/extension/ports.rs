use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::extension::entities::Extension;

#[cfg_attr(test, mockall::automock)]
pub trait ExtensionRepository: Send + Sync {
    fn get(&self, extension_id: i32) -> impl Future<Output = Result<Extension, DaoError>> + Send;

    fn find(
        &self,
        extension_id: i32,
    ) -> impl Future<Output = Result<Option<Extension>, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria)
    -> impl Future<Output = Result<Extension, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<Extension>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Extension>, DaoError>> + Send;

    fn create(&self, extension: Extension)
    -> impl Future<Output = Result<Extension, DaoError>> + Send;

    fn edit(&self, extension: Extension)
    -> impl Future<Output = Result<Extension, DaoError>> + Send;

    fn delete(&self, extension_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;
}
