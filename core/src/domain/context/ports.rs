use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::context::entities::Context;

#[cfg_attr(test, mockall::automock)]
pub trait ContextRepository: Send + Sync {
    fn get(&self, context_id: i32) -> impl Future<Output = Result<Context, DaoError>> + Send;

    fn find(&self, context_id: i32)
    -> impl Future<Output = Result<Option<Context>, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria) -> impl Future<Output = Result<Context, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<Context>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Context>, DaoError>> + Send;

    fn create(&self, context: Context) -> impl Future<Output = Result<Context, DaoError>> + Send;

    fn edit(&self, context: Context) -> impl Future<Output = Result<Context, DaoError>> + Send;

    fn delete(&self, context_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;
}
