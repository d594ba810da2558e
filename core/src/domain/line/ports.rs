use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::line::entities::{Line, LineExtension};

#[cfg_attr(test, mockall::automock)]
pub trait LineRepository: Send + Sync {
    fn get(&self, line_id: i32) -> impl Future<Output = Result<Line, DaoError>> + Send;

    fn find(&self, line_id: i32) -> impl Future<Output = Result<Option<Line>, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria) -> impl Future<Output = Result<Line, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<Line>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Line>, DaoError>> + Send;

    fn create(&self, line: Line) -> impl Future<Output = Result<Line, DaoError>> + Send;

    fn edit(&self, line: Line) -> impl Future<Output = Result<Line, DaoError>> + Send;

    fn delete(&self, line_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;

    /// A line carries at most one endpoint, SIP or custom, never both.
    fn associate_endpoint_sip(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn dissociate_endpoint_sip(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn associate_endpoint_custom(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn dissociate_endpoint_custom(
        &self,
        line_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait LineExtensionRepository: Send + Sync {
    fn associate(
        &self,
        line_id: i32,
        extension_id: i32,
    ) -> impl Future<Output = Result<LineExtension, DaoError>> + Send;

    fn dissociate(
        &self,
        line_id: i32,
        extension_id: i32,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn find_all_by_line(
        &self,
        line_id: i32,
    ) -> impl Future<Output = Result<Vec<LineExtension>, DaoError>> + Send;

    fn find_by_extension(
        &self,
        extension_id: i32,
    ) -> impl Future<Output = Result<Option<LineExtension>, DaoError>> + Send;
}
