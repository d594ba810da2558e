use uuid::Uuid;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::trunk::entities::Trunk;

#[cfg_attr(test, mockall::automock)]
pub trait TrunkRepository: Send + Sync {
    fn get(&self, trunk_id: i32) -> impl Future<Output = Result<Trunk, DaoError>> + Send;

    fn find(&self, trunk_id: i32) -> impl Future<Output = Result<Option<Trunk>, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria) -> impl Future<Output = Result<Trunk, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<Trunk>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Trunk>, DaoError>> + Send;

    fn create(&self, trunk: Trunk) -> impl Future<Output = Result<Trunk, DaoError>> + Send;

    fn edit(&self, trunk: Trunk) -> impl Future<Output = Result<Trunk, DaoError>> + Send;

    fn delete(&self, trunk_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;

    /// Same single-endpoint rule as lines: SIP or custom, never both.
    fn associate_endpoint_sip(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn dissociate_endpoint_sip(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn associate_endpoint_custom(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn dissociate_endpoint_custom(
        &self,
        trunk_id: i32,
        endpoint_uuid: Uuid,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;
}
