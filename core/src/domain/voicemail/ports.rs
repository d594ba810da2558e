use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{Criteria, SearchParams, SearchResult};
use crate::domain::voicemail::entities::Voicemail;

#[cfg_attr(test, mockall::automock)]
pub trait VoicemailRepository: Send + Sync {
    fn get(&self, voicemail_id: i32) -> impl Future<Output = Result<Voicemail, DaoError>> + Send;

    fn find(
        &self,
        voicemail_id: i32,
    ) -> impl Future<Output = Result<Option<Voicemail>, DaoError>> + Send;

    fn get_by(&self, criteria: Criteria)
    -> impl Future<Output = Result<Voicemail, DaoError>> + Send;

    fn find_by(
        &self,
        criteria: Criteria,
    ) -> impl Future<Output = Result<Option<Voicemail>, DaoError>> + Send;

    fn search(
        &self,
        params: SearchParams,
    ) -> impl Future<Output = Result<SearchResult<Voicemail>, DaoError>> + Send;

    fn create(&self, voicemail: Voicemail)
    -> impl Future<Output = Result<Voicemail, DaoError>> + Send;

    fn edit(&self, voicemail: Voicemail)
    -> impl Future<Output = Result<Voicemail, DaoError>> + Send;

    /// Refused while a user is still attached to the voicemail.
    fn delete(&self, voicemail_id: i32) -> impl Future<Output = Result<(), DaoError>> + Send;
}
