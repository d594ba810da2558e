//! Configuration data-access layer for the Ringline telephony platform.
//!
//! `domain` holds the entities, value objects and port traits; `entity`
//! holds the sea-orm declarations of the legacy schema; `infrastructure`
//! holds the Postgres repositories, the shared search engine, the row↔model
//! converter and the other adapters.

pub mod domain;
pub mod entity;
pub mod infrastructure;

pub use domain::common::entities::app_errors::{DaoError, ErrorKind};
pub use domain::common::search::{Criteria, CriteriaValue, Direction, SearchParams, SearchResult};
pub use infrastructure::db::connect;
