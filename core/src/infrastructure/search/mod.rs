//! Shared criteria/search engine.
//!
//! Every repository funnels filtering, free-text search, ordering and
//! pagination through this module, so criteria validation and pagination
//! math (`total` counted before `offset`/`limit`) behave identically across
//! resources. Rows that tie on the sort column keep backend order; no
//! secondary sort key is applied.

use std::collections::HashMap;

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, IntoSimpleExpr, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Value,
};
use tracing::error;

use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::common::search::{
    Criteria, CriteriaValue, Direction, SearchParams, SearchResult,
};

/// Per-resource search description: which logical names callers may use,
/// which columns the free-text term scans, and how results sort by default.
pub struct SearchConfig<E: EntityTrait> {
    resource: &'static str,
    columns: HashMap<&'static str, E::Column>,
    searchable: Vec<E::Column>,
    default_sort: E::Column,
    tenant_column: Option<E::Column>,
}

impl<E: EntityTrait> SearchConfig<E> {
    pub fn new(
        resource: &'static str,
        columns: impl IntoIterator<Item = (&'static str, E::Column)>,
        searchable: Vec<E::Column>,
        default_sort: E::Column,
    ) -> Self {
        Self {
            resource,
            columns: columns.into_iter().collect(),
            searchable,
            default_sort,
            tenant_column: None,
        }
    }

    pub fn with_tenant_column(mut self, column: E::Column) -> Self {
        self.tenant_column = Some(column);
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    fn resolve(&self, name: &str) -> Result<E::Column, DaoError> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| DaoError::unknown_column(name))
    }
}

// Manual impls: the derived ones would demand bounds on `E` itself instead
// of `E::Column`.
impl<E: EntityTrait> Clone for SearchConfig<E> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource,
            columns: self.columns.clone(),
            searchable: self.searchable.clone(),
            default_sort: self.default_sort,
            tenant_column: self.tenant_column,
        }
    }
}

impl<E: EntityTrait> std::fmt::Debug for SearchConfig<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&'static str> = self.columns.keys().copied().collect();
        names.sort_unstable();
        f.debug_struct("SearchConfig")
            .field("resource", &self.resource)
            .field("columns", &names)
            .finish()
    }
}

fn value_of(value: &CriteriaValue) -> Value {
    match value {
        CriteriaValue::Text(v) => v.clone().into(),
        CriteriaValue::Int(v) => (*v).into(),
        CriteriaValue::Bool(v) => (*v).into(),
        CriteriaValue::Uuid(v) => (*v).into(),
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn criteria_condition<E: EntityTrait>(
    config: &SearchConfig<E>,
    criteria: &Criteria,
) -> Result<Condition, DaoError> {
    let mut condition = Condition::all();
    for (name, value) in criteria.entries() {
        let column = config.resolve(name)?;
        condition = condition.add(column.eq(value_of(value)));
    }
    Ok(condition)
}

fn build_condition<E: EntityTrait>(
    config: &SearchConfig<E>,
    params: &SearchParams,
) -> Result<Condition, DaoError> {
    let mut condition = Condition::all();

    if let Some(tenant_uuids) = &params.tenant_uuids {
        let column = config
            .tenant_column
            .ok_or_else(|| DaoError::unknown_column("tenant_uuids"))?;
        condition = condition.add(column.is_in(tenant_uuids.iter().copied()));
    }

    condition = condition.add(criteria_condition(config, &params.criteria)?);

    if let Some(term) = params.search.as_deref() {
        let pattern = like_pattern(term);
        let mut matches = Condition::any();
        for column in config.searchable.iter().copied() {
            matches = matches.add(column.into_simple_expr().ilike(pattern.as_str()));
        }
        condition = condition.add(matches);
    }

    Ok(condition)
}

fn build_page_query<E: EntityTrait>(
    config: &SearchConfig<E>,
    params: &SearchParams,
) -> Result<Select<E>, DaoError> {
    let condition = build_condition(config, params)?;
    let sort_column = match params.order.as_deref() {
        Some(name) => config.resolve(name)?,
        None => config.default_sort,
    };
    let order = match params.direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    };

    Ok(E::find()
        .filter(condition)
        .order_by(sort_column, order)
        .offset(params.offset)
        .limit(params.limit))
}

/// Run a filtered, ordered, paginated query. `total` counts every matching
/// row regardless of `offset`/`limit`.
pub async fn search<C, E>(
    conn: &C,
    config: &SearchConfig<E>,
    params: &SearchParams,
) -> Result<SearchResult<E::Model>, DaoError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let total = E::find()
        .filter(build_condition(config, params)?)
        .count(conn)
        .await
        .map_err(|e| {
            error!("failed to count {}: {}", config.resource, e);
            DaoError::storage(config.resource, e)
        })?;

    let items = build_page_query(config, params)?
        .all(conn)
        .await
        .map_err(|e| {
            error!("failed to search {}: {}", config.resource, e);
            DaoError::storage(config.resource, e)
        })?;

    Ok(SearchResult::new(total, items))
}

/// Single-row lookup by criteria; `Ok(None)` when nothing matches.
pub async fn find_by<C, E>(
    conn: &C,
    config: &SearchConfig<E>,
    criteria: &Criteria,
) -> Result<Option<E::Model>, DaoError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    E::find()
        .filter(criteria_condition(config, criteria)?)
        .one(conn)
        .await
        .map_err(|e| {
            error!("failed to fetch {}: {}", config.resource, e);
            DaoError::storage(config.resource, e)
        })
}

/// Like `find_by`, but a missing row is an error naming the criteria.
pub async fn get_by<C, E>(
    conn: &C,
    config: &SearchConfig<E>,
    criteria: &Criteria,
) -> Result<E::Model, DaoError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    find_by(conn, config, criteria)
        .await?
        .ok_or_else(|| DaoError::not_found(config.resource, criteria.to_string()))
}

/// Every row matching the criteria, in backend order.
pub async fn find_all<C, E>(
    conn: &C,
    config: &SearchConfig<E>,
    criteria: &Criteria,
) -> Result<Vec<E::Model>, DaoError>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    E::find()
        .filter(criteria_condition(config, criteria)?)
        .all(conn)
        .await
        .map_err(|e| {
            error!("failed to fetch {}: {}", config.resource, e);
            DaoError::storage(config.resource, e)
        })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};
    use uuid::Uuid;

    use super::*;
    use crate::domain::common::entities::app_errors::ErrorKind;
    use crate::entity::voicemail::{Column, Entity, Model};

    fn config() -> SearchConfig<Entity> {
        SearchConfig::new(
            "voicemail",
            [
                ("id", Column::Uniqueid),
                ("name", Column::Fullname),
                ("number", Column::Mailbox),
                ("context", Column::Context),
                ("email", Column::Email),
            ],
            vec![Column::Fullname, Column::Mailbox, Column::Email],
            Column::Mailbox,
        )
        .with_tenant_column(Column::TenantUuid)
    }

    fn sql_of(params: &SearchParams) -> String {
        build_page_query(&config(), params)
            .unwrap()
            .build(DatabaseBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_unknown_criterion_is_an_input_error() {
        let params = SearchParams::new().filter("toto", "tata");
        let err = build_page_query(&config(), &params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.to_string(), "unknown column: toto");
    }

    #[test]
    fn test_unknown_order_is_an_input_error() {
        let params = SearchParams::new().order_by("toto");
        let err = build_page_query(&config(), &params).unwrap_err();
        assert_eq!(err.to_string(), "unknown column: toto");
    }

    #[test]
    fn test_tenant_filter_requires_a_tenant_column() {
        let config: SearchConfig<Entity> = SearchConfig::new(
            "voicemail",
            [("name", Column::Fullname)],
            vec![Column::Fullname],
            Column::Fullname,
        );
        let params = SearchParams::new().tenants([Uuid::new_v4()]);
        let err = build_page_query(&config, &params).unwrap_err();
        assert_eq!(err.to_string(), "unknown column: tenant_uuids");
    }

    #[test]
    fn test_free_text_is_case_insensitive_or_across_columns() {
        let sql = sql_of(&SearchParams::new().search("ton"));
        assert!(sql.contains("ILIKE '%ton%'"));
        assert!(sql.contains("OR"));
        assert_eq!(sql.matches("ILIKE").count(), 3);
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("ton"), "%ton%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c\\d"), "%c\\\\d%");
    }

    #[test]
    fn test_criteria_and_ordering() {
        let params = SearchParams::new()
            .filter("context", "default")
            .order_by("name")
            .direction(Direction::Desc);
        let sql = sql_of(&params);
        assert!(sql.contains(r#""context" = 'default'"#));
        assert!(sql.contains(r#"ORDER BY "voicemail"."fullname" DESC"#));
    }

    #[test]
    fn test_default_sort_is_ascending() {
        let sql = sql_of(&SearchParams::new());
        assert!(sql.contains(r#"ORDER BY "voicemail"."mailbox" ASC"#));
    }

    #[test]
    fn test_pagination_applies_offset_and_limit() {
        let sql = sql_of(&SearchParams::new().limit(1).offset(1));
        assert!(sql.contains("LIMIT 1"));
        assert!(sql.contains("OFFSET 1"));
    }

    #[test]
    fn test_empty_tenant_set_matches_nothing() {
        let sql = sql_of(&SearchParams::new().tenants([]));
        assert!(sql.contains("1 = 2"));
    }

    fn row(id: i32, fullname: &str) -> Model {
        Model {
            uniqueid: id,
            tenant_uuid: Uuid::nil(),
            fullname: fullname.to_string(),
            mailbox: format!("{}", 1000 + id),
            context: "default".to_string(),
            password: String::new(),
            email: None,
            language: None,
            commented: 0,
        }
    }

    #[tokio::test]
    async fn test_search_total_is_independent_of_pagination() {
        let page = vec![row(2, "Beaugarton")];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![BTreeMap::from([(
                "num_items",
                Value::BigInt(Some(4)),
            )])]])
            .append_query_results([page.clone()])
            .into_connection();

        let params = SearchParams::new().limit(1).offset(1);
        let result = search(&db, &config(), &params).await.unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.items, page);
    }

    #[tokio::test]
    async fn test_find_all_returns_every_match() {
        let rows = vec![row(1, "Ashton"), row(3, "Casa")];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows.clone()])
            .into_connection();

        let criteria = Criteria::new().and("context", "default");
        let found = find_all(&db, &config(), &criteria).await.unwrap();
        assert_eq!(found, rows);
    }

    #[tokio::test]
    async fn test_find_by_returns_none_and_get_by_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Model>::new(), Vec::<Model>::new()])
            .into_connection();

        let criteria = Criteria::new().and("number", "1000").and("context", "default");
        assert_eq!(find_by(&db, &config(), &criteria).await.unwrap(), None);

        let err = get_by(&db, &config(), &criteria).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "voicemail not found (number=1000, context=default)"
        );
    }
}
