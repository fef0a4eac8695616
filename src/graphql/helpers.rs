use crate::models::dto::request::PageQuery;

/// Builds a results page request from optional GraphQL arguments.
pub fn page_query(offset: Option<i64>, limit: Option<i64>) -> PageQuery {
    PageQuery { offset, limit }
}
