//! List query composition.
//!
//! Turns an open map of optional request parameters into a single filtered,
//! ordered and paged `SELECT` against one collection. Filters come from the
//! collection's field table, the `all` parameter becomes one OR-group, and
//! `sort`, `limit`, `offset` are parsed and checked before any SQL is built.

mod fields;

pub use fields::{Collection, FieldSpec, MatchKind, ATTACHMENTS, FILES};

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::debug;

use crate::Result;

/// A request parameter that could not be turned into a query.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct InvalidParam {
    /// Offending parameter name.
    pub param: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl InvalidParam {
    fn new(param: &'static str, message: impl Into<String>) -> Self {
        Self {
            param,
            message: message.into(),
        }
    }
}

/// A filter predicate over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = value`
    Eq { column: &'static str, value: String },
    /// `column` contains `value`, case-sensitive.
    Contains { column: &'static str, value: String },
    /// Every child holds.
    And(Vec<Predicate>),
    /// At least one child holds.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Build the predicate for one filter parameter.
    pub fn for_field(field: &FieldSpec, value: &str) -> Self {
        match field.kind {
            MatchKind::Exact => Predicate::Eq {
                column: field.column,
                value: value.to_string(),
            },
            MatchKind::Contains => Predicate::Contains {
                column: field.column,
                value: value.to_string(),
            },
            MatchKind::Flag => {
                let value = match value.to_ascii_lowercase().as_str() {
                    "true" | "1" => "1".to_string(),
                    "false" | "0" => "0".to_string(),
                    // Unrecognized flags match nothing rather than failing.
                    _ => value.to_string(),
                };
                Predicate::Eq {
                    column: field.column,
                    value,
                }
            }
        }
    }

    fn push_to(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Predicate::Eq { column, value } => {
                qb.push(*column);
                qb.push(" = ");
                qb.push_bind(value.clone());
            }
            Predicate::Contains { column, value } => {
                qb.push("instr(CAST(");
                qb.push(*column);
                qb.push(" AS TEXT), ");
                qb.push_bind(value.clone());
                qb.push(") > 0");
            }
            Predicate::And(parts) => Self::push_group(qb, parts, " AND "),
            Predicate::Or(parts) => Self::push_group(qb, parts, " OR "),
        }
    }

    fn push_group(qb: &mut QueryBuilder<'static, Sqlite>, parts: &[Predicate], joiner: &str) {
        qb.push("(");
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                qb.push(joiner);
            }
            part.push_to(qb);
        }
        qb.push(")");
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// A parsed list request for one collection.
#[derive(Debug, Clone)]
pub struct ListQuery {
    collection: &'static Collection,
    filter: Option<Predicate>,
    order: Vec<(&'static str, Direction)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl ListQuery {
    /// A query with no filter, default order and no paging.
    pub fn new(collection: &'static Collection) -> Self {
        Self {
            collection,
            filter: None,
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Parse request parameters.
    ///
    /// Empty values impose no constraint. Unknown parameters are ignored.
    pub fn from_params(
        collection: &'static Collection,
        params: &HashMap<String, String>,
    ) -> std::result::Result<Self, InvalidParam> {
        let non_empty = |name: &str| params.get(name).map(String::as_str).filter(|v| !v.is_empty());

        let mut clauses: Vec<Predicate> = collection
            .fields
            .iter()
            .filter_map(|field| non_empty(field.param).map(|v| Predicate::for_field(field, v)))
            .collect();

        if let Some(term) = non_empty("all") {
            let any = collection
                .searchable
                .iter()
                .copied()
                .map(|column| Predicate::Contains {
                    column,
                    value: term.to_string(),
                })
                .collect();
            clauses.push(Predicate::Or(any));
        }

        let filter = match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Predicate::And(clauses)),
        };

        let order = match non_empty("sort") {
            Some(sort) => parse_sort(collection, sort)?,
            None => Vec::new(),
        };

        Ok(Self {
            filter,
            order,
            limit: non_empty("limit")
                .map(|v| parse_count("limit", v))
                .transpose()?,
            offset: non_empty("offset")
                .map(|v| parse_count("offset", v))
                .transpose()?,
            ..Self::new(collection)
        })
    }

    /// The composed filter, if any.
    #[cfg(test)]
    pub(crate) fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// Compose the SQL statement with all values bound.
    pub fn build(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.collection.columns);
        qb.push(" FROM ");
        qb.push(self.collection.table);
        qb.push(" WHERE deleted_at IS NULL");

        if let Some(ref filter) = self.filter {
            qb.push(" AND ");
            filter.push_to(&mut qb);
        }

        qb.push(" ORDER BY ");
        for (column, direction) in &self.order {
            qb.push(*column);
            qb.push(" ");
            qb.push(direction.as_sql());
            qb.push(", ");
        }
        // Insertion order breaks ties.
        qb.push("id ASC");

        match (self.limit, self.offset) {
            (Some(limit), _) => {
                qb.push(" LIMIT ");
                qb.push_bind(limit);
            }
            (None, Some(_)) => {
                qb.push(" LIMIT -1");
            }
            (None, None) => {}
        }
        if let Some(offset) = self.offset {
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        qb
    }

    /// Run the query and map every row.
    pub async fn fetch_all<T>(&self, pool: &SqlitePool) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut qb = self.build();
        debug!(table = self.collection.table, sql = qb.sql(), "running list query");

        let rows = qb.build_query_as::<T>().fetch_all(pool).await?;
        Ok(rows)
    }
}

fn parse_sort(
    collection: &Collection,
    sort: &str,
) -> std::result::Result<Vec<(&'static str, Direction)>, InvalidParam> {
    let mut order = Vec::new();

    for term in sort.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let mut words = term.split_whitespace();
        let key = words.next().unwrap_or_default();
        let column = collection
            .sort_column(key)
            .ok_or_else(|| InvalidParam::new("sort", format!("Unknown sort key '{key}'")))?;

        let direction = match words.next().map(|d| d.to_ascii_lowercase()) {
            None => Direction::Asc,
            Some(d) if d == "asc" => Direction::Asc,
            Some(d) if d == "desc" => Direction::Desc,
            Some(d) => {
                return Err(InvalidParam::new(
                    "sort",
                    format!("Unknown sort direction '{d}'"),
                ))
            }
        };

        if words.next().is_some() {
            return Err(InvalidParam::new(
                "sort",
                format!("Malformed sort term '{term}'"),
            ));
        }

        order.push((column, direction));
    }

    Ok(order)
}

fn parse_count(param: &'static str, value: &str) -> std::result::Result<i64, InvalidParam> {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(InvalidParam::new(
            param,
            format!("{param} must be a non-negative integer"),
        )),
    }
}
