//! Bind resource values to sqlx queries with their native PostgreSQL types.

use crate::store::FieldValue;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// Integer values bind as INT8, decimals as FLOAT8, matching the value column types.
pub fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: FieldValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        FieldValue::Integer(n) => query.bind(n),
        FieldValue::Decimal(n) => query.bind(n),
    }
}
