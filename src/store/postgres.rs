//! PostgreSQL record store over a bounded `PgPool`, plus database/table bootstrap.

use super::{FieldValue, MutationSummary, Record, RecordStore};
use crate::config::{ResourceDef, ValueKind};
use crate::error::StoreError;
use crate::sql::{self, bind_value};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{ConnectOptions, PgPool, Row};
use std::str::FromStr;

/// Store backed by PostgreSQL. Cloning shares the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the schema (when not `public`) and one table per resource if missing.
    pub async fn ensure_tables(&self, resources: &[&ResourceDef]) -> Result<(), StoreError> {
        if self.schema != "public" {
            sqlx::query(&sql::create_schema(&self.schema))
                .execute(&self.pool)
                .await?;
        }
        for def in resources {
            let ddl = sql::create_table(&self.schema, def);
            tracing::debug!(sql = %ddl, "ensure table");
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn fetch_records(&self, def: &ResourceDef, sql: &str, param: Option<FieldValue>) -> Result<Vec<Record>, StoreError> {
        tracing::debug!(sql = %sql, params = ?param, "query");
        let mut query = sqlx::query(sql);
        if let Some(p) = param {
            query = bind_value(query, p);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_record(def, r)).collect()
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn select_all(&self, def: &ResourceDef) -> Result<Vec<Record>, StoreError> {
        let sql = sql::select_all(&self.schema, def);
        self.fetch_records(def, &sql, None).await
    }

    async fn select_by_id(&self, def: &ResourceDef, id: i64) -> Result<Vec<Record>, StoreError> {
        let sql = sql::select_by_id(&self.schema, def);
        self.fetch_records(def, &sql, Some(FieldValue::Integer(id))).await
    }

    async fn select_by_value(&self, def: &ResourceDef, value: FieldValue) -> Result<Vec<Record>, StoreError> {
        let sql = sql::select_by_value(&self.schema, def);
        self.fetch_records(def, &sql, Some(value)).await
    }

    async fn insert(&self, def: &ResourceDef, name: &str, value: FieldValue) -> Result<MutationSummary, StoreError> {
        let sql = sql::insert(&self.schema, def);
        tracing::debug!(sql = %sql, name = %name, value = %value, "insert");
        let row = bind_value(sqlx::query(&sql).bind(name), value)
            .fetch_optional(&self.pool)
            .await?;
        let inserted_id = match row {
            Some(r) => Some(r.try_get::<i64, _>(0)?),
            None => None,
        };
        Ok(MutationSummary {
            inserted_id,
            affected_rows: u64::from(inserted_id.is_some()),
            changed_rows: 0,
        })
    }

    async fn update(
        &self,
        def: &ResourceDef,
        id: i64,
        name: &str,
        value: FieldValue,
    ) -> Result<MutationSummary, StoreError> {
        let sql = sql::update_counting_changes(&self.schema, def);
        tracing::debug!(sql = %sql, id, name = %name, value = %value, "update");
        let row = bind_value(sqlx::query(&sql).bind(id).bind(name), value)
            .fetch_one(&self.pool)
            .await?;
        let affected: i64 = row.try_get("affected_rows")?;
        let changed: i64 = row.try_get("changed_rows")?;
        Ok(MutationSummary {
            inserted_id: None,
            affected_rows: affected.max(0) as u64,
            changed_rows: changed.max(0) as u64,
        })
    }

    async fn delete(&self, def: &ResourceDef, id: i64) -> Result<MutationSummary, StoreError> {
        let sql = sql::delete(&self.schema, def);
        tracing::debug!(sql = %sql, id, "delete");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(MutationSummary {
            inserted_id: None,
            affected_rows: result.rows_affected(),
            changed_rows: 0,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

fn row_to_record(def: &ResourceDef, row: &PgRow) -> Result<Record, StoreError> {
    let value = match def.value_kind {
        ValueKind::Integer => FieldValue::Integer(row.try_get(def.value_column)?),
        ValueKind::Decimal => FieldValue::Decimal(row.try_get(def.value_column)?),
    };
    Ok(Record {
        id: row.try_get(def.id_column)?,
        name: row.try_get(def.name_column)?,
        value,
    })
}

/// Connect to the `postgres` maintenance database and create the target database when it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::InvalidUrl("no database path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}
