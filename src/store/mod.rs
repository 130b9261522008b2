//! Data store gateway: one parameterised statement per call, reads return records, writes return a mutation summary.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::config::ResourceDef;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Numeric value of a resource (customer tax id or product price).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(n) => write!(f, "{}", n),
        }
    }
}

/// One row of a resource table.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub value: FieldValue,
}

impl Record {
    /// JSON object keyed by the resource's field names (`id`, `name`, and `taxId` or `price`).
    pub fn to_json(&self, def: &ResourceDef) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id));
        map.insert("name".into(), Value::from(self.name.clone()));
        let value = serde_json::to_value(self.value).unwrap_or(Value::Null);
        map.insert(def.value_field.into(), value);
        Value::Object(map)
    }
}

/// Outcome of a write. `affected_rows` counts rows matched by the statement, `changed_rows` those whose values actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationSummary {
    pub inserted_id: Option<i64>,
    pub affected_rows: u64,
    pub changed_rows: u64,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select_all(&self, def: &ResourceDef) -> Result<Vec<Record>, StoreError>;

    async fn select_by_id(&self, def: &ResourceDef, id: i64) -> Result<Vec<Record>, StoreError>;

    /// Rows whose value column equals `value`. Backs the uniqueness check.
    async fn select_by_value(&self, def: &ResourceDef, value: FieldValue) -> Result<Vec<Record>, StoreError>;

    async fn insert(&self, def: &ResourceDef, name: &str, value: FieldValue) -> Result<MutationSummary, StoreError>;

    /// Overwrite name and value of row `id`.
    async fn update(
        &self,
        def: &ResourceDef,
        id: i64,
        name: &str,
        value: FieldValue,
    ) -> Result<MutationSummary, StoreError>;

    async fn delete(&self, def: &ResourceDef, id: i64) -> Result<MutationSummary, StoreError>;

    /// Round trip used by readiness checks and the startup probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
