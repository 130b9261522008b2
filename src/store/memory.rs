//! In-process record store for tests. Mirrors the PostgreSQL store's matched/changed semantics.

use super::{FieldValue, MutationSummary, Record, RecordStore};
use crate::config::ResourceDef;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of rows currently held for a resource.
    pub async fn row_count(&self, def: &ResourceDef) -> usize {
        self.tables
            .read()
            .await
            .get(def.table_name)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".into()));
        }
        Ok(())
    }

    async fn select_where<F>(&self, def: &ResourceDef, pred: F) -> Result<Vec<Record>, StoreError>
    where
        F: Fn(&Record) -> bool + Send,
    {
        self.check()?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(def.table_name)
            .map(|t| t.rows.values().filter(|r| pred(r)).cloned().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_all(&self, def: &ResourceDef) -> Result<Vec<Record>, StoreError> {
        self.select_where(def, |_| true).await
    }

    async fn select_by_id(&self, def: &ResourceDef, id: i64) -> Result<Vec<Record>, StoreError> {
        self.select_where(def, move |r| r.id == id).await
    }

    async fn select_by_value(&self, def: &ResourceDef, value: FieldValue) -> Result<Vec<Record>, StoreError> {
        self.select_where(def, move |r| r.value == value).await
    }

    async fn insert(&self, def: &ResourceDef, name: &str, value: FieldValue) -> Result<MutationSummary, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(def.table_name).or_default();
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            Record {
                id,
                name: name.to_string(),
                value,
            },
        );
        Ok(MutationSummary {
            inserted_id: Some(id),
            affected_rows: 1,
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
        self.check()?;
        let mut tables = self.tables.write().await;
        let Some(row) = tables.get_mut(def.table_name).and_then(|t| t.rows.get_mut(&id)) else {
            return Ok(MutationSummary::default());
        };
        let changed = row.name != name || row.value != value;
        if changed {
            row.name = name.to_string();
            row.value = value;
        }
        Ok(MutationSummary {
            inserted_id: None,
            affected_rows: 1,
            changed_rows: u64::from(changed),
        })
    }

    async fn delete(&self, def: &ResourceDef, id: i64) -> Result<MutationSummary, StoreError> {
        self.check()?;
        let mut tables = self.tables.write().await;
        let removed = tables
            .get_mut(def.table_name)
            .and_then(|t| t.rows.remove(&id))
            .is_some();
        Ok(MutationSummary {
            inserted_id: None,
            affected_rows: u64::from(removed),
            changed_rows: 0,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
