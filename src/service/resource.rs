//! CRUD operations for one resource. Store failures are logged here and converted to `AppError`.

use super::validation::{validate_create, validate_update, ResourceInput};
use crate::config::ResourceDef;
use crate::error::{AppError, StoreError};
use crate::store::{MutationSummary, RecordStore};
use serde_json::Value;
use std::sync::Arc;

/// Result of a service call that is reported to the client with a success status.
#[derive(Debug, PartialEq)]
pub enum Reply {
    /// Rows of a read. A lookup by id that matches nothing is an empty list.
    Rows(Vec<Value>),
    /// Listing all rows found none.
    NoResults,
    Created(MutationSummary),
    NotFound(String),
    /// The row matched but already held the submitted values.
    Unchanged,
    Updated,
    Deleted(String),
    DeleteFailed(String),
}

#[derive(Clone)]
pub struct ResourceService {
    store: Arc<dyn RecordStore>,
    def: &'static ResourceDef,
}

impl ResourceService {
    pub fn new(store: Arc<dyn RecordStore>, def: &'static ResourceDef) -> Self {
        ResourceService { store, def }
    }

    pub fn def(&self) -> &'static ResourceDef {
        self.def
    }

    /// One row by id when `id` is given, otherwise every row.
    pub async fn list(&self, id: Option<i64>) -> Result<Reply, AppError> {
        let def = self.def;
        if let Some(id) = id {
            let rows = self
                .store
                .select_by_id(def, id)
                .await
                .map_err(|e| self.store_failed("read", e))?;
            return Ok(Reply::Rows(rows.iter().map(|r| r.to_json(def)).collect()));
        }
        let rows = self
            .store
            .select_all(def)
            .await
            .map_err(|e| self.store_failed("list", e))?;
        if rows.is_empty() {
            return Ok(Reply::NoResults);
        }
        Ok(Reply::Rows(rows.iter().map(|r| r.to_json(def)).collect()))
    }

    pub async fn create(&self, input: &ResourceInput) -> Result<Reply, AppError> {
        let def = self.def;
        let (name, value) = validate_create(def, input)?;
        if def.unique_value {
            let existing = self
                .store
                .select_by_value(def, value)
                .await
                .map_err(|e| self.create_failed(e))?;
            if !existing.is_empty() {
                return Err(AppError::Conflict(format!("this {} is already registered", def.value_field)));
            }
        }
        let summary = self
            .store
            .insert(def, &name, value)
            .await
            .map_err(|e| self.create_failed(e))?;
        match summary.inserted_id {
            Some(id) if id > 0 => {
                tracing::info!(resource = def.path_segment, id, "created");
                Ok(Reply::Created(summary))
            }
            _ => {
                tracing::error!(resource = def.path_segment, ?summary, "insert returned no id");
                Err(AppError::CreateFailed(format!("an error occurred while creating the {}", def.noun())))
            }
        }
    }

    /// Partial update: fields not supplied keep their current values.
    pub async fn update(&self, id: i64, input: &ResourceInput) -> Result<Reply, AppError> {
        let def = self.def;
        let fields = validate_update(def, input)?;
        let current = self
            .store
            .select_by_id(def, id)
            .await
            .map_err(|e| self.store_failed("update", e))?
            .into_iter()
            .next();
        let Some(current) = current else {
            return Ok(Reply::NotFound(format!("{} not found", def.label)));
        };
        if def.unique_value {
            if let Some(value) = fields.value {
                let taken = self
                    .store
                    .select_by_value(def, value)
                    .await
                    .map_err(|e| self.store_failed("update", e))?
                    .iter()
                    .any(|r| r.id != id);
                if taken {
                    return Err(AppError::Conflict(format!(
                        "the new {} is already registered, try another value",
                        def.value_field
                    )));
                }
            }
        }
        let name = fields.name.unwrap_or(current.name);
        let value = fields.value.unwrap_or(current.value);
        let summary = self
            .store
            .update(def, id, &name, value)
            .await
            .map_err(|e| self.store_failed("update", e))?;
        match (summary.affected_rows, summary.changed_rows) {
            (1, 0) => Ok(Reply::Unchanged),
            (1, 1) => {
                tracing::info!(resource = def.path_segment, id, "updated");
                Ok(Reply::Updated)
            }
            (affected, changed) => {
                tracing::error!(resource = def.path_segment, id, affected, changed, "unexpected update outcome");
                Err(AppError::UnexpectedOutcome {
                    message: format!(
                        "update of {} {} matched {} rows and changed {}",
                        def.noun(),
                        id,
                        affected,
                        changed
                    ),
                    affected_rows: affected,
                    changed_rows: changed,
                })
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<Reply, AppError> {
        let def = self.def;
        let existing = self
            .store
            .select_by_id(def, id)
            .await
            .map_err(|e| self.store_failed("delete", e))?;
        if existing.is_empty() {
            return Ok(Reply::NotFound(format!("{} not found in the database", def.label)));
        }
        let summary = self
            .store
            .delete(def, id)
            .await
            .map_err(|e| self.store_failed("delete", e))?;
        if summary.affected_rows == 0 {
            return Ok(Reply::DeleteFailed(format!("an error occurred while deleting the {}", def.noun())));
        }
        tracing::info!(resource = def.path_segment, id, "deleted");
        Ok(Reply::Deleted(format!("{} deleted successfully", def.label)))
    }

    fn store_failed(&self, op: &'static str, e: StoreError) -> AppError {
        tracing::error!(resource = self.def.path_segment, op, error = %e, "store failure");
        AppError::Store(e)
    }

    fn create_failed(&self, e: StoreError) -> AppError {
        tracing::error!(resource = self.def.path_segment, op = "create", error = %e, "store failure");
        AppError::CreateFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CUSTOMERS, PRODUCTS};
    use crate::store::{FieldValue, MemoryStore, Record};
    use async_trait::async_trait;
    use serde_json::json;

    /// Holds a single row and answers writes with fixed counts.
    struct ScriptedStore {
        update: MutationSummary,
        delete: MutationSummary,
    }

    impl ScriptedStore {
        fn row() -> Record {
            Record {
                id: 1,
                name: "Keyboard".into(),
                value: FieldValue::Decimal(126.25),
            }
        }
    }

    #[async_trait]
    impl RecordStore for ScriptedStore {
        async fn select_all(&self, _: &ResourceDef) -> Result<Vec<Record>, StoreError> {
            Ok(vec![Self::row()])
        }

        async fn select_by_id(&self, _: &ResourceDef, _: i64) -> Result<Vec<Record>, StoreError> {
            Ok(vec![Self::row()])
        }

        async fn select_by_value(&self, _: &ResourceDef, _: FieldValue) -> Result<Vec<Record>, StoreError> {
            Ok(Vec::new())
        }

        async fn insert(&self, _: &ResourceDef, _: &str, _: FieldValue) -> Result<MutationSummary, StoreError> {
            Ok(MutationSummary::default())
        }

        async fn update(&self, _: &ResourceDef, _: i64, _: &str, _: FieldValue) -> Result<MutationSummary, StoreError> {
            Ok(self.update)
        }

        async fn delete(&self, _: &ResourceDef, _: i64) -> Result<MutationSummary, StoreError> {
            Ok(self.delete)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn scripted(affected: u64, changed: u64, deleted: u64) -> ResourceService {
        let store = ScriptedStore {
            update: MutationSummary {
                inserted_id: None,
                affected_rows: affected,
                changed_rows: changed,
            },
            delete: MutationSummary {
                inserted_id: None,
                affected_rows: deleted,
                changed_rows: 0,
            },
        };
        ResourceService::new(Arc::new(store), &PRODUCTS)
    }

    fn body(def: &ResourceDef, v: Value) -> ResourceInput {
        ResourceInput::from_json(def, v).unwrap()
    }

    fn services() -> (Arc<MemoryStore>, ResourceService, ResourceService) {
        let store = Arc::new(MemoryStore::new());
        let customers = ResourceService::new(store.clone(), &CUSTOMERS);
        let products = ResourceService::new(store.clone(), &PRODUCTS);
        (store, customers, products)
    }

    #[tokio::test]
    async fn created_rows_are_readable_by_id() {
        let (_, _, products) = services();
        let reply = products.create(&body(&PRODUCTS, json!({"name": "Keyboard", "price": 126.25}))).await.unwrap();
        let Reply::Created(summary) = reply else { panic!("expected created") };
        assert_eq!(summary.inserted_id, Some(1));

        let rows = products.list(Some(1)).await.unwrap();
        assert_eq!(rows, Reply::Rows(vec![json!({"id": 1, "name": "Keyboard", "price": 126.25})]));
    }

    #[tokio::test]
    async fn empty_listing_and_missing_id_differ() {
        let (_, customers, _) = services();
        assert_eq!(customers.list(None).await.unwrap(), Reply::NoResults);
        assert_eq!(customers.list(Some(4)).await.unwrap(), Reply::Rows(vec![]));
    }

    #[tokio::test]
    async fn duplicate_tax_id_conflicts_without_insert() {
        let (store, customers, _) = services();
        customers.create(&body(&CUSTOMERS, json!({"name": "Ana", "taxId": 11122233344_i64}))).await.unwrap();
        let err = customers
            .create(&body(&CUSTOMERS, json!({"name": "Bia", "taxId": "11122233344"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(store.row_count(&CUSTOMERS).await, 1);
    }

    #[tokio::test]
    async fn products_allow_repeated_prices() {
        let (store, _, products) = services();
        for name in ["Mouse", "Pad"] {
            products.create(&body(&PRODUCTS, json!({"name": name, "price": 10}))).await.unwrap();
        }
        assert_eq!(store.row_count(&PRODUCTS).await, 2);
    }

    #[tokio::test]
    async fn update_keeps_unsupplied_fields() {
        let (store, _, products) = services();
        products.create(&body(&PRODUCTS, json!({"name": "Keyboard", "price": 126.25}))).await.unwrap();
        let reply = products.update(1, &body(&PRODUCTS, json!({"price": 99.90}))).await.unwrap();
        assert_eq!(reply, Reply::Updated);
        let rows = store.select_by_id(&PRODUCTS, 1).await.unwrap();
        assert_eq!(rows[0].name, "Keyboard");
        assert_eq!(rows[0].value, FieldValue::Decimal(99.90));
    }

    #[tokio::test]
    async fn update_with_identical_values_is_unchanged() {
        let (_, customers, _) = services();
        customers.create(&body(&CUSTOMERS, json!({"name": "Ana", "taxId": 123}))).await.unwrap();
        let reply = customers.update(1, &body(&CUSTOMERS, json!({"name": "Ana", "taxId": 123}))).await.unwrap();
        assert_eq!(reply, Reply::Unchanged);
    }

    #[tokio::test]
    async fn update_rejects_tax_id_owned_by_another_customer() {
        let (_, customers, _) = services();
        customers.create(&body(&CUSTOMERS, json!({"name": "Ana", "taxId": 1}))).await.unwrap();
        customers.create(&body(&CUSTOMERS, json!({"name": "Bia", "taxId": 2}))).await.unwrap();
        let err = customers.update(2, &body(&CUSTOMERS, json!({"taxId": 1}))).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let (store, _, products) = services();
        let reply = products.update(3, &body(&PRODUCTS, json!({"name": "Cable"}))).await.unwrap();
        assert_eq!(reply, Reply::NotFound("Product not found".into()));
        assert_eq!(store.row_count(&PRODUCTS).await, 0);
    }

    #[tokio::test]
    async fn delete_then_delete_again() {
        let (store, customers, _) = services();
        customers.create(&body(&CUSTOMERS, json!({"name": "Ana", "taxId": 5}))).await.unwrap();
        assert_eq!(customers.delete(1).await.unwrap(), Reply::Deleted("Customer deleted successfully".into()));
        assert_eq!(store.row_count(&CUSTOMERS).await, 0);
        assert!(matches!(customers.delete(1).await.unwrap(), Reply::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failures_map_per_operation() {
        let (store, customers, _) = services();
        store.set_unavailable(true);
        assert!(matches!(customers.list(None).await, Err(AppError::Store(_))));
        assert!(matches!(
            customers.create(&body(&CUSTOMERS, json!({"name": "Ana", "taxId": 5}))).await,
            Err(AppError::CreateFailed(_))
        ));
        assert!(matches!(customers.delete(1).await, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn unrecognised_update_counts_are_errors() {
        for (affected, changed) in [(2, 1), (0, 0), (1, 2)] {
            let err = scripted(affected, changed, 1)
                .update(1, &body(&PRODUCTS, json!({"price": 10})))
                .await
                .unwrap_err();
            match err {
                AppError::UnexpectedOutcome {
                    affected_rows,
                    changed_rows,
                    ..
                } => assert_eq!((affected_rows, changed_rows), (affected, changed)),
                other => panic!("expected unexpected outcome, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn insert_without_generated_id_fails_create() {
        let err = scripted(1, 1, 1)
            .create(&body(&PRODUCTS, json!({"name": "Mouse", "price": 10})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CreateFailed(_)));
    }

    #[tokio::test]
    async fn delete_affecting_no_rows_reports_failure() {
        let reply = scripted(1, 1, 0).delete(1).await.unwrap();
        assert_eq!(reply, Reply::DeleteFailed("an error occurred while deleting the product".into()));
    }
}
