//! Shared application state. The store handle is created by the caller and injected here.

use crate::config::ResourceDef;
use crate::service::ResourceService;
use crate::store::RecordStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        AppState { store }
    }

    pub fn service(&self, def: &'static ResourceDef) -> ResourceService {
        ResourceService::new(self.store.clone(), def)
    }
}
