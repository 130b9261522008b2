//! Resource CRUD routes. Each resource gets `GET|POST /{segment}` and `PUT|DELETE /{segment}/:id`,
//! with its own `ResourceService` as route state.

use crate::config::RESOURCES;
use crate::handlers::resource::{create, delete as delete_handler, list, update};
use crate::state::AppState;
use axum::{routing::get, routing::put, Router};

pub fn resource_routes(state: AppState) -> Router {
    RESOURCES.iter().copied().fold(Router::new(), |router, def| {
        let routes = Router::new()
            .route(&format!("/{}", def.path_segment), get(list).post(create))
            .route(&format!("/{}/:id", def.path_segment), put(update).delete(delete_handler))
            .with_state(state.service(def));
        router.merge(routes)
    })
}
