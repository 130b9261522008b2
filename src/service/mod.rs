//! ResourceService: validation, uniqueness and outcome classification over a record store.

mod resource;
mod validation;
pub use resource::{Reply, ResourceService};
pub use validation::{parse_id, validate_create, validate_update, ResourceInput, Scalar, ValidFields};
