//! Service layer providing menu CRUD on top of `models`.
//! - `MenuStore` maps each operation onto one parameterized SQL statement.
//! - `MenuService` validates before persisting.
//! - Errors are reported as `ServiceError` kinds; nothing is retried here.

pub mod errors;
pub mod menu;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
pub use menu::{MenuRepository, MenuService, MenuStore};
