//! Menu persistence: the repository seam, the sea-orm backed store and the
//! validating service on top of it.

pub mod repository;
pub mod service;
pub mod store;

pub use repository::MenuRepository;
pub use service::MenuService;
pub use store::MenuStore;
