use async_trait::async_trait;

use models::Menu;

use crate::errors::ServiceError;

/// Persistence operations for menus. Implementations perform no validation
/// and no retries; callers validate first and decide how to react to errors.
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Every menu, in backing-store order. No rows is an empty vec.
    async fn list(&self) -> Result<Vec<Menu>, ServiceError>;
    /// Inserts `menu` and writes the generated id, timestamps and version back into it.
    async fn create(&self, menu: &mut Menu) -> Result<(), ServiceError>;
    /// `NotFound` for ids below 1 (without I/O) and for missing rows.
    async fn get(&self, id: i64) -> Result<Menu, ServiceError>;
    /// Applies only while `menu.version` still matches the stored token; otherwise `EditConflict`.
    async fn update(&self, menu: &mut Menu) -> Result<(), ServiceError>;
    /// Idempotent: deleting a missing row succeeds. Ids below 1 are `NotFound`.
    async fn delete(&self, id: i64) -> Result<(), ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard};

    use chrono::Utc;

    #[derive(Default)]
    pub struct MockMenuRepository {
        rows: Mutex<BTreeMap<i64, Menu>>,
        next_id: Mutex<i64>,
    }

    impl MockMenuRepository {
        pub fn new() -> Self {
            Self::default()
        }

        fn rows(&self) -> Result<MutexGuard<'_, BTreeMap<i64, Menu>>, ServiceError> {
            self.rows.lock().map_err(|_| ServiceError::Db("mock repository lock poisoned".into()))
        }
    }

    #[async_trait]
    impl MenuRepository for MockMenuRepository {
        async fn list(&self) -> Result<Vec<Menu>, ServiceError> {
            Ok(self.rows()?.values().cloned().collect())
        }

        async fn create(&self, menu: &mut Menu) -> Result<(), ServiceError> {
            let id = {
                let mut next = self
                    .next_id
                    .lock()
                    .map_err(|_| ServiceError::Db("mock repository lock poisoned".into()))?;
                *next += 1;
                *next
            };
            let now = Utc::now().into();
            menu.id = id;
            menu.created_at = now;
            menu.updated_at = now;
            menu.version = 1;
            self.rows()?.insert(id, menu.clone());
            Ok(())
        }

        async fn get(&self, id: i64) -> Result<Menu, ServiceError> {
            if id < 1 {
                return Err(ServiceError::NotFound(id));
            }
            self.rows()?.get(&id).cloned().ok_or(ServiceError::NotFound(id))
        }

        async fn update(&self, menu: &mut Menu) -> Result<(), ServiceError> {
            let mut rows = self.rows()?;
            let stored = match rows.get_mut(&menu.id) {
                Some(stored) if stored.version == menu.version => stored,
                _ => return Err(ServiceError::EditConflict(menu.id)),
            };
            stored.title = menu.title.clone();
            stored.description = menu.description.clone();
            stored.nutrition_value = menu.nutrition_value;
            stored.updated_at = Utc::now().into();
            stored.version += 1;
            menu.updated_at = stored.updated_at;
            menu.version = stored.version;
            Ok(())
        }

        async fn delete(&self, id: i64) -> Result<(), ServiceError> {
            if id < 1 {
                return Err(ServiceError::NotFound(id));
            }
            self.rows()?.remove(&id);
            Ok(())
        }
    }
}
