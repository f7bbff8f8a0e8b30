use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::{menu, Menu};

use crate::errors::ServiceError;
use crate::menu::repository::MenuRepository;

/// Application service for menus: validates before anything reaches the repository.
pub struct MenuService<R: MenuRepository> {
    repo: Arc<R>,
}

impl<R: MenuRepository> MenuService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<Menu>, ServiceError> { self.repo.list().await }

    #[instrument(skip(self, menu), fields(title = %menu.title))]
    pub async fn create(&self, menu: &mut Menu) -> Result<(), ServiceError> {
        Self::ensure_valid(menu)?;
        self.repo.create(menu).await?;
        info!(id = menu.id, "menu_created");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Menu, ServiceError> { self.repo.get(id).await }

    /// Full replace of the mutable fields, guarded by `menu.version`.
    #[instrument(skip(self, menu), fields(id = menu.id, version = menu.version))]
    pub async fn update(&self, menu: &mut Menu) -> Result<(), ServiceError> {
        Self::ensure_valid(menu)?;
        match self.repo.update(menu).await {
            Ok(()) => {
                info!(version = menu.version, "menu_updated");
                Ok(())
            }
            Err(e @ ServiceError::EditConflict(_)) => {
                warn!("menu_edit_conflict");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.repo.delete(id).await?;
        info!("menu_deleted");
        Ok(())
    }

    fn ensure_valid(menu: &Menu) -> Result<(), ServiceError> {
        let errors = menu::validate(menu);
        if errors.is_empty() {
            Ok(())
        } else {
            warn!(fields = ?errors.keys().collect::<Vec<_>>(), "menu_validation_failed");
            Err(ServiceError::Validation(errors))
        }
    }
}
