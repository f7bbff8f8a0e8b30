use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, Statement, Value,
};
use tracing::{debug, instrument, warn};

use models::menu::{self, Menu};

use crate::errors::ServiceError;
use crate::menu::repository::MenuRepository;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

const SELECT_ALL: &str =
    "SELECT id, created_at, updated_at, title, description, nutrition_value, version FROM menus";
const SELECT_BY_ID: &str =
    "SELECT id, created_at, updated_at, title, description, nutrition_value, version FROM menus \
     WHERE id = $1";
const INSERT: &str = "INSERT INTO menus (title, description, nutrition_value) VALUES ($1, $2, $3) \
     RETURNING id, created_at, updated_at, version";
const UPDATE: &str = "UPDATE menus \
     SET title = $1, description = $2, nutrition_value = $3, \
     updated_at = CURRENT_TIMESTAMP, version = version + 1 \
     WHERE id = $4 AND version = $5 \
     RETURNING updated_at, version";
const DELETE: &str = "DELETE FROM menus WHERE id = $1";

#[derive(Debug, FromQueryResult)]
struct Inserted {
    id: i64,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    version: i32,
}

#[derive(Debug, FromQueryResult)]
struct Updated {
    updated_at: DateTimeWithTimeZone,
    version: i32,
}

/// SeaORM-backed menu store issuing parameterized SQL against the `menus` table.
///
/// Each call is a single round trip bounded by `timeout`; an expired deadline
/// abandons the call and reports [`ServiceError::Timeout`]. Nothing is retried.
pub struct MenuStore {
    pub db: DatabaseConnection,
    timeout: Duration,
}

impl MenuStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_timeout(db, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(db: DatabaseConnection, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    pub fn from_config(db: DatabaseConnection, cfg: &configs::StoreConfig) -> Self {
        Self::with_timeout(db, cfg.timeout())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn statement<I>(&self, sql: &str, values: I) -> Statement
    where
        I: IntoIterator<Item = Value>,
    {
        Statement::from_sql_and_values(self.db.get_database_backend(), sql, values)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, DbErr>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(ServiceError::from),
            Err(_) => {
                warn!(
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "menu_store_deadline_exceeded"
                );
                Err(ServiceError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl MenuRepository for MenuStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Menu>, ServiceError> {
        let stmt = self.statement(SELECT_ALL, Vec::<Value>::new());
        let menus = self
            .bounded("list", menu::Entity::find().from_raw_sql(stmt).all(&self.db))
            .await?;
        debug!(count = menus.len(), "menus_listed");
        Ok(menus)
    }

    #[instrument(skip(self, menu), fields(title = %menu.title))]
    async fn create(&self, menu: &mut Menu) -> Result<(), ServiceError> {
        let stmt = self.statement(
            INSERT,
            [
                menu.title.clone().into(),
                menu.description.clone().into(),
                menu.nutrition_value.into(),
            ],
        );
        let row = self
            .bounded("create", Inserted::find_by_statement(stmt).one(&self.db))
            .await?
            .ok_or_else(|| ServiceError::Db("insert into menus returned no row".into()))?;
        menu.id = row.id;
        menu.created_at = row.created_at;
        menu.updated_at = row.updated_at;
        menu.version = row.version;
        debug!(id = menu.id, "menu_created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Menu, ServiceError> {
        if id < 1 {
            return Err(ServiceError::NotFound(id));
        }
        let stmt = self.statement(SELECT_BY_ID, [id.into()]);
        let found = self
            .bounded("get", menu::Entity::find().from_raw_sql(stmt).one(&self.db))
            .await
            .map_err(|e| lookup_failure(id, e))?;
        found.ok_or(ServiceError::NotFound(id))
    }

    #[instrument(skip(self, menu), fields(id = menu.id, version = menu.version))]
    async fn update(&self, menu: &mut Menu) -> Result<(), ServiceError> {
        let stmt = self.statement(
            UPDATE,
            [
                menu.title.clone().into(),
                menu.description.clone().into(),
                menu.nutrition_value.into(),
                menu.id.into(),
                menu.version.into(),
            ],
        );
        match self
            .bounded("update", Updated::find_by_statement(stmt).one(&self.db))
            .await?
        {
            Some(row) => {
                menu.updated_at = row.updated_at;
                menu.version = row.version;
                debug!(version = menu.version, "menu_updated");
                Ok(())
            }
            None => {
                debug!("menu_update_conflict");
                Err(ServiceError::EditConflict(menu.id))
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if id < 1 {
            return Err(ServiceError::NotFound(id));
        }
        let stmt = self.statement(DELETE, [id.into()]);
        let res = self.bounded("delete", self.db.execute(stmt)).await?;
        debug!(rows_affected = res.rows_affected(), "menu_deleted");
        Ok(())
    }
}

/// Names the requested id in `Db` failures; `Timeout` and the rest pass through.
fn lookup_failure(id: i64, err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Db(msg) => {
            ServiceError::Db(format!("cannot retrieve menu with id {id}: {msg}"))
        }
        other => other,
    }
}


/// Round trips against a live Postgres; each test skips itself when none is reachable.
#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::test_support::get_db;

    async fn store() -> Option<MenuStore> {
        get_db().await.map(MenuStore::new)
    }

    #[tokio::test]
    async fn create_then_get_round_trip() -> Result<(), ServiceError> {
        let Some(store) = store().await else { return Ok(()) };

        let title = format!("svc_menu_{}", uuid::Uuid::new_v4().simple());
        let mut m = Menu::draft(&title, "Lentil soup", 180);
        store.create(&mut m).await?;
        assert!(m.id >= 1);
        assert_eq!(m.created_at, m.updated_at);
        assert_eq!(m.version, 1);

        let found = store.get(m.id).await?;
        assert_eq!(found, m);

        store.delete(m.id).await?;
        assert!(matches!(store.get(m.id).await, Err(ServiceError::NotFound(_))));
        // second delete of the same id is still fine
        store.delete(m.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn stale_token_conflicts_fresh_token_applies() -> Result<(), ServiceError> {
        let Some(store) = store().await else { return Ok(()) };

        let mut m = Menu::draft(format!("svc_menu_{}", uuid::Uuid::new_v4().simple()), "", 10);
        store.create(&mut m).await?;
        let stale = m.clone();

        store.update(&mut m).await?;
        assert_eq!(m.version, 2);
        assert!(m.updated_at >= m.created_at);

        // same field values, fresh token: applies again
        store.update(&mut m).await?;
        assert_eq!(m.version, 3);

        let mut again = stale.clone();
        assert!(matches!(
            store.update(&mut again).await,
            Err(ServiceError::EditConflict(id)) if id == m.id
        ));

        store.delete(m.id).await?;
        let mut gone = m.clone();
        assert!(matches!(store.update(&mut gone).await, Err(ServiceError::EditConflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_updates_have_one_winner() -> Result<(), ServiceError> {
        let Some(store) = store().await else { return Ok(()) };

        let mut m = Menu::draft(format!("svc_menu_{}", uuid::Uuid::new_v4().simple()), "", 10);
        store.create(&mut m).await?;

        let mut a = m.clone();
        a.title = "writer a".into();
        let mut b = m.clone();
        b.title = "writer b".into();
        let (ra, rb) = tokio::join!(store.update(&mut a), store.update(&mut b));
        let wins = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(wins, 1);

        let current = store.get(m.id).await?;
        assert_eq!(current.version, 2);
        assert!(current.title == "writer a" || current.title == "writer b");

        store.delete(m.id).await?;
        Ok(())
    }
}
