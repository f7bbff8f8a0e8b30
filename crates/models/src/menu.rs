use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationErrors, Validator};

pub const TITLE_MAX_BYTES: usize = 100;
pub const DESCRIPTION_MAX_BYTES: usize = 1000;
pub const NUTRITION_VALUE_MAX: i32 = 10_000;

/// A menu item. `id`, the timestamps and `version` are assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menus")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub nutrition_value: i32,
    /// Optimistic-concurrency token; must match the stored value for an update to apply.
    pub version: i32,
}

pub type Menu = Model;

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation { fn def(&self) -> RelationDef { panic!("no relations") } }

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Unsaved menu ready for `create`; store-assigned fields hold placeholders.
    pub fn draft(
        title: impl Into<String>,
        description: impl Into<String>,
        nutrition_value: i32,
    ) -> Self {
        let epoch: DateTimeWithTimeZone = DateTime::<Utc>::default().into();
        Self {
            id: 0,
            created_at: epoch,
            updated_at: epoch,
            title: title.into(),
            description: description.into(),
            nutrition_value,
            version: 0,
        }
    }
}

pub fn validate_menu(v: &mut Validator, menu: &Model) {
    v.check(!menu.title.is_empty(), "title", "must be provided");
    v.check(menu.title.len() <= TITLE_MAX_BYTES, "title", "must not be more than 100 bytes long");
    v.check(
        menu.description.len() <= DESCRIPTION_MAX_BYTES,
        "description",
        "must not be more than 1000 bytes long",
    );
    v.check(menu.nutrition_value >= 0, "nutritionValue", "must not be negative");
    v.check(
        menu.nutrition_value <= NUTRITION_VALUE_MAX,
        "nutritionValue",
        "must not be more than 10000",
    );
}

pub fn validate(menu: &Model) -> ValidationErrors {
    let mut v = Validator::new();
    validate_menu(&mut v, menu);
    v.into_errors()
}
