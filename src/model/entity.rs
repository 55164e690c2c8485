// Copyright 2023 Remi Bernotavicius

//! Flat records, one per stored document. Field order here is the order they
//! are written in on the wire.

use super::codec;
use super::status::{
    AltNameStatus, CategoryStatus, IngredientStatus, PictureStatus, PlannerIntervalStatus,
    PlannerRecipeStatus, PlannerStatus, RecipeCategoryStatus, RecipeIngredientStatus,
    RecipeMeasureStatus, RecipeProcessStatus, RecipeStatus, UnitStatus,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and bookkeeping shared by every stored record.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    fn user_id(&self) -> Uuid;

    fn set_user_id(&mut self, user_id: Uuid);

    /// The record this one hangs off, if any. For alternate names and pictures
    /// this can be an entity of any type.
    fn parent_id(&self) -> Option<Uuid>;

    fn date_insert(&self) -> DateTime<Utc>;

    fn date_update(&self) -> DateTime<Utc>;

    /// Marks the record as freshly inserted at `now`.
    fn stamp_insert(&mut self, now: DateTime<Utc>);

    fn touch(&mut self, now: DateTime<Utc>);
}

macro_rules! impl_entity {
    (@parent $this:ident) => {
        None
    };
    (@parent $this:ident $parent:ident) => {
        Some($this.$parent)
    };
    ($($name:ident $(=> $parent:ident)?),+ $(,)?) => {$(
        impl Entity for $name {
            fn id(&self) -> Uuid {
                self.id
            }

            fn set_id(&mut self, id: Uuid) {
                self.id = id;
            }

            fn user_id(&self) -> Uuid {
                self.user_id
            }

            fn set_user_id(&mut self, user_id: Uuid) {
                self.user_id = user_id;
            }

            fn parent_id(&self) -> Option<Uuid> {
                impl_entity!(@parent self $($parent)?)
            }

            fn date_insert(&self) -> DateTime<Utc> {
                self.date_insert
            }

            fn date_update(&self) -> DateTime<Utc> {
                self.date_update
            }

            fn stamp_insert(&mut self, now: DateTime<Utc>) {
                self.date_insert = now;
                self.date_update = now;
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.date_update = now;
            }
        }
    )+};
}

impl_entity! {
    AltName => entity_id,
    Category,
    Ingredient,
    Picture => entity_id,
    Unit,
    Recipe,
    RecipeCategory => entity_id,
    RecipeIngredient => entity_id,
    RecipeMeasure => entity_id,
    RecipeProcess => entity_id,
    Planner,
    PlannerInterval => entity_id,
    PlannerRecipe => entity_id,
}

/// A localized or alternate name for some other entity.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct AltName {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub status: AltNameStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub status: CategoryStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub status: IngredientStatus,
}

/// An image attached to some other entity.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// In bytes.
    pub size: u64,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type")]
    pub content_type: String,
    pub status: PictureStatus,
}

/// A unit of measurement such as "cups" or "grams".
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub status: UnitStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub url: String,
    pub status: RecipeStatus,
}

/// Links a recipe (`entity_id`) to a category (`derive_id`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCategory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub derive_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub status: RecipeCategoryStatus,
}

/// Links a recipe (`entity_id`) to an ingredient (`derive_id`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub derive_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub notes: String,
    pub status: RecipeIngredientStatus,
}

/// How much of a recipe ingredient (`entity_id`) to use, in `unit_id` units.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMeasure {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub unit_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    #[serde(with = "codec::amount")]
    pub value: f64,
    pub status: RecipeMeasureStatus,
}

/// One preparation step of a recipe.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeProcess {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub status: RecipeProcessStatus,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planner {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub name: String,
    pub description: String,
    pub status: PlannerStatus,
}

/// A span of time within a planner, e.g. one day or one meal slot.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerInterval {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub end_time: DateTime<Utc>,
    pub name: String,
    pub status: PlannerIntervalStatus,
}

/// Places a recipe (`recipe_id`) into a planner interval (`entity_id`).
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRecipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Uuid,
    pub recipe_id: Uuid,
    #[serde(with = "codec::timestamp")]
    pub date_insert: DateTime<Utc>,
    #[serde(with = "codec::timestamp")]
    pub date_update: DateTime<Utc>,
    pub notes: String,
    pub status: PlannerRecipeStatus,
}

#[test]
fn entity_field_order() {
    use chrono::TimeZone as _;

    let at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let interval = PlannerInterval {
        id: Uuid::from_u128(1),
        user_id: Uuid::from_u128(2),
        entity_id: Uuid::from_u128(3),
        date_insert: at,
        date_update: at,
        start_time: Utc.with_ymd_and_hms(2000, 1, 3, 12, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2000, 1, 3, 13, 30, 0).unwrap(),
        name: "lunch".into(),
        status: PlannerIntervalStatus::Active,
    };
    assert_eq!(
        serde_json::to_string(&interval).unwrap(),
        concat!(
            r#"{"id":"00000000-0000-0000-0000-000000000001","#,
            r#""user_id":"00000000-0000-0000-0000-000000000002","#,
            r#""entity_id":"00000000-0000-0000-0000-000000000003","#,
            r#""date_insert":"2000-01-01T00:00:00Z","date_update":"2000-01-01T00:00:00Z","#,
            r#""start_time":"2000-01-03T12:00:00Z","end_time":"2000-01-03T13:30:00Z","#,
            r#""name":"lunch","status":"active"}"#
        )
    );
}

#[test]
fn entity_bookkeeping() {
    use chrono::TimeZone as _;

    let mut measure = RecipeMeasure {
        entity_id: Uuid::from_u128(7),
        ..Default::default()
    };
    assert_eq!(measure.parent_id(), Some(Uuid::from_u128(7)));
    assert_eq!(Recipe::default().parent_id(), None);

    let inserted = Utc.with_ymd_and_hms(2020, 5, 1, 8, 0, 0).unwrap();
    measure.stamp_insert(inserted);
    assert_eq!(measure.date_insert(), inserted);
    assert_eq!(measure.date_update(), inserted);

    let later = Utc.with_ymd_and_hms(2020, 5, 2, 8, 0, 0).unwrap();
    measure.touch(later);
    assert_eq!(measure.date_insert(), inserted);
    assert_eq!(measure.date_update(), later);
}

#[test]
fn entity_decode_rejects_unknown_status() {
    let json = r#"{"id":"00000000-0000-0000-0000-000000000001",
        "user_id":"00000000-0000-0000-0000-000000000002",
        "date_insert":"2000-01-01T00:00:00Z","date_update":"2000-01-01T00:00:00Z",
        "name":"Soups","description":"","status":"archived"}"#;
    assert!(serde_json::from_str::<Category>(json).is_err());

    let json = json.replace("archived", "published");
    let category: Category = serde_json::from_str(&json).unwrap();
    assert_eq!(category.status, CategoryStatus::Published);
}
