// Copyright 2023 Remi Bernotavicius

//! Inbound partial updates, one per entity type.
//!
//! Identity and bookkeeping fields (`id`, `user_id`, the owning `entity_id`
//! and the timestamps) can't be patched. Unknown keys are rejected when
//! decoding.

use super::entity::{
    AltName, Category, Ingredient, Picture, Planner, PlannerInterval, PlannerRecipe, Recipe,
    RecipeCategory, RecipeIngredient, RecipeMeasure, RecipeProcess, Unit,
};
use super::status::{
    AltNameStatus, CategoryStatus, IngredientStatus, PictureStatus, PlannerIntervalStatus,
    PlannerRecipeStatus, PlannerStatus, RecipeCategoryStatus, RecipeIngredientStatus,
    RecipeMeasureStatus, RecipeProcessStatus, RecipeStatus, UnitStatus,
};
use crate::impl_patch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AltNamePatch {
    pub name: Option<String>,
    pub status: Option<AltNameStatus>,
}

impl_patch!(AltNamePatch => AltName { name, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<CategoryStatus>,
}

impl_patch!(CategoryPatch => Category { name, description, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngredientPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<IngredientStatus>,
}

impl_patch!(IngredientPatch => Ingredient { name, description, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PicturePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub status: Option<PictureStatus>,
}

impl_patch!(PicturePatch => Picture {
    name,
    description,
    url,
    width,
    height,
    size,
    content_type,
    status,
});

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<UnitStatus>,
}

impl_patch!(UnitPatch => Unit { name, description, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub status: Option<RecipeStatus>,
}

impl_patch!(RecipePatch => Recipe { name, description, notes, url, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeCategoryPatch {
    pub derive_id: Option<Uuid>,
    pub status: Option<RecipeCategoryStatus>,
}

impl_patch!(RecipeCategoryPatch => RecipeCategory { derive_id, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeIngredientPatch {
    pub derive_id: Option<Uuid>,
    pub notes: Option<String>,
    pub status: Option<RecipeIngredientStatus>,
}

impl_patch!(RecipeIngredientPatch => RecipeIngredient { derive_id, notes, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeMeasurePatch {
    pub unit_id: Option<Uuid>,
    pub value: Option<f64>,
    pub status: Option<RecipeMeasureStatus>,
}

impl_patch!(RecipeMeasurePatch => RecipeMeasure { unit_id, value, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecipeProcessPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub status: Option<RecipeProcessStatus>,
}

impl_patch!(RecipeProcessPatch => RecipeProcess { name, description, notes, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<PlannerStatus>,
}

impl_patch!(PlannerPatch => Planner { name, description, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerIntervalPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub status: Option<PlannerIntervalStatus>,
}

impl_patch!(PlannerIntervalPatch => PlannerInterval { start_time, end_time, name, status });

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerRecipePatch {
    pub recipe_id: Option<Uuid>,
    pub notes: Option<String>,
    pub status: Option<PlannerRecipeStatus>,
}

impl_patch!(PlannerRecipePatch => PlannerRecipe { recipe_id, notes, status });

#[test]
fn patch_decoding() {
    let patch: RecipePatch =
        serde_json::from_str(r#"{"name":"Stew","status":"published"}"#).unwrap();
    assert_eq!(
        patch,
        RecipePatch {
            name: Some("Stew".into()),
            status: Some(RecipeStatus::Published),
            ..Default::default()
        }
    );

    let patch: PicturePatch = serde_json::from_str(r#"{"type":"image/jpeg"}"#).unwrap();
    assert_eq!(patch.content_type.as_deref(), Some("image/jpeg"));

    // identity fields are not patchable
    let err = serde_json::from_str::<RecipePatch>(
        r#"{"id":"00000000-0000-0000-0000-000000000001"}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown field `id`"), "{err}");

    assert!(serde_json::from_str::<RecipePatch>(r#"{"status":"Published"}"#).is_err());
}

#[test]
fn patch_application() {
    use crate::merge::apply;
    use chrono::TimeZone as _;

    let mut interval = PlannerInterval {
        name: "lunch".into(),
        ..Default::default()
    };
    let start = Utc.with_ymd_and_hms(2000, 1, 3, 12, 0, 0).unwrap();
    let patches: Vec<PlannerIntervalPatch> = serde_json::from_str(
        r#"[
            {"start_time":"2000-01-03T12:00:00Z","end_time":"2000-01-03T12:30:00Z"},
            {"end_time":"2000-01-03T13:00:00Z","status":"active"}
        ]"#,
    )
    .unwrap();
    apply(&mut interval, &patches);

    assert_eq!(interval.name, "lunch");
    assert_eq!(interval.start_time, start);
    assert_eq!(interval.end_time, start + chrono::Duration::hours(1));
    assert_eq!(interval.status, PlannerIntervalStatus::Active);

    let mut measure = RecipeMeasure {
        value: 2.5,
        ..Default::default()
    };
    apply(
        &mut measure,
        &[RecipeMeasurePatch {
            value: Some(0.0),
            ..Default::default()
        }],
    );
    assert_eq!(measure.value, 0.0);
}
