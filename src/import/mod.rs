// Copyright 2023 Remi Bernotavicius

//! Reading aggregates and patches from JSON files into the store.

use crate::assemble::Rows;
use crate::database::models::{Collection, Document};
use crate::database::{self, repository};
use crate::model::aggregate;
use crate::model::patch::{
    AltNamePatch, CategoryPatch, IngredientPatch, PicturePatch, PlannerIntervalPatch, PlannerPatch,
    PlannerRecipePatch, RecipeCategoryPatch, RecipeIngredientPatch, RecipeMeasurePatch,
    RecipePatch, RecipeProcessPatch, UnitPatch,
};
use crate::{Error, Result};
use chrono::Utc;
use diesel::Connection as _;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use uuid::Uuid;

/// Files may hold a single object or an array of them.
fn decode_all<T: DeserializeOwned>(json: &str) -> Result<Vec<T>> {
    Ok(match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()?,
        one => vec![serde_json::from_value(one)?],
    })
}

fn save_all<D: Document>(conn: &mut database::Connection, documents: &[D]) -> Result<usize> {
    for document in documents {
        repository::save(conn, document)?;
    }
    Ok(documents.len())
}

/// Upserts every row. Returns how many rows were written.
pub fn save_rows(conn: &mut database::Connection, rows: &Rows) -> Result<usize> {
    conn.transaction::<_, Error, _>(|conn| {
        Ok(save_all(conn, &rows.alt_names)?
            + save_all(conn, &rows.pictures)?
            + save_all(conn, &rows.categories)?
            + save_all(conn, &rows.ingredients)?
            + save_all(conn, &rows.units)?
            + save_all(conn, &rows.recipes)?
            + save_all(conn, &rows.recipe_categories)?
            + save_all(conn, &rows.recipe_ingredients)?
            + save_all(conn, &rows.recipe_measures)?
            + save_all(conn, &rows.recipe_processes)?
            + save_all(conn, &rows.planners)?
            + save_all(conn, &rows.planner_intervals)?
            + save_all(conn, &rows.planner_recipes)?)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Recipe,
    Category,
    Planner,
}

/// Decodes one aggregate or an array of them, of the given kind, and stores
/// every record in it. Returns the number of aggregates imported.
pub fn import_json(
    conn: &mut database::Connection,
    kind: AggregateKind,
    json: &str,
) -> Result<usize> {
    let mut rows = Rows::default();
    let count = match kind {
        AggregateKind::Recipe => {
            let recipes = decode_all::<aggregate::Recipe>(json)?;
            recipes.iter().for_each(|r| rows.push_recipe(r));
            recipes.len()
        }
        AggregateKind::Category => {
            let categories = decode_all::<aggregate::Category>(json)?;
            categories.iter().for_each(|c| rows.push_category(c));
            categories.len()
        }
        AggregateKind::Planner => {
            let planners = decode_all::<aggregate::Planner>(json)?;
            planners.iter().for_each(|p| rows.push_planner(p));
            planners.len()
        }
    };
    let written = save_rows(conn, &rows)?;
    log::info!("imported {count} {kind:?} aggregates ({written} rows)");
    Ok(count)
}

pub fn import_file(
    conn: &mut database::Connection,
    kind: AggregateKind,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let json = std::fs::read_to_string(path)?;
    import_json(conn, kind, &json)
}

/// Decodes `json` as one patch or an array of patches for `collection`, applies
/// them to the stored document `id` and returns the updated document as JSON.
pub fn patch_json(
    conn: &mut database::Connection,
    collection: Collection,
    id: Uuid,
    json: &str,
) -> Result<String> {
    macro_rules! patch_as {
        ($patch:ty) => {{
            let patches = decode_all::<$patch>(json)?;
            let updated = repository::update(conn, id, &patches, Utc::now())?;
            serde_json::to_string(&updated)?
        }};
    }

    let updated = match collection {
        Collection::AltNames => patch_as!(AltNamePatch),
        Collection::Categories => patch_as!(CategoryPatch),
        Collection::Ingredients => patch_as!(IngredientPatch),
        Collection::Pictures => patch_as!(PicturePatch),
        Collection::Units => patch_as!(UnitPatch),
        Collection::Recipes => patch_as!(RecipePatch),
        Collection::RecipeCategories => patch_as!(RecipeCategoryPatch),
        Collection::RecipeIngredients => patch_as!(RecipeIngredientPatch),
        Collection::RecipeMeasures => patch_as!(RecipeMeasurePatch),
        Collection::RecipeProcesses => patch_as!(RecipeProcessPatch),
        Collection::Planners => patch_as!(PlannerPatch),
        Collection::PlannerIntervals => patch_as!(PlannerIntervalPatch),
        Collection::PlannerRecipes => patch_as!(PlannerRecipePatch),
    };
    log::info!("patched {collection} {id}");
    Ok(updated)
}

pub fn patch_file(
    conn: &mut database::Connection,
    collection: Collection,
    id: Uuid,
    path: impl AsRef<Path>,
) -> Result<String> {
    let json = std::fs::read_to_string(path)?;
    patch_json(conn, collection, id, &json)
}

#[test]
fn import_then_load() {
    use crate::model::aggregate::fixtures;

    let mut conn = database::establish_connection(":memory:").unwrap();
    let recipes = vec![fixtures::recipe(1), fixtures::recipe(10_000)];
    let json = serde_json::to_string(&recipes).unwrap();
    assert_eq!(import_json(&mut conn, AggregateKind::Recipe, &json).unwrap(), 2);

    for recipe in &recipes {
        assert_eq!(&database::load_recipe(&mut conn, recipe.entity.id).unwrap(), recipe);
    }

    // importing again replaces rather than duplicates
    assert_eq!(import_json(&mut conn, AggregateKind::Recipe, &json).unwrap(), 2);
    assert_eq!(repository::list::<crate::model::entity::Recipe>(&mut conn).unwrap().len(), 2);
}

#[test]
fn import_single_planner_file() {
    use crate::model::aggregate::fixtures;

    let planner = fixtures::planner(1);
    let path =
        std::env::temp_dir().join(format!("meal-planner-import-{}.json", std::process::id()));
    std::fs::write(&path, serde_json::to_string(&planner).unwrap()).unwrap();

    let mut conn = database::establish_connection(":memory:").unwrap();
    assert_eq!(import_file(&mut conn, AggregateKind::Planner, &path).unwrap(), 1);
    std::fs::remove_file(&path).unwrap();

    assert_eq!(database::load_planner(&mut conn, planner.entity.id).unwrap(), planner);
}

#[test]
fn import_rejects_bad_status() {
    use crate::model::aggregate::fixtures;

    let mut conn = database::establish_connection(":memory:").unwrap();
    let json = serde_json::to_string(&fixtures::category(1))
        .unwrap()
        .replace("\"published\"", "\"Published\"");
    assert!(import_json(&mut conn, AggregateKind::Category, &json).is_err());
    assert!(repository::list::<crate::model::entity::Category>(&mut conn)
        .unwrap()
        .is_empty());
}

#[test]
fn patch_through_collection_name() {
    use crate::model::aggregate::fixtures;
    use crate::model::entity::Picture;

    let mut conn = database::establish_connection(":memory:").unwrap();
    let category = fixtures::category(1);
    let json = serde_json::to_string(&category).unwrap();
    import_json(&mut conn, AggregateKind::Category, &json).unwrap();

    let picture_id = category.pictures[0].entity.id;
    let updated = patch_json(
        &mut conn,
        "pictures".parse().unwrap(),
        picture_id,
        r#"[{"width":1024},{"height":768,"type":"image/webp"}]"#,
    )
    .unwrap();
    let updated: Picture = serde_json::from_str(&updated).unwrap();
    assert_eq!((updated.width, updated.height, updated.size), (1024, 768, 1024));
    assert_eq!(updated.content_type, "image/webp");

    let err = patch_json(&mut conn, Collection::Pictures, picture_id, r#"{"id":"x"}"#);
    assert!(matches!(err, Err(Error::Json(_))));
    let err = patch_json(&mut conn, Collection::Recipes, picture_id, "{}");
    assert!(matches!(err, Err(Error::NotFound { .. })));
}

#[test]
fn decode_errors_name_the_problem() {
    let err = decode_all::<PicturePatch>(r#"{"id":"x"}"#).unwrap_err();
    assert!(err.to_string().contains("unknown field `id`"), "{err}");

    let err = decode_all::<RecipePatch>(r#"[{"name":"Stew"},{"status":"Published"}]"#).unwrap_err();
    assert!(err.to_string().contains("unknown variant `Published`"), "{err}");

    assert!(decode_all::<UnitPatch>("[]").unwrap().is_empty());
    assert_eq!(decode_all::<UnitPatch>("{}").unwrap(), vec![UnitPatch::default()]);
}
