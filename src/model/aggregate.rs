// Copyright 2023 Remi Bernotavicius

//! Read-side trees. Each aggregate exclusively owns its children and is built
//! fresh for every response, see [`crate::assemble`].
//!
//! Field order is part of the wire format and must not be rearranged.

use super::codec::nullable_vec;
use super::entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Picture {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    pub entity: entity::Picture,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    pub entity: entity::Category,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub pictures: Vec<Picture>,
}

/// A category as attached to one recipe.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCategory {
    pub derive: Category,
    pub entity: entity::RecipeCategory,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeMeasure {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    pub entity: entity::RecipeMeasure,
    pub unit: entity::Unit,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    pub derive: entity::Ingredient,
    pub entity: entity::RecipeIngredient,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub measures: Vec<RecipeMeasure>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub pictures: Vec<Picture>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeProcess {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    pub entity: entity::RecipeProcess,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub pictures: Vec<Picture>,
}

/// The full recipe tree. Note that `pictures` comes after `processes`.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub alt_names: Vec<entity::AltName>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub categories: Vec<RecipeCategory>,
    pub entity: entity::Recipe,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub processes: Vec<RecipeProcess>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub pictures: Vec<Picture>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerRecipe {
    pub entity: entity::PlannerRecipe,
    pub recipe: Recipe,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerInterval {
    pub entity: entity::PlannerInterval,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub recipes: Vec<PlannerRecipe>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planner {
    pub entity: entity::Planner,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub intervals: Vec<PlannerInterval>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! A fully populated planner where every foreign key lines up.

    use super::*;
    use crate::model::entity;
    use crate::model::status::*;
    use chrono::{DateTime, TimeZone as _, Utc};
    use uuid::Uuid;

    pub const USER: Uuid = Uuid::from_u128(0xffff);

    pub fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
    }

    pub fn alt_name(id: u128, owner: Uuid, name: &str) -> entity::AltName {
        entity::AltName {
            id: Uuid::from_u128(id),
            user_id: USER,
            entity_id: owner,
            date_insert: at(),
            date_update: at(),
            name: name.into(),
            status: AltNameStatus::Published,
        }
    }

    pub fn picture(id: u128, owner: Uuid) -> Picture {
        let picture_id = Uuid::from_u128(id);
        Picture {
            alt_names: vec![alt_name(id + 1, picture_id, "picture")],
            entity: entity::Picture {
                id: picture_id,
                user_id: USER,
                entity_id: owner,
                date_insert: at(),
                date_update: at(),
                name: "picture".into(),
                description: "a picture".into(),
                url: format!("https://example.com/{id}.png"),
                width: 512,
                height: 512,
                size: 1024,
                content_type: "image/png".into(),
                status: PictureStatus::Published,
            },
        }
    }

    pub fn category(id: u128) -> Category {
        let category_id = Uuid::from_u128(id);
        Category {
            alt_names: vec![alt_name(id + 1, category_id, "soups")],
            entity: entity::Category {
                id: category_id,
                user_id: USER,
                date_insert: at(),
                date_update: at(),
                name: "Soups".into(),
                description: "Warm things in bowls".into(),
                status: CategoryStatus::Published,
            },
            pictures: vec![picture(id + 10, category_id)],
        }
    }

    pub fn recipe(id: u128) -> Recipe {
        let recipe_id = Uuid::from_u128(id);
        let category = category(id + 100);
        let ingredient_id = Uuid::from_u128(id + 200);
        let recipe_ingredient_id = Uuid::from_u128(id + 300);
        let measure_id = Uuid::from_u128(id + 400);
        let unit_id = Uuid::from_u128(id + 500);
        let process_id = Uuid::from_u128(id + 600);

        Recipe {
            alt_names: vec![alt_name(id + 1, recipe_id, "tomato soup")],
            categories: vec![RecipeCategory {
                entity: entity::RecipeCategory {
                    id: Uuid::from_u128(id + 700),
                    user_id: USER,
                    entity_id: recipe_id,
                    derive_id: category.entity.id,
                    date_insert: at(),
                    date_update: at(),
                    status: RecipeCategoryStatus::Active,
                },
                derive: category,
            }],
            entity: entity::Recipe {
                id: recipe_id,
                user_id: USER,
                date_insert: at(),
                date_update: at(),
                name: "Tomato Soup".into(),
                description: "Simple and red".into(),
                notes: "Better the next day".into(),
                url: "https://example.com/tomato-soup".into(),
                status: RecipeStatus::Published,
            },
            ingredients: vec![RecipeIngredient {
                alt_names: vec![alt_name(id + 301, recipe_ingredient_id, "ripe tomatoes")],
                derive: entity::Ingredient {
                    id: ingredient_id,
                    user_id: USER,
                    date_insert: at(),
                    date_update: at(),
                    name: "tomato".into(),
                    description: "red fruit".into(),
                    status: IngredientStatus::Published,
                },
                entity: entity::RecipeIngredient {
                    id: recipe_ingredient_id,
                    user_id: USER,
                    entity_id: recipe_id,
                    derive_id: ingredient_id,
                    date_insert: at(),
                    date_update: at(),
                    notes: "peeled".into(),
                    status: RecipeIngredientStatus::Active,
                },
                measures: vec![RecipeMeasure {
                    alt_names: vec![alt_name(id + 401, measure_id, "a pound")],
                    entity: entity::RecipeMeasure {
                        id: measure_id,
                        user_id: USER,
                        entity_id: recipe_ingredient_id,
                        unit_id,
                        date_insert: at(),
                        date_update: at(),
                        value: 42.0,
                        status: RecipeMeasureStatus::Active,
                    },
                    unit: entity::Unit {
                        id: unit_id,
                        user_id: USER,
                        date_insert: at(),
                        date_update: at(),
                        name: "g".into(),
                        description: "grams".into(),
                        status: UnitStatus::Published,
                    },
                }],
                pictures: vec![picture(id + 310, recipe_ingredient_id)],
            }],
            processes: vec![RecipeProcess {
                alt_names: vec![alt_name(id + 601, process_id, "simmer")],
                entity: entity::RecipeProcess {
                    id: process_id,
                    user_id: USER,
                    entity_id: recipe_id,
                    date_insert: at(),
                    date_update: at(),
                    name: "Simmer".into(),
                    description: "Simmer for twenty minutes".into(),
                    notes: "stir now and then".into(),
                    status: RecipeProcessStatus::Published,
                },
                pictures: vec![picture(id + 610, process_id)],
            }],
            pictures: vec![picture(id + 10, recipe_id)],
        }
    }

    pub fn planner(id: u128) -> Planner {
        let planner_id = Uuid::from_u128(id);
        let interval_id = Uuid::from_u128(id + 1);
        let recipe = recipe(id + 1000);
        Planner {
            entity: entity::Planner {
                id: planner_id,
                user_id: USER,
                date_insert: at(),
                date_update: at(),
                name: "Week 1".into(),
                description: "First week of the year".into(),
                status: PlannerStatus::Active,
            },
            intervals: vec![PlannerInterval {
                entity: entity::PlannerInterval {
                    id: interval_id,
                    user_id: USER,
                    entity_id: planner_id,
                    date_insert: at(),
                    date_update: at(),
                    start_time: Utc.with_ymd_and_hms(2000, 1, 3, 12, 0, 0).unwrap(),
                    end_time: Utc.with_ymd_and_hms(2000, 1, 3, 13, 0, 0).unwrap(),
                    name: "Monday lunch".into(),
                    status: PlannerIntervalStatus::Active,
                },
                recipes: vec![PlannerRecipe {
                    entity: entity::PlannerRecipe {
                        id: Uuid::from_u128(id + 2),
                        user_id: USER,
                        entity_id: interval_id,
                        recipe_id: recipe.entity.id,
                        date_insert: at(),
                        date_update: at(),
                        notes: "double it".into(),
                        status: PlannerRecipeStatus::Active,
                    },
                    recipe,
                }],
            }],
        }
    }
}

#[cfg(test)]
fn assert_populated(path: &str, value: &serde_json::Value) {
    use serde_json::Value;

    match value {
        Value::Null => panic!("{path} is null"),
        Value::Bool(_) => {}
        Value::Number(n) => assert_ne!(n.as_f64(), Some(0.0), "{path} is zero"),
        Value::String(s) => {
            assert!(!s.is_empty(), "{path} is empty");
            assert_ne!(s.as_str(), uuid::Uuid::nil().to_string(), "{path} is the nil id");
            assert_ne!(s.as_str(), "1970-01-01T00:00:00Z", "{path} is the epoch");
            // statuses default to the negative token
            assert!(!["unpublished", "inactive"].contains(&s.as_str()), "{path} is {s}");
        }
        Value::Array(items) => {
            assert!(!items.is_empty(), "{path} is empty");
            for (i, item) in items.iter().enumerate() {
                assert_populated(&format!("{path}[{i}]"), item);
            }
        }
        Value::Object(fields) => {
            for (key, field) in fields {
                assert_populated(&format!("{path}.{key}"), field);
            }
        }
    }
}

#[test]
fn fixtures_are_fully_populated() {
    assert_populated("planner", &serde_json::to_value(fixtures::planner(1)).unwrap());
    assert_populated("category", &serde_json::to_value(fixtures::category(1)).unwrap());
}

#[test]
fn picture_shape() {
    use crate::model::status::{AltNameStatus, PictureStatus};
    use chrono::{TimeZone as _, Utc};
    use uuid::Uuid;

    let at = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let picture = Picture {
        alt_names: vec![entity::AltName {
            id: Uuid::from_u128(1),
            user_id: Uuid::from_u128(2),
            entity_id: Uuid::from_u128(3),
            date_insert: at,
            date_update: at,
            name: "name".into(),
            status: AltNameStatus::Published,
        }],
        entity: entity::Picture {
            id: Uuid::from_u128(3),
            user_id: Uuid::from_u128(2),
            entity_id: Uuid::from_u128(4),
            date_insert: at,
            date_update: at,
            name: "name".into(),
            description: "description".into(),
            url: "https://example.com/picture.png".into(),
            width: 512,
            height: 512,
            size: 1024,
            content_type: "image/png".into(),
            status: PictureStatus::Published,
        },
    };

    let expected = concat!(
        r#"{"alt_names":[{"id":"00000000-0000-0000-0000-000000000001","#,
        r#""user_id":"00000000-0000-0000-0000-000000000002","#,
        r#""entity_id":"00000000-0000-0000-0000-000000000003","#,
        r#""date_insert":"2000-01-01T00:00:00Z","date_update":"2000-01-01T00:00:00Z","#,
        r#""name":"name","status":"published"}],"#,
        r#""entity":{"id":"00000000-0000-0000-0000-000000000003","#,
        r#""user_id":"00000000-0000-0000-0000-000000000002","#,
        r#""entity_id":"00000000-0000-0000-0000-000000000004","#,
        r#""date_insert":"2000-01-01T00:00:00Z","date_update":"2000-01-01T00:00:00Z","#,
        r#""name":"name","description":"description","url":"https://example.com/picture.png","#,
        r#""width":512,"height":512,"size":1024,"type":"image/png","status":"published"}}"#
    );
    assert_eq!(serde_json::to_string(&picture).unwrap(), expected);
    assert_eq!(serde_json::from_str::<Picture>(expected).unwrap(), picture);
}

#[test]
fn recipe_measure_shape() {
    let measure = &fixtures::recipe(1).ingredients[0].measures[0];
    let json = serde_json::to_string(measure).unwrap();

    assert!(json.contains(r#""value":42,"#), "{json}");
    let entity_at = json.find(r#""entity":"#).unwrap();
    let unit_at = json.find(r#""unit":"#).unwrap();
    assert!(entity_at < unit_at);
    assert!(json.ends_with(r#""status":"published"}}"#), "{json}");
}

#[test]
fn recipe_key_order() {
    let recipe = fixtures::recipe(1);
    let value = serde_json::to_value(&recipe).unwrap();
    let json = serde_json::to_string(&recipe).unwrap();

    let keys = [
        r#"{"alt_names":"#,
        r#"],"categories":"#,
        r#"}],"entity":{"id":"00000000-0000-0000-0000-000000000001""#,
        r#"},"ingredients":"#,
        r#"],"processes":"#,
        r#"],"pictures":"#,
    ];
    let mut last = 0;
    for key in keys {
        let at = json[last..].find(key).map(|i| i + last);
        let at = at.unwrap_or_else(|| panic!("{key} missing or out of order in {json}"));
        last = at;
    }
    assert_eq!(value["categories"][0]["derive"]["entity"]["name"], "Soups");
}

#[test]
fn aggregate_round_trip() {
    let planner = fixtures::planner(1);
    let json = serde_json::to_string(&planner).unwrap();
    assert_eq!(serde_json::from_str::<Planner>(&json).unwrap(), planner);

    let recipe = fixtures::recipe(5);
    let json = serde_json::to_string(&recipe).unwrap();
    assert_eq!(serde_json::from_str::<Recipe>(&json).unwrap(), recipe);
    let decoded = serde_json::from_str::<Recipe>(&json).unwrap();
    assert_eq!(serde_json::to_string(&decoded).unwrap(), json);
}

#[test]
fn aggregate_null_lists() {
    let json = serde_json::to_value(fixtures::category(1).entity).unwrap();
    let decoded: Category = serde_json::from_value(serde_json::json!({
        "alt_names": null,
        "entity": json,
    }))
    .unwrap();
    assert!(decoded.alt_names.is_empty());
    assert!(decoded.pictures.is_empty());
    assert_eq!(
        serde_json::to_value(&decoded).unwrap()["pictures"],
        serde_json::json!([])
    );
}

#[test]
fn aggregate_requires_entity() {
    let json = r#"{"alt_names":[],"pictures":[]}"#;
    assert!(serde_json::from_str::<Category>(json).is_err());
}
