// Copyright 2023 Remi Bernotavicius

use crate::model::entity::{
    AltName, Category, Entity, Ingredient, Picture, Planner, PlannerInterval, PlannerRecipe,
    Recipe, RecipeCategory, RecipeIngredient, RecipeMeasure, RecipeProcess, Unit,
};
use derive_more::Display;
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::Insertable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use std::str::FromStr;
use strum::EnumIter;
use uuid::Uuid;

/// Which kind of entity a stored document holds.
#[derive(Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, DbEnum)]
pub enum Collection {
    #[display("alt_names")]
    AltNames,
    #[display("categories")]
    Categories,
    #[display("ingredients")]
    Ingredients,
    #[display("pictures")]
    Pictures,
    #[display("units")]
    Units,
    #[display("recipes")]
    Recipes,
    #[display("recipe_categories")]
    RecipeCategories,
    #[display("recipe_ingredients")]
    RecipeIngredients,
    #[display("recipe_measures")]
    RecipeMeasures,
    #[display("recipe_processes")]
    RecipeProcesses,
    #[display("planners")]
    Planners,
    #[display("planner_intervals")]
    PlannerIntervals,
    #[display("planner_recipes")]
    PlannerRecipes,
}

impl Collection {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown collection {0:?}")]
pub struct UnknownCollection(String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|c| c.to_string() == s)
            .ok_or_else(|| UnknownCollection(s.into()))
    }
}

/// A stored entity: knows which collection it lives in.
pub trait Document: Entity {
    const COLLECTION: Collection;
}

macro_rules! impl_document {
    ($($entity:ty => $collection:ident),+ $(,)?) => {$(
        impl Document for $entity {
            const COLLECTION: Collection = Collection::$collection;
        }
    )+};
}

impl_document! {
    AltName => AltNames,
    Category => Categories,
    Ingredient => Ingredients,
    Picture => Pictures,
    Unit => Units,
    Recipe => Recipes,
    RecipeCategory => RecipeCategories,
    RecipeIngredient => RecipeIngredients,
    RecipeMeasure => RecipeMeasures,
    RecipeProcess => RecipeProcesses,
    Planner => Planners,
    PlannerInterval => PlannerIntervals,
    PlannerRecipe => PlannerRecipes,
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, Clone)]
pub struct DocumentId(String);

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

#[derive(Queryable, Selectable, Clone)]
#[diesel(table_name = crate::database::schema::documents)]
pub struct DocumentRow {
    pub seq: i32,
    pub collection: Collection,
    pub id: DocumentId,
    pub entity_id: Option<String>,
    pub body: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::database::schema::documents)]
pub struct NewDocument<'a> {
    pub collection: Collection,
    pub id: DocumentId,
    pub entity_id: Option<String>,
    pub body: &'a str,
}

impl<'a> NewDocument<'a> {
    pub fn new<D: Document>(document: &D, body: &'a str) -> Self {
        Self {
            collection: D::COLLECTION,
            id: document.id().into(),
            entity_id: document.parent_id().map(|id| id.to_string()),
            body,
        }
    }
}

#[test]
fn collection_names() {
    for collection in Collection::iter() {
        let name = collection.to_string();
        assert_eq!(name.parse::<Collection>().unwrap(), collection);
    }
    assert_eq!(Collection::iter().count(), 13);
    assert_eq!(
        "recipe_measures".parse::<Collection>().unwrap(),
        Collection::RecipeMeasures
    );
    assert!("RecipeMeasures".parse::<Collection>().is_err());
    assert_eq!(<AltName as Document>::COLLECTION, Collection::AltNames);
}
