// Copyright 2023 Remi Bernotavicius

//! Gathers every row an aggregate needs and hands them to the [`Assembler`].

use super::models::{Collection, Document};
use super::repository::{find_by_entity, get};
use super::Connection;
use crate::assemble::{Assembler, Rows};
use crate::model::aggregate;
use crate::model::entity::{
    AltName, Category, Ingredient, Picture, Planner, PlannerInterval, PlannerRecipe, Recipe,
    RecipeCategory, RecipeIngredient, RecipeMeasure, RecipeProcess, Unit,
};
use crate::Result;
use std::collections::HashSet;
use uuid::Uuid;

struct RowLoader<'c> {
    conn: &'c mut Connection,
    rows: Rows,
    // Shared records (a category used by two recipes, say) are only loaded once.
    // Ids are only unique within a collection.
    visited: HashSet<(Collection, Uuid)>,
}

impl<'c> RowLoader<'c> {
    fn new(conn: &'c mut Connection) -> Self {
        Self {
            conn,
            rows: Rows::default(),
            visited: HashSet::new(),
        }
    }

    fn first_visit<D: Document>(&mut self, id: Uuid) -> bool {
        self.visited.insert((D::COLLECTION, id))
    }

    fn alt_names(&mut self, owner: Uuid) -> Result<()> {
        let alt_names = find_by_entity::<AltName>(self.conn, owner)?;
        self.rows.alt_names.extend(alt_names);
        Ok(())
    }

    /// Alternate names and pictures of `owner`, and the pictures' names.
    fn decorations(&mut self, owner: Uuid) -> Result<()> {
        self.alt_names(owner)?;
        let pictures = find_by_entity::<Picture>(self.conn, owner)?;
        for picture in &pictures {
            self.alt_names(picture.id)?;
        }
        self.rows.pictures.extend(pictures);
        Ok(())
    }

    fn category(&mut self, category: Category) -> Result<()> {
        if self.first_visit::<Category>(category.id) {
            self.decorations(category.id)?;
            self.rows.categories.push(category);
        }
        Ok(())
    }

    fn ingredient(&mut self, id: Uuid) -> Result<()> {
        if self.first_visit::<Ingredient>(id) {
            let ingredient = get::<Ingredient>(self.conn, id)?;
            self.rows.ingredients.push(ingredient);
        }
        Ok(())
    }

    fn unit(&mut self, id: Uuid) -> Result<()> {
        if self.first_visit::<Unit>(id) {
            let unit = get::<Unit>(self.conn, id)?;
            self.rows.units.push(unit);
        }
        Ok(())
    }

    fn recipe(&mut self, recipe: Recipe) -> Result<()> {
        if !self.first_visit::<Recipe>(recipe.id) {
            return Ok(());
        }
        self.decorations(recipe.id)?;

        for link in find_by_entity::<RecipeCategory>(self.conn, recipe.id)? {
            let category = get::<Category>(self.conn, link.derive_id)?;
            self.category(category)?;
            self.rows.recipe_categories.push(link);
        }

        for usage in find_by_entity::<RecipeIngredient>(self.conn, recipe.id)? {
            self.ingredient(usage.derive_id)?;
            self.decorations(usage.id)?;
            for measure in find_by_entity::<RecipeMeasure>(self.conn, usage.id)? {
                self.unit(measure.unit_id)?;
                self.alt_names(measure.id)?;
                self.rows.recipe_measures.push(measure);
            }
            self.rows.recipe_ingredients.push(usage);
        }

        for process in find_by_entity::<RecipeProcess>(self.conn, recipe.id)? {
            self.decorations(process.id)?;
            self.rows.recipe_processes.push(process);
        }

        self.rows.recipes.push(recipe);
        Ok(())
    }

    fn planner(&mut self, planner: Planner) -> Result<()> {
        for interval in find_by_entity::<PlannerInterval>(self.conn, planner.id)? {
            for planned in find_by_entity::<PlannerRecipe>(self.conn, interval.id)? {
                if !self.visited.contains(&(Collection::Recipes, planned.recipe_id)) {
                    let recipe = get::<Recipe>(self.conn, planned.recipe_id)?;
                    self.recipe(recipe)?;
                }
                self.rows.planner_recipes.push(planned);
            }
            self.rows.planner_intervals.push(interval);
        }
        self.rows.planners.push(planner);
        Ok(())
    }
}

pub fn load_category(conn: &mut Connection, id: Uuid) -> Result<aggregate::Category> {
    let category = get::<Category>(conn, id)?;
    let mut loader = RowLoader::new(conn);
    loader.category(category.clone())?;
    Ok(Assembler::new(&loader.rows).category(&category))
}

pub fn load_recipe(conn: &mut Connection, id: Uuid) -> Result<aggregate::Recipe> {
    let recipe = get::<Recipe>(conn, id)?;
    let mut loader = RowLoader::new(conn);
    loader.recipe(recipe.clone())?;
    Ok(Assembler::new(&loader.rows).recipe(&recipe)?)
}

pub fn load_planner(conn: &mut Connection, id: Uuid) -> Result<aggregate::Planner> {
    let planner = get::<Planner>(conn, id)?;
    let mut loader = RowLoader::new(conn);
    loader.planner(planner.clone())?;
    Ok(Assembler::new(&loader.rows).planner(&planner)?)
}

#[cfg(test)]
fn store_rows(conn: &mut Connection, rows: &Rows) {
    use super::repository::save;

    rows.alt_names.iter().for_each(|r| save(conn, r).unwrap());
    rows.pictures.iter().for_each(|r| save(conn, r).unwrap());
    rows.categories.iter().for_each(|r| save(conn, r).unwrap());
    rows.ingredients.iter().for_each(|r| save(conn, r).unwrap());
    rows.units.iter().for_each(|r| save(conn, r).unwrap());
    rows.recipes.iter().for_each(|r| save(conn, r).unwrap());
    rows.recipe_categories.iter().for_each(|r| save(conn, r).unwrap());
    rows.recipe_ingredients.iter().for_each(|r| save(conn, r).unwrap());
    rows.recipe_measures.iter().for_each(|r| save(conn, r).unwrap());
    rows.recipe_processes.iter().for_each(|r| save(conn, r).unwrap());
    rows.planners.iter().for_each(|r| save(conn, r).unwrap());
    rows.planner_intervals.iter().for_each(|r| save(conn, r).unwrap());
    rows.planner_recipes.iter().for_each(|r| save(conn, r).unwrap());
}

#[test]
fn load_stored_aggregates() {
    use crate::model::aggregate::fixtures;

    let mut conn = super::establish_connection(":memory:").unwrap();
    let planner = fixtures::planner(1);
    let category = fixtures::category(5000);
    let mut rows = Rows::default();
    rows.push_planner(&planner);
    rows.push_category(&category);
    store_rows(&mut conn, &rows);

    assert_eq!(load_planner(&mut conn, planner.entity.id).unwrap(), planner);
    assert_eq!(load_category(&mut conn, category.entity.id).unwrap(), category);

    let recipe = &planner.intervals[0].recipes[0].recipe;
    assert_eq!(load_recipe(&mut conn, recipe.entity.id).unwrap(), *recipe);
}

#[test]
fn shared_recipe_loads_once() {
    use crate::model::aggregate::fixtures;

    let mut conn = super::establish_connection(":memory:").unwrap();
    let mut planner = fixtures::planner(1);
    let mut second = planner.intervals[0].clone();
    second.entity.id = Uuid::from_u128(50);
    second.recipes[0].entity.id = Uuid::from_u128(51);
    second.recipes[0].entity.entity_id = second.entity.id;
    planner.intervals.push(second);

    let mut rows = Rows::default();
    rows.push_planner(&planner);
    store_rows(&mut conn, &rows);

    let loaded = load_planner(&mut conn, planner.entity.id).unwrap();
    assert_eq!(loaded, planner);
    assert_eq!(loaded.intervals[1].recipes[0].recipe.alt_names.len(), 1);
}

#[test]
fn missing_root() {
    let mut conn = super::establish_connection(":memory:").unwrap();
    let err = load_recipe(&mut conn, Uuid::from_u128(1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "no document in recipes with id 00000000-0000-0000-0000-000000000001"
    );
}

#[test]
fn ids_only_unique_within_a_collection() {
    use crate::model::aggregate::fixtures;

    let mut conn = super::establish_connection(":memory:").unwrap();
    let mut recipe = fixtures::recipe(1);
    let ingredient_id = recipe.ingredients[0].derive.id;
    let measure = &mut recipe.ingredients[0].measures[0];
    measure.entity.unit_id = ingredient_id;
    measure.unit.id = ingredient_id;

    let mut rows = Rows::default();
    rows.push_recipe(&recipe);
    store_rows(&mut conn, &rows);

    assert_eq!(load_recipe(&mut conn, recipe.entity.id).unwrap(), recipe);
}
