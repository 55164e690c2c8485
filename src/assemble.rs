// Copyright 2023 Remi Bernotavicius

//! Composes flat rows into aggregate trees, and flattens trees back into rows.
//!
//! Nothing here queries anything. The caller fetches whatever rows are
//! relevant, drops them into [`Rows`], and the [`Assembler`] groups children
//! under their parents by foreign key. Children keep the order they were
//! supplied in, and nothing is deduplicated or cross-checked.

use crate::model::aggregate;
use crate::model::entity::{self, Entity as _};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("cannot assemble: no {kind} with id {id}")]
    Missing { kind: &'static str, id: Uuid },
}

type Result<T> = std::result::Result<T, AssembleError>;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Rows {
    pub alt_names: Vec<entity::AltName>,
    pub pictures: Vec<entity::Picture>,
    pub categories: Vec<entity::Category>,
    pub ingredients: Vec<entity::Ingredient>,
    pub units: Vec<entity::Unit>,
    pub recipes: Vec<entity::Recipe>,
    pub recipe_categories: Vec<entity::RecipeCategory>,
    pub recipe_ingredients: Vec<entity::RecipeIngredient>,
    pub recipe_measures: Vec<entity::RecipeMeasure>,
    pub recipe_processes: Vec<entity::RecipeProcess>,
    pub planners: Vec<entity::Planner>,
    pub planner_intervals: Vec<entity::PlannerInterval>,
    pub planner_recipes: Vec<entity::PlannerRecipe>,
}

fn children_of<E: entity::Entity>(rows: &[E], parent: Uuid) -> impl Iterator<Item = &E> {
    rows.iter().filter(move |r| r.parent_id() == Some(parent))
}

fn lookup<'r, E: entity::Entity>(rows: &'r [E], kind: &'static str, id: Uuid) -> Result<&'r E> {
    rows.iter()
        .find(|r| r.id() == id)
        .ok_or(AssembleError::Missing { kind, id })
}

pub struct Assembler<'r> {
    rows: &'r Rows,
}

impl<'r> Assembler<'r> {
    pub fn new(rows: &'r Rows) -> Self {
        Self { rows }
    }

    fn alt_names(&self, owner: Uuid) -> Vec<entity::AltName> {
        children_of(&self.rows.alt_names, owner).cloned().collect()
    }

    fn pictures(&self, owner: Uuid) -> Vec<aggregate::Picture> {
        children_of(&self.rows.pictures, owner)
            .map(|p| self.picture(p))
            .collect()
    }

    pub fn picture(&self, entity: &entity::Picture) -> aggregate::Picture {
        aggregate::Picture {
            alt_names: self.alt_names(entity.id),
            entity: entity.clone(),
        }
    }

    pub fn category(&self, entity: &entity::Category) -> aggregate::Category {
        aggregate::Category {
            alt_names: self.alt_names(entity.id),
            entity: entity.clone(),
            pictures: self.pictures(entity.id),
        }
    }

    pub fn recipe_category(
        &self,
        entity: &entity::RecipeCategory,
    ) -> Result<aggregate::RecipeCategory> {
        let derive = lookup(&self.rows.categories, "category", entity.derive_id)?;
        Ok(aggregate::RecipeCategory {
            derive: self.category(derive),
            entity: entity.clone(),
        })
    }

    pub fn recipe_measure(
        &self,
        entity: &entity::RecipeMeasure,
    ) -> Result<aggregate::RecipeMeasure> {
        let unit = lookup(&self.rows.units, "unit", entity.unit_id)?;
        Ok(aggregate::RecipeMeasure {
            alt_names: self.alt_names(entity.id),
            entity: entity.clone(),
            unit: unit.clone(),
        })
    }

    pub fn recipe_ingredient(
        &self,
        entity: &entity::RecipeIngredient,
    ) -> Result<aggregate::RecipeIngredient> {
        let derive = lookup(&self.rows.ingredients, "ingredient", entity.derive_id)?;
        Ok(aggregate::RecipeIngredient {
            alt_names: self.alt_names(entity.id),
            derive: derive.clone(),
            entity: entity.clone(),
            measures: children_of(&self.rows.recipe_measures, entity.id)
                .map(|m| self.recipe_measure(m))
                .collect::<Result<_>>()?,
            pictures: self.pictures(entity.id),
        })
    }

    pub fn recipe_process(&self, entity: &entity::RecipeProcess) -> aggregate::RecipeProcess {
        aggregate::RecipeProcess {
            alt_names: self.alt_names(entity.id),
            entity: entity.clone(),
            pictures: self.pictures(entity.id),
        }
    }

    pub fn recipe(&self, entity: &entity::Recipe) -> Result<aggregate::Recipe> {
        Ok(aggregate::Recipe {
            alt_names: self.alt_names(entity.id),
            categories: children_of(&self.rows.recipe_categories, entity.id)
                .map(|c| self.recipe_category(c))
                .collect::<Result<_>>()?,
            entity: entity.clone(),
            ingredients: children_of(&self.rows.recipe_ingredients, entity.id)
                .map(|i| self.recipe_ingredient(i))
                .collect::<Result<_>>()?,
            processes: children_of(&self.rows.recipe_processes, entity.id)
                .map(|p| self.recipe_process(p))
                .collect(),
            pictures: self.pictures(entity.id),
        })
    }

    pub fn planner_recipe(
        &self,
        entity: &entity::PlannerRecipe,
    ) -> Result<aggregate::PlannerRecipe> {
        let recipe = lookup(&self.rows.recipes, "recipe", entity.recipe_id)?;
        Ok(aggregate::PlannerRecipe {
            entity: entity.clone(),
            recipe: self.recipe(recipe)?,
        })
    }

    pub fn planner_interval(
        &self,
        entity: &entity::PlannerInterval,
    ) -> Result<aggregate::PlannerInterval> {
        Ok(aggregate::PlannerInterval {
            entity: entity.clone(),
            recipes: children_of(&self.rows.planner_recipes, entity.id)
                .map(|r| self.planner_recipe(r))
                .collect::<Result<_>>()?,
        })
    }

    pub fn planner(&self, entity: &entity::Planner) -> Result<aggregate::Planner> {
        Ok(aggregate::Planner {
            entity: entity.clone(),
            intervals: children_of(&self.rows.planner_intervals, entity.id)
                .map(|i| self.planner_interval(i))
                .collect::<Result<_>>()?,
        })
    }
}

/// Flattening. Shared sub-trees (say the same category on two recipes) are
/// pushed once per occurrence.
impl Rows {
    pub fn push_picture(&mut self, picture: &aggregate::Picture) {
        self.alt_names.extend(picture.alt_names.iter().cloned());
        self.pictures.push(picture.entity.clone());
    }

    fn push_pictures(&mut self, pictures: &[aggregate::Picture]) {
        for picture in pictures {
            self.push_picture(picture);
        }
    }

    pub fn push_category(&mut self, category: &aggregate::Category) {
        self.alt_names.extend(category.alt_names.iter().cloned());
        self.categories.push(category.entity.clone());
        self.push_pictures(&category.pictures);
    }

    pub fn push_recipe(&mut self, recipe: &aggregate::Recipe) {
        self.alt_names.extend(recipe.alt_names.iter().cloned());
        for category in &recipe.categories {
            self.push_category(&category.derive);
            self.recipe_categories.push(category.entity.clone());
        }
        self.recipes.push(recipe.entity.clone());
        for ingredient in &recipe.ingredients {
            self.alt_names.extend(ingredient.alt_names.iter().cloned());
            self.ingredients.push(ingredient.derive.clone());
            self.recipe_ingredients.push(ingredient.entity.clone());
            for measure in &ingredient.measures {
                self.alt_names.extend(measure.alt_names.iter().cloned());
                self.recipe_measures.push(measure.entity.clone());
                self.units.push(measure.unit.clone());
            }
            self.push_pictures(&ingredient.pictures);
        }
        for process in &recipe.processes {
            self.alt_names.extend(process.alt_names.iter().cloned());
            self.recipe_processes.push(process.entity.clone());
            self.push_pictures(&process.pictures);
        }
        self.push_pictures(&recipe.pictures);
    }

    pub fn push_planner(&mut self, planner: &aggregate::Planner) {
        self.planners.push(planner.entity.clone());
        for interval in &planner.intervals {
            self.planner_intervals.push(interval.entity.clone());
            for planned in &interval.recipes {
                self.planner_recipes.push(planned.entity.clone());
                self.push_recipe(&planned.recipe);
            }
        }
    }
}

#[test]
fn flatten_then_assemble() {
    use crate::model::aggregate::fixtures;

    let recipe = fixtures::recipe(1);
    let mut rows = Rows::default();
    rows.push_recipe(&recipe);
    assert_eq!(rows.recipes.len(), 1);
    assert_eq!(rows.pictures.len(), 4);
    assert_eq!(Assembler::new(&rows).recipe(&recipe.entity).unwrap(), recipe);

    let planner = fixtures::planner(1);
    let mut rows = Rows::default();
    rows.push_planner(&planner);
    assert_eq!(Assembler::new(&rows).planner(&planner.entity).unwrap(), planner);

    let category = fixtures::category(1);
    let mut rows = Rows::default();
    rows.push_category(&category);
    assert_eq!(Assembler::new(&rows).category(&category.entity), category);
}

#[test]
fn supplied_order_is_kept() {
    use crate::model::aggregate::fixtures::{alt_name, picture};

    let owner = Uuid::from_u128(1);
    let first = picture(10, owner);
    let second = picture(20, owner);
    let stranger = picture(30, Uuid::from_u128(2));

    let mut rows = Rows::default();
    rows.alt_names.push(alt_name(5, owner, "zeta"));
    rows.alt_names.push(alt_name(6, Uuid::from_u128(2), "elsewhere"));
    rows.alt_names.push(alt_name(4, owner, "alpha"));
    rows.push_picture(&second);
    rows.push_picture(&stranger);
    rows.push_picture(&first);

    let category = entity::Category {
        id: owner,
        ..Default::default()
    };
    let assembled = Assembler::new(&rows).category(&category);
    let names: Vec<_> = assembled.alt_names.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["zeta", "alpha"]);
    assert_eq!(assembled.pictures, vec![second, first]);
}

#[test]
fn missing_reference() {
    use crate::model::aggregate::fixtures;

    let recipe = fixtures::recipe(1);
    let mut rows = Rows::default();
    rows.push_recipe(&recipe);
    rows.units.clear();

    let unit_id = recipe.ingredients[0].measures[0].unit.id;
    assert_eq!(
        Assembler::new(&rows).recipe(&recipe.entity).unwrap_err(),
        AssembleError::Missing {
            kind: "unit",
            id: unit_id
        }
    );

    let planner = fixtures::planner(1);
    let mut rows = Rows::default();
    rows.push_planner(&planner);
    rows.recipes.clear();
    let err = Assembler::new(&rows).planner(&planner.entity).unwrap_err();
    assert!(err.to_string().contains("no recipe with id"));
}

#[test]
fn relation_keys_match_parents() {
    use crate::model::aggregate::fixtures;

    let planner = fixtures::planner(1);
    let mut rows = Rows::default();
    rows.push_planner(&planner);
    let assembled = Assembler::new(&rows).planner(&planner.entity).unwrap();

    for interval in &assembled.intervals {
        assert_eq!(interval.entity.entity_id, assembled.entity.id);
        for planned in &interval.recipes {
            assert_eq!(planned.entity.entity_id, interval.entity.id);
            assert_eq!(planned.entity.recipe_id, planned.recipe.entity.id);
            for category in &planned.recipe.categories {
                assert_eq!(category.entity.entity_id, planned.recipe.entity.id);
                assert_eq!(category.entity.derive_id, category.derive.entity.id);
            }
            for ingredient in &planned.recipe.ingredients {
                assert_eq!(ingredient.entity.derive_id, ingredient.derive.id);
                for measure in &ingredient.measures {
                    assert_eq!(measure.entity.entity_id, ingredient.entity.id);
                    assert_eq!(measure.entity.unit_id, measure.unit.id);
                }
            }
        }
    }
}
