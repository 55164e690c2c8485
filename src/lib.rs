// Copyright 2023 Remi Bernotavicius

//! Meal planning data: recipes, their ingredients, categories and pictures,
//! and planners that schedule recipes into time slots.
//!
//! Records are flat [`model::entity`] types, changed through [`merge`] and
//! composed into [`model::aggregate`] trees by [`assemble`] for output.

pub mod assemble;
pub mod database;
mod error;
pub mod import;
pub mod merge;
pub mod model;

pub use error::{Error, Result};
