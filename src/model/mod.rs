// Copyright 2023 Remi Bernotavicius

pub mod aggregate;
pub mod codec;
pub mod entity;
pub mod patch;
pub mod status;

pub use entity::Entity;
pub use patch::*;
pub use status::*;
