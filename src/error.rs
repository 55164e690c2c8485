// Copyright 2023 Remi Bernotavicius

use crate::assemble::AssembleError;
use crate::database::models::Collection;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open database: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("migration failed: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync>),

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no document in {collection} with id {id}")]
    NotFound { collection: Collection, id: Uuid },

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
