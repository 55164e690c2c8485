// Copyright 2023 Remi Bernotavicius

//! The document store the entities are kept in. Each entity is one JSON
//! document in a single SQLite table, keyed by collection and id.

use crate::{Error, Result};
use diesel::prelude::Connection as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod load;
pub mod models;
pub mod repository;
pub mod schema;

pub use load::{load_category, load_planner, load_recipe};

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Opens (or creates) the database at `path` and brings its schema up to date.
/// `":memory:"` gives a private in-memory database.
pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let mut connection = Connection::establish(&path.as_ref().to_string_lossy())?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    Ok(connection)
}

#[test]
fn migrations() {
    let mut conn = establish_connection(":memory:").unwrap();
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());

    conn.revert_last_migration(MIGRATIONS).unwrap();
    assert!(conn.has_pending_migration(MIGRATIONS).unwrap());
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}
