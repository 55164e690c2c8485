// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use meal_planner::database::{self, models::Collection};
use meal_planner::import::{self, AggregateKind};
use std::path::PathBuf;
use uuid::Uuid;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
struct Args {
    /// Use this database file instead of the one in the user data directory.
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log what is being read and written.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Recipe,
    Category,
    Planner,
}

impl From<Kind> for AggregateKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Recipe => Self::Recipe,
            Kind::Category => Self::Category,
            Kind::Planner => Self::Planner,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import one aggregate, or an array of them, from a JSON file.
    Import { kind: Kind, path: PathBuf },
    /// Print an aggregate as JSON.
    Show { kind: Kind, id: Uuid },
    /// Apply a JSON patch (or an array of patches) to a stored record.
    Patch {
        collection: Collection,
        id: Uuid,
        path: PathBuf,
    },
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/meal_planner/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("meal_planner");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn show(conn: &mut database::Connection, kind: Kind, id: Uuid) -> Result<String> {
    Ok(match kind {
        Kind::Recipe => serde_json::to_string(&database::load_recipe(conn, id)?)?,
        Kind::Category => serde_json::to_string(&database::load_category(conn, id)?)?,
        Kind::Planner => serde_json::to_string(&database::load_planner(conn, id)?)?,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;

    let database_path = match args.database {
        Some(path) => path,
        None => data_path()?.join("data.sqlite"),
    };
    let mut conn = database::establish_connection(database_path)?;
    match args.commands {
        Commands::Import { kind, path } => {
            let count = import::import_file(&mut conn, kind.into(), path)?;
            println!("imported {count}");
        }
        Commands::Show { kind, id } => println!("{}", show(&mut conn, kind, id)?),
        Commands::Patch {
            collection,
            id,
            path,
        } => println!("{}", import::patch_file(&mut conn, collection, id, path)?),
    }
    Ok(())
}
