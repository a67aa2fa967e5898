use chrono::NaiveDate;
use clap::{Parser, Subcommand, command};

use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Manage person records stored in SQLite")]
pub struct Args {
    /// Env file to load before reading settings (defaults to ./.env when present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Database URL, e.g. sqlite://people.db
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Database user
    #[arg(long, global = true)]
    pub database_user: Option<String>,

    /// Database password
    #[arg(long, global = true)]
    pub database_password: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the person table
    Init,
    /// Reload and print every stored person
    List,
    /// Add a new person
    Add {
        first_name: String,
        last_name: String,
        /// Birth date as YYYY-MM-DD
        birth_date: NaiveDate,
    },
    /// Edit the fields of an existing person
    Edit {
        id: i64,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Birth date as YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },
    /// Delete a person by id
    Delete { id: i64 },
    /// Import people from a CSV file with first_name,last_name,birth_date columns
    Import { file: PathBuf },
    /// Export all people to a CSV file
    Export { file: PathBuf },
    /// Insert randomly generated people
    Seed {
        /// The number of people to create
        count: u32,
    },
    /// Re-validate every stored person and report malformed rows
    Audit,
}
