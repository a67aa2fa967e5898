use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use person_registry::{
    DbConfig, Person, PersonStore, UNSAVED_ID,
    config::{self, Overrides},
    ops::{self, PersonChanges},
    seed,
    transfer::{self, DATE_FORMAT},
};

mod commands;

use commands::{Args, Commands};

fn resolve_config(args: &Args) -> Result<DbConfig> {
    tracing::info!("Setting up environment");

    config::load_env_file(args.env_file.as_deref())?;

    let overrides = Overrides {
        url: args.database_url.clone(),
        user: args.database_user.clone(),
        password: args.database_password.clone(),
    };
    let config = DbConfig::resolve(&overrides, |key| std::env::var(key).ok())
        .context("No database configured, set DATABASE_URL or pass --database-url")?;

    tracing::debug!("Using {:?}", config);
    Ok(config)
}

fn print_people(people: &[Person]) {
    println!("{:>6}  {:<20} {:<20} {}", "id", "first name", "last name", "birth date");
    for person in people {
        println!(
            "{:>6}  {:<20} {:<20} {}",
            person.id(),
            person.first_name(),
            person.last_name(),
            person.birth_date().format(DATE_FORMAT)
        );
    }
}

async fn list(store: &PersonStore) -> Result<()> {
    let people = store
        .list_all()
        .await
        .context("Could not load people")?;
    print_people(&people);
    Ok(())
}

async fn add(
    store: &PersonStore,
    first_name: &str,
    last_name: &str,
    birth_date: NaiveDate,
) -> Result<()> {
    let person = Person::new(UNSAVED_ID, first_name, last_name, birth_date)
        .context("Invalid person data")?;
    let id = store
        .insert(&person)
        .await
        .context("Error adding person")?;
    println!("Added person {id}");
    Ok(())
}

async fn edit(store: &PersonStore, id: i64, changes: &PersonChanges) -> Result<()> {
    ops::edit_person(store, id, changes)
        .await
        .context("Error editing person")?;
    println!("Updated person {id}");
    Ok(())
}

async fn delete(store: &PersonStore, id: i64) -> Result<()> {
    store.delete(id).await.context("Error deleting person")?;
    println!("Deleted person {id}");
    Ok(())
}

async fn audit(store: &PersonStore) -> Result<()> {
    let report = ops::audit(store).await.context("Could not audit people")?;
    for malformed in &report.malformed {
        println!("person {}: {}", malformed.id, malformed.error);
    }
    println!(
        "{} of {} stored people are malformed",
        report.malformed.len(),
        report.checked
    );
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let Some(command) = args.command.as_ref() else {
        println!("Run with --help to see instructions");
        return Ok(());
    };

    let start = std::time::Instant::now();
    let store = PersonStore::new(resolve_config(&args)?);

    match command {
        Commands::Init => store
            .create_table()
            .await
            .context("Could not create person table")?,
        Commands::List => list(&store).await?,
        Commands::Add {
            first_name,
            last_name,
            birth_date,
        } => add(&store, first_name, last_name, *birth_date).await?,
        Commands::Edit {
            id,
            first_name,
            last_name,
            birth_date,
        } => {
            let changes = PersonChanges {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                birth_date: *birth_date,
            };
            edit(&store, *id, &changes).await?
        }
        Commands::Delete { id } => delete(&store, *id).await?,
        Commands::Import { file } => {
            let report = transfer::import_csv(&store, file)
                .await
                .with_context(|| format!("Import from {} failed", file.display()))?;
            for rejection in &report.rejected {
                eprintln!("line {}: {}", rejection.line, rejection.error);
            }
            println!(
                "Imported {} people, rejected {}",
                report.imported,
                report.rejected.len()
            );
        }
        Commands::Export { file } => {
            let written = transfer::export_csv(&store, file)
                .await
                .with_context(|| format!("Export to {} failed", file.display()))?;
            println!("Exported {written} people");
        }
        Commands::Seed { count } => {
            let ids = seed::seed(&store, *count)
                .await
                .context("Seeding failed")?;
            println!("Seeded {} people", ids.len());
        }
        Commands::Audit => audit(&store).await?,
    }

    tracing::info!("Command completed in {:?}", start.elapsed());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    run(Args::parse()).await
}
