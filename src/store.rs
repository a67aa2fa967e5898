use chrono::NaiveDate;
use sqlx::{
    Connection, Decode, Row, Sqlite, SqliteConnection, Type,
    sqlite::{SqliteConnectOptions, SqliteRow},
};

use std::str::FromStr;

use crate::{
    config::DbConfig,
    error::{StoreError, StoreResult},
    models::{Person, RawPerson},
};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS person (
            id INTEGER PRIMARY KEY,
            first_name TEXT,
            last_name TEXT,
            birth_date DATE)"#;
const SELECT_ALL_SQL: &str = "SELECT * FROM person";
const INSERT_SQL: &str = "INSERT INTO person(first_name,last_name,birth_date) VALUES(?,?,?)";
const UPDATE_SQL: &str = "UPDATE person SET first_name=?, last_name=?, birth_date=? WHERE id=?";
const DELETE_SQL: &str = "DELETE FROM person WHERE id=?";

/// CRUD boundary over the `person` table.
///
/// Every operation opens its own connection, runs one statement and closes the
/// connection again before returning, whatever the outcome.
#[derive(Debug, Clone)]
pub struct PersonStore {
    config: DbConfig,
}

impl PersonStore {
    pub fn new(config: DbConfig) -> Self {
        if !config.user.is_empty() {
            tracing::debug!(
                "SQLite does not authenticate, ignoring credentials for user {}",
                config.user
            );
        }
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    async fn connect(&self, operation: &'static str) -> StoreResult<SqliteConnection> {
        let options = SqliteConnectOptions::from_str(&self.config.url)
            .map_err(|e| StoreError::unavailable(operation, e))?
            .create_if_missing(true);

        SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| StoreError::unavailable(operation, e))
    }

    async fn release(connection: SqliteConnection) {
        if let Err(e) = connection.close().await {
            tracing::warn!("Closing database connection failed: {:?}", e);
        }
    }

    pub async fn create_table(&self) -> StoreResult<()> {
        tracing::info!("Creating person table if missing");

        let mut connection = self.connect("creating person table").await?;
        let result = sqlx::query(CREATE_TABLE_SQL).execute(&mut connection).await;
        Self::release(connection).await;

        result.map_err(|e| StoreError::unavailable("creating person table", e))?;
        Ok(())
    }

    /// Returns every stored person in storage order.
    ///
    /// Rows are rebuilt as they are, without re-running the field rules.
    pub async fn list_all(&self) -> StoreResult<Vec<Person>> {
        tracing::debug!("{}", SELECT_ALL_SQL);

        let mut connection = self.connect("listing people").await?;
        let result = sqlx::query(SELECT_ALL_SQL).fetch_all(&mut connection).await;
        Self::release(connection).await;

        let rows = result.map_err(|e| StoreError::unavailable("listing people", e))?;
        let people = rows
            .iter()
            .map(person_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::unavailable("reading person rows", e))?;

        tracing::info!("Loaded {} people", people.len());
        Ok(people)
    }

    /// Returns every stored row as unvalidated input.
    ///
    /// Unlike [`PersonStore::list_all`] a NULL or undecodable column does not fail
    /// the query, it comes back as `None`. Used to inspect and repair rows
    /// written outside this store.
    pub async fn list_raw(&self) -> StoreResult<Vec<RawPerson>> {
        tracing::debug!("{}", SELECT_ALL_SQL);

        let mut connection = self.connect("listing raw person rows").await?;
        let result = sqlx::query(SELECT_ALL_SQL).fetch_all(&mut connection).await;
        Self::release(connection).await;

        let rows = result.map_err(|e| StoreError::unavailable("listing raw person rows", e))?;
        rows.iter()
            .map(raw_person_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::unavailable("reading raw person rows", e))
    }

    /// Inserts a new row and returns the id the database assigned to it.
    pub async fn insert(&self, person: &Person) -> StoreResult<i64> {
        tracing::debug!("{}", INSERT_SQL);

        let mut connection = self.connect("inserting person").await?;
        let result = sqlx::query(INSERT_SQL)
            .bind(person.first_name())
            .bind(person.last_name())
            .bind(person.birth_date())
            .execute(&mut connection)
            .await;
        Self::release(connection).await;

        let id = result
            .map_err(|e| StoreError::unavailable("inserting person", e))?
            .last_insert_rowid();

        tracing::info!("Person {} stored", id);
        Ok(id)
    }

    /// Overwrites the row matching `person.id()`. Returns the number of rows changed.
    pub async fn update(&self, person: &Person) -> StoreResult<u64> {
        tracing::debug!("{}", UPDATE_SQL);

        let mut connection = self.connect("updating person").await?;
        let result = sqlx::query(UPDATE_SQL)
            .bind(person.first_name())
            .bind(person.last_name())
            .bind(person.birth_date())
            .bind(person.id())
            .execute(&mut connection)
            .await;
        Self::release(connection).await;

        let changed = result
            .map_err(|e| StoreError::unavailable("updating person", e))?
            .rows_affected();

        if changed == 0 {
            tracing::warn!("No person with id {} to update", person.id());
        } else {
            tracing::info!("Person {} updated", person.id());
        }
        Ok(changed)
    }

    /// Removes the row with `id`. Returns the number of rows removed.
    pub async fn delete(&self, id: i64) -> StoreResult<u64> {
        tracing::debug!("{}", DELETE_SQL);

        let mut connection = self.connect("deleting person").await?;
        let result = sqlx::query(DELETE_SQL)
            .bind(id)
            .execute(&mut connection)
            .await;
        Self::release(connection).await;

        let removed = result
            .map_err(|e| StoreError::unavailable("deleting person", e))?
            .rows_affected();

        if removed == 0 {
            tracing::warn!("No person with id {} to delete", id);
        } else {
            tracing::info!("Person {} deleted", id);
        }
        Ok(removed)
    }
}

fn person_from_row(row: &SqliteRow) -> Result<Person, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let first_name: Option<String> = row.try_get("first_name")?;
    let last_name: Option<String> = row.try_get("last_name")?;
    let birth_date: NaiveDate = row.try_get("birth_date")?;

    Ok(Person::from_stored(
        id,
        first_name.unwrap_or_default(),
        last_name.unwrap_or_default(),
        birth_date,
    ))
}

fn raw_person_from_row(row: &SqliteRow) -> Result<RawPerson, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    Ok(RawPerson {
        id,
        first_name: lenient_column(row, id, "first_name"),
        last_name: lenient_column(row, id, "last_name"),
        birth_date: lenient_column(row, id, "birth_date"),
    })
}

fn lenient_column<'r, T>(row: &'r SqliteRow, id: i64, column: &str) -> Option<T>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    match row.try_get::<Option<T>, _>(column) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Person {} has an unreadable {}: {}", id, column, e);
            None
        }
    }
}
