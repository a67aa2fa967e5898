//! Multi-step flows over the store: editing a stored person and auditing the
//! table for rows that break the field rules.

use chrono::NaiveDate;

use crate::{
    error::{EditError, Field, PersonError, StoreResult},
    models::{self, Person, RawPerson},
    store::PersonStore,
};

/// Fields to overwrite on an existing person, `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PersonChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    pub id: i64,
    pub error: PersonError,
}

#[derive(Debug, Default)]
pub struct AuditReport {
    pub checked: usize,
    pub malformed: Vec<Malformed>,
}

/// Applies `changes` to the stored person `id` and writes it back.
///
/// New values are checked by their own rule first. The merged record must then
/// pass every rule, so a row stored with a bad field is only written once that
/// field is corrected.
pub async fn edit_person(
    store: &PersonStore,
    id: i64,
    changes: &PersonChanges,
) -> Result<Person, EditError> {
    let stored = store
        .list_raw()
        .await?
        .into_iter()
        .find(|raw| raw.id == id)
        .ok_or(EditError::NotFound(id))?;

    let first_name = match &changes.first_name {
        Some(name) => Some(
            models::validate_name(Field::FirstName, Some(name)).map_err(EditError::Invalid)?,
        ),
        None => stored.first_name,
    };
    let last_name = match &changes.last_name {
        Some(name) => Some(
            models::validate_name(Field::LastName, Some(name)).map_err(EditError::Invalid)?,
        ),
        None => stored.last_name,
    };
    let birth_date = match changes.birth_date {
        Some(date) => {
            Some(models::validate_birth_date(Some(date)).map_err(EditError::Invalid)?)
        }
        None => stored.birth_date,
    };

    let person = Person::from_raw(&RawPerson {
        id,
        first_name,
        last_name,
        birth_date,
    })
    .map_err(EditError::StillMalformed)?;

    store.update(&person).await?;
    Ok(person)
}

/// Runs every field rule over every stored row.
pub async fn audit(store: &PersonStore) -> StoreResult<AuditReport> {
    let rows = store.list_raw().await?;

    let malformed: Vec<Malformed> = rows
        .iter()
        .filter_map(|raw| {
            Person::from_raw(raw).err().map(|error| Malformed { id: raw.id, error })
        })
        .collect();

    tracing::info!("Audited {} people, {} malformed", rows.len(), malformed.len());
    Ok(AuditReport {
        checked: rows.len(),
        malformed,
    })
}
