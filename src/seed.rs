use chrono::{Days, NaiveDate};
use rand::Rng;

use crate::{
    error::{PersonError, StoreResult},
    models::{self, Person, UNSAVED_ID},
    store::PersonStore,
};

const FIRST_NAMES: [&str; 10] = [
    "María", "José", "Lucía", "Álvaro", "Inés", "Jesús", "Sofía", "Íñigo", "Begoña", "Óscar",
];
const LAST_NAMES: [&str; 10] = [
    "Pérez",
    "García",
    "Fernández",
    "López",
    "Martínez",
    "Sánchez",
    "Gómez",
    "Muñoz",
    "Ibáñez",
    "Ruiz",
];

/// Builds an unsaved person with a birth date between 1900-01-01 and `today`.
pub fn random_person<R: Rng>(
    rng: &mut R,
    today: NaiveDate,
) -> Result<Person, PersonError> {
    let first_name = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last_name = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];

    let oldest = models::oldest_birth_date();
    let span = u64::try_from((today - oldest).num_days()).unwrap_or(0);
    let birth_date = oldest
        .checked_add_days(Days::new(rng.random_range(0..=span)))
        .unwrap_or(oldest);

    Person::new_on(UNSAVED_ID, first_name, last_name, birth_date, today)
}

/// Inserts `count` random people and returns their ids.
pub async fn seed(store: &PersonStore, count: u32) -> StoreResult<Vec<i64>> {
    tracing::info!("Seeding {} people", count);

    let today = models::today();
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        // Names come from fixed valid lists and the date range is bounded, so
        // this only fails if the lists are edited into something invalid.
        let person = match random_person(&mut rand::rng(), today) {
            Ok(person) => person,
            Err(e) => {
                tracing::error!("Generated an invalid person: {}", e);
                continue;
            }
        };
        ids.push(store.insert(&person).await?);
    }

    tracing::info!("Seeded {} people", ids.len());
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_people_are_valid() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let mut rng = rand::rng();
        for _ in 0..500 {
            let person = random_person(&mut rng, today).unwrap();
            assert_eq!(person.id(), UNSAVED_ID);
            assert!(person.birth_date() <= today);
            assert!(person.birth_date() >= models::oldest_birth_date());
        }
    }

    #[test]
    fn name_lists_pass_validation() {
        let today = models::today();
        for name in FIRST_NAMES.iter().chain(LAST_NAMES.iter()) {
            assert!(Person::new_on(0, name, name, today, today).is_ok(), "{name}");
        }
    }
}
