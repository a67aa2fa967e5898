use chrono::{Local, NaiveDate};
use regex::Regex;

use std::sync::LazyLock;

use crate::error::{Field, PersonError};

/// Id used by records that have not been persisted yet.
pub const UNSAVED_ID: i64 = 0;

/// Only single words of ASCII letters, accented vowels and ñ are accepted.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-zÁÉÍÓÚáéíóúñÑ]+$").expect("name pattern is a valid regex")
});

pub fn oldest_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn validate_id(id: i64) -> Result<i64, PersonError> {
    if id < 0 {
        return Err(PersonError::InvalidId(id));
    }
    Ok(id)
}

/// Strips leading and trailing ASCII control characters and spaces only,
/// so a no-break space still counts as content.
fn trim_name(value: &str) -> &str {
    value.trim_matches(|c: char| c <= ' ')
}

/// Validates a first or last name and returns the trimmed value.
pub fn validate_name(field: Field, value: Option<&str>) -> Result<String, PersonError> {
    let trimmed = match value.map(trim_name) {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => return Err(PersonError::EmptyField(field)),
    };

    if !NAME_PATTERN.is_match(trimmed) {
        return Err(PersonError::InvalidFormat {
            field,
            value: trimmed.to_string(),
        });
    }

    Ok(trimmed.to_string())
}

pub fn validate_birth_date(value: Option<NaiveDate>) -> Result<NaiveDate, PersonError> {
    validate_birth_date_on(value, today())
}

/// Same as [`validate_birth_date`], against an explicit current date.
pub fn validate_birth_date_on(
    value: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, PersonError> {
    let date = value.ok_or(PersonError::EmptyField(Field::BirthDate))?;
    if date > today {
        return Err(PersonError::FutureDate(date));
    }
    if date < oldest_birth_date() {
        return Err(PersonError::TooOld(date));
    }
    Ok(date)
}

/// Unvalidated person input, as it arrives from the command line or a CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPerson {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// A person record whose fields always satisfy the format rules, unless it was
/// reconstructed from storage (see [`Person::revalidate`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id: i64,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
}

impl Person {
    pub fn new(
        id: i64,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
    ) -> Result<Self, PersonError> {
        Self::new_on(id, first_name, last_name, birth_date, today())
    }

    pub fn new_on(
        id: i64,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, PersonError> {
        Ok(Self {
            id: validate_id(id)?,
            first_name: validate_name(Field::FirstName, Some(first_name))?,
            last_name: validate_name(Field::LastName, Some(last_name))?,
            birth_date: validate_birth_date_on(Some(birth_date), today)?,
        })
    }

    pub fn from_raw(raw: &RawPerson) -> Result<Self, PersonError> {
        Ok(Self {
            id: validate_id(raw.id)?,
            first_name: validate_name(Field::FirstName, raw.first_name.as_deref())?,
            last_name: validate_name(Field::LastName, raw.last_name.as_deref())?,
            birth_date: validate_birth_date(raw.birth_date)?,
        })
    }

    /// Rebuilds a person from a stored row without running any rule.
    pub(crate) fn from_stored(
        id: i64,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            birth_date,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    /// Whether both values refer to the same persisted row.
    pub fn same_record(&self, other: &Person) -> bool {
        self.is_persisted() && self.id == other.id
    }

    pub fn set_id(&mut self, id: i64) -> Result<(), PersonError> {
        self.id = validate_id(id)?;
        Ok(())
    }

    pub fn set_first_name(&mut self, first_name: &str) -> Result<(), PersonError> {
        self.first_name = validate_name(Field::FirstName, Some(first_name))?;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: &str) -> Result<(), PersonError> {
        self.last_name = validate_name(Field::LastName, Some(last_name))?;
        Ok(())
    }

    pub fn set_birth_date(&mut self, birth_date: NaiveDate) -> Result<(), PersonError> {
        self.birth_date = validate_birth_date(Some(birth_date))?;
        Ok(())
    }

    /// Runs every field rule again, in construction order.
    pub fn revalidate(&self) -> Result<(), PersonError> {
        validate_id(self.id)?;
        validate_name(Field::FirstName, Some(&self.first_name))?;
        validate_name(Field::LastName, Some(&self.last_name))?;
        validate_birth_date(Some(self.birth_date))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn name_is_stored_trimmed() {
        let name = validate_name(Field::FirstName, Some("  Íñigo \t")).unwrap();
        assert_eq!(name, "Íñigo");
    }

    #[test]
    fn only_space_and_control_characters_are_trimmed() {
        assert_eq!(
            validate_name(Field::FirstName, Some("\r\n Ana\x0b")).unwrap(),
            "Ana"
        );
        assert_eq!(
            validate_name(Field::FirstName, Some("\u{00A0}Ana")),
            Err(PersonError::InvalidFormat {
                field: Field::FirstName,
                value: "\u{00A0}Ana".to_string(),
            })
        );
        assert!(matches!(
            validate_name(Field::LastName, Some("\u{2003}")),
            Err(PersonError::InvalidFormat { field: Field::LastName, .. })
        ));
    }

    #[test]
    fn blank_and_missing_names_are_empty() {
        for input in [None, Some(""), Some("   ")] {
            assert_eq!(
                validate_name(Field::LastName, input),
                Err(PersonError::EmptyField(Field::LastName))
            );
        }
    }

    #[test]
    fn compound_and_punctuated_names_are_refused() {
        for input in ["Ana María", "Ruiz-Pérez", "O'Neil", "Ana2", "Zoë"] {
            let err = validate_name(Field::FirstName, Some(input)).unwrap_err();
            assert!(
                matches!(err, PersonError::InvalidFormat { field: Field::FirstName, .. }),
                "{input} should be refused, got {err:?}"
            );
        }
    }

    #[test]
    fn birth_date_boundaries() {
        let today = date(2024, 6, 15);
        assert_eq!(validate_birth_date_on(Some(today), today), Ok(today));
        assert_eq!(
            validate_birth_date_on(Some(date(2024, 6, 16)), today),
            Err(PersonError::FutureDate(date(2024, 6, 16)))
        );
        assert_eq!(
            validate_birth_date_on(Some(date(1900, 1, 1)), today),
            Ok(date(1900, 1, 1))
        );
        assert_eq!(
            validate_birth_date_on(Some(date(1899, 12, 31)), today),
            Err(PersonError::TooOld(date(1899, 12, 31)))
        );
        assert_eq!(
            validate_birth_date_on(None, today),
            Err(PersonError::EmptyField(Field::BirthDate))
        );
    }

    #[test]
    fn id_is_checked_before_names() {
        let err = Person::new(-3, "", "", date(1990, 1, 1)).unwrap_err();
        assert_eq!(err, PersonError::InvalidId(-3));
    }

    #[test]
    fn failed_setter_leaves_person_unchanged() {
        let mut person = Person::new(4, "Lucía", "Gómez", date(1985, 3, 2)).unwrap();
        let before = person.clone();

        assert!(person.set_first_name("Lu cía").is_err());
        assert!(person.set_last_name("").is_err());
        assert!(person.set_birth_date(date(1800, 1, 1)).is_err());
        assert!(person.set_id(-1).is_err());
        assert_eq!(person, before);

        person.set_last_name(" Ortiz ").unwrap();
        assert_eq!(person.last_name(), "Ortiz");
    }

    #[test]
    fn same_record_requires_a_persisted_id() {
        let a = Person::new(0, "Ana", "Ruiz", date(1990, 5, 20)).unwrap();
        let b = Person::new(0, "Eva", "Sanz", date(1991, 5, 20)).unwrap();
        assert!(!a.same_record(&b));

        let c = Person::new(7, "Ana", "Ruiz", date(1990, 5, 20)).unwrap();
        let d = Person::new(7, "Eva", "Sanz", date(1991, 5, 20)).unwrap();
        assert!(c.same_record(&d));
        assert_ne!(c, d);
    }

    #[test]
    fn revalidate_flags_stored_values() {
        let stored = Person::from_stored(2, "Ana 2".into(), "Ruiz".into(), date(1990, 1, 1));
        assert!(matches!(
            stored.revalidate(),
            Err(PersonError::InvalidFormat { field: Field::FirstName, .. })
        ));
    }
}
