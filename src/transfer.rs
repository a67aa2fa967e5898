use chrono::NaiveDate;
use csv_async::{AsyncReaderBuilder, AsyncWriter, StringRecord};
use futures::stream::StreamExt;
use tokio::fs::File;

use std::path::Path;

use crate::{
    error::{PersonError, TransferError},
    models::{Person, RawPerson, UNSAVED_ID},
    store::PersonStore,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A CSV line that failed validation and was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub line: u64,
    pub error: PersonError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub rejected: Vec<Rejection>,
}

/// Writes every stored person to `path`, returning the number of rows written.
pub async fn export_csv(store: &PersonStore, path: &Path) -> Result<usize, TransferError> {
    tracing::info!("Exporting people to {}", path.display());

    let people = store.list_all().await?;

    let file = File::create(path).await?;
    let mut writer = AsyncWriter::from_writer(file);
    writer
        .write_record(&["id", "first_name", "last_name", "birth_date"])
        .await?;

    for person in &people {
        let id = person.id().to_string();
        let birth_date = person.birth_date().format(DATE_FORMAT).to_string();
        writer
            .write_record(&[
                id.as_str(),
                person.first_name(),
                person.last_name(),
                birth_date.as_str(),
            ])
            .await?;
    }

    writer.flush().await?;

    tracing::info!("Exported {} people", people.len());
    Ok(people.len())
}

/// Reads people from `path`, inserting the valid ones.
///
/// Columns are looked up by header name, an `id` column is ignored since the
/// store assigns ids on insert. Records may be short, missing columns are
/// reported as empty fields.
pub async fn import_csv(store: &PersonStore, path: &Path) -> Result<ImportReport, TransferError> {
    tracing::info!("Importing people from {}", path.display());

    let file = File::open(path).await?;
    let mut reader = AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(file);
    let headers = reader.headers().await?.clone();
    let columns = Columns::locate(&headers);

    let mut report = ImportReport::default();
    let mut records = reader.records();

    while let Some(record) = records.next().await {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());

        let person = match Person::from_raw(&columns.raw_person(&record)) {
            Ok(person) => person,
            Err(error) => {
                tracing::warn!("Skipping line {}: {}", line, error);
                report.rejected.push(Rejection { line, error });
                continue;
            }
        };

        store.insert(&person).await?;
        report.imported += 1;
    }

    tracing::info!(
        "Import completed, {} stored and {} rejected",
        report.imported,
        report.rejected.len()
    );
    Ok(report)
}

struct Columns {
    first_name: Option<usize>,
    last_name: Option<usize>,
    birth_date: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);
        Self {
            first_name: find("first_name"),
            last_name: find("last_name"),
            birth_date: find("birth_date"),
        }
    }

    fn raw_person(&self, record: &StringRecord) -> RawPerson {
        let field = |index: Option<usize>| index.and_then(|i| record.get(i));
        RawPerson {
            id: UNSAVED_ID,
            first_name: field(self.first_name).map(str::to_string),
            last_name: field(self.last_name).map(str::to_string),
            // An unparseable date is treated like a missing one.
            birth_date: field(self.birth_date)
                .and_then(|value| NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()),
        }
    }
}
