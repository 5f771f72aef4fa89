use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::domain::{CategoryId, ProviderDraft};
use super::repository::DirectoryRepository;
use super::scoring::CriterionSelections;
use super::service::{DirectoryService, DirectoryServiceError};

#[derive(Debug)]
pub enum ProviderImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidFlag {
        row: usize,
        field: &'static str,
        value: String,
    },
    Directory {
        row: usize,
        source: DirectoryServiceError,
    },
    Categories(DirectoryServiceError),
}

impl std::fmt::Display for ProviderImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderImportError::Io(err) => write!(f, "failed to read provider export: {}", err),
            ProviderImportError::Csv(err) => write!(f, "invalid provider CSV data: {}", err),
            ProviderImportError::InvalidFlag { row, field, value } => write!(
                f,
                "row {}: '{}' is not a valid value for {}",
                row, value, field
            ),
            ProviderImportError::Directory { row, source } => {
                write!(f, "row {}: could not save provider: {}", row, source)
            }
            ProviderImportError::Categories(err) => {
                write!(f, "could not load existing categories: {}", err)
            }
        }
    }
}

impl std::error::Error for ProviderImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderImportError::Io(err) => Some(err),
            ProviderImportError::Csv(err) => Some(err),
            ProviderImportError::InvalidFlag { .. } => None,
            ProviderImportError::Directory { source, .. } => Some(source),
            ProviderImportError::Categories(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ProviderImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ProviderImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct ProviderRow {
    name: String,
    category: String,
    url: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    requires_id: Option<String>,
    legacy_arc: String,
    new_arc: String,
    service: String,
    registration: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(
    value: Option<&str>,
    row: usize,
    field: &'static str,
) -> Result<bool, ProviderImportError> {
    let Some(raw) = value else {
        return Ok(true);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(ProviderImportError::InvalidFlag {
            row,
            field,
            value: raw.to_string(),
        }),
    }
}

fn directory_error(row: usize) -> impl FnOnce(DirectoryServiceError) -> ProviderImportError {
    move |source| ProviderImportError::Directory { row, source }
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub categories_created: usize,
    pub providers_imported: usize,
}

/// A row that passed validation, waiting for its category to be resolved.
struct PendingProvider {
    row: usize,
    category: String,
    draft: ProviderDraft,
}

/// Loads providers from a CSV export, writing each one through the directory service.
///
/// Every row is parsed and scored before anything is written, so a bad flag, a blank
/// category or an unknown criterion leaves the directory untouched.
pub struct ProviderImporter;

impl ProviderImporter {
    pub fn from_path<P, R>(
        path: P,
        service: &DirectoryService<R>,
    ) -> Result<ImportSummary, ProviderImportError>
    where
        P: AsRef<Path>,
        R: DirectoryRepository + 'static,
    {
        let file = File::open(path)?;
        Self::from_reader(file, service)
    }

    pub fn from_reader<T, R>(
        reader: T,
        service: &DirectoryService<R>,
    ) -> Result<ImportSummary, ProviderImportError>
    where
        T: Read,
        R: DirectoryRepository + 'static,
    {
        let pending = Self::validate(reader, service)?;

        let mut categories: HashMap<String, CategoryId> = service
            .categories()
            .map_err(ProviderImportError::Categories)?
            .into_iter()
            .map(|category| (category.name.to_lowercase(), category.id))
            .collect();

        let mut summary = ImportSummary::default();
        for PendingProvider {
            row,
            category,
            mut draft,
        } in pending
        {
            let category_key = category.to_lowercase();
            draft.category = match categories.get(&category_key) {
                Some(id) => id.clone(),
                None => {
                    let created = service
                        .create_category(&category, None)
                        .map_err(directory_error(row))?;
                    summary.categories_created += 1;
                    categories.insert(category_key, created.id.clone());
                    created.id
                }
            };

            service
                .create_provider(draft)
                .map_err(directory_error(row))?;
            summary.providers_imported += 1;
        }

        info!(
            providers = summary.providers_imported,
            categories = summary.categories_created,
            "provider import complete"
        );
        Ok(summary)
    }

    fn validate<T, R>(
        reader: T,
        service: &DirectoryService<R>,
    ) -> Result<Vec<PendingProvider>, ProviderImportError>
    where
        T: Read,
        R: DirectoryRepository + 'static,
    {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut pending = Vec::new();
        for (index, record) in csv_reader.deserialize::<ProviderRow>().enumerate() {
            // Header is line 1.
            let row = index + 2;
            let record = record?;

            let active = parse_flag(record.active.as_deref(), row, "active")?;
            let requires_id_validation =
                parse_flag(record.requires_id.as_deref(), row, "requires_id")?;

            let category = record.category.trim().to_string();
            if category.is_empty() {
                return Err(directory_error(row)(
                    DirectoryServiceError::EmptyCategoryName,
                ));
            }

            let selections = CriterionSelections::new(
                record.legacy_arc,
                record.new_arc,
                record.service,
                record.registration,
            );
            service
                .engine()
                .score(&selections)
                .map_err(|err| directory_error(row)(err.into()))?;

            pending.push(PendingProvider {
                row,
                category,
                draft: ProviderDraft {
                    name: record.name,
                    active,
                    category: CategoryId(String::new()),
                    url: record.url,
                    requires_id_validation,
                    selections,
                    created: None,
                },
            });
        }
        Ok(pending)
    }
}
