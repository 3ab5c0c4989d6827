use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::task;
use tracing::{info, warn};

use crate::batch::{self, BatchFailure};
use crate::models::NewCandidate;
use crate::store::CandidateStore;

pub mod extract;
pub mod normalize;

pub use normalize::RawCandidate;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "dataFile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Chooses the format from the extension of the client-supplied filename.
    pub fn from_filename(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Json => "JSON",
        }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("Unsupported file format. Please upload CSV or JSON files only.")]
    UnsupportedFormat,
    #[error("CSV file is empty or invalid")]
    EmptyCsv,
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No candidates found in JSON file")]
    EmptyJson,
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "JSON parsing error: Invalid JSON structure. Expected an array of candidates or an object with candidates/data array."
    )]
    InvalidShape,
    #[error("File reading error: {0}")]
    Io(#[from] io::Error),
    #[error("Database error: {0}")]
    Store(#[from] BatchFailure),
    #[error("import task failed: {0}")]
    Task(#[from] task::JoinError),
}

impl ImportError {
    /// Problems with the uploaded file itself, as opposed to server-side failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFile
                | Self::UnsupportedFormat
                | Self::EmptyCsv
                | Self::Csv(_)
                | Self::EmptyJson
                | Self::Json(_)
                | Self::InvalidShape
        )
    }
}

/// An upload spooled to disk. The file is removed when the value is dropped, so
/// every exit path of an import deletes it exactly once.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    original_name: String,
}

impl UploadedFile {
    pub fn persist_in(
        dir: &Path,
        original_name: impl Into<String>,
        bytes: &[u8],
    ) -> io::Result<Self> {
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self {
            file,
            original_name: original_name.into(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(err) = self.file.close() {
            warn!(path = %path.display(), error = %err, "failed to remove uploaded file");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub format: ImportFormat,
    pub imported: usize,
}

impl ImportSummary {
    pub fn message(&self) -> String {
        format!(
            "Imported {} candidates successfully from {}",
            self.imported,
            self.format.label()
        )
    }
}

/// Parses the upload, normalizes every record and upserts them all. The upload
/// is consumed and removed whether or not the import succeeds.
pub async fn import_upload(
    store: &dyn CandidateStore,
    upload: UploadedFile,
) -> Result<ImportSummary, ImportError> {
    let result = run_import(store, &upload).await;
    upload.discard();
    result
}

async fn run_import(
    store: &dyn CandidateStore,
    upload: &UploadedFile,
) -> Result<ImportSummary, ImportError> {
    let format =
        ImportFormat::from_filename(upload.original_name()).ok_or(ImportError::UnsupportedFormat)?;
    let path = upload.path().to_path_buf();
    let records = task::spawn_blocking(move || read_records(format, &path)).await??;
    let record_count = records.len();
    let rows = last_per_email(records.iter().map(RawCandidate::normalize));

    let outcome = batch::run_all(rows.into_iter().map(|row| store.upsert(row))).await;
    if let Some(err) = &outcome.first_error {
        warn!(
            attempted = outcome.attempted,
            failed = outcome.failed,
            error = %err,
            "candidate upserts failed"
        );
    }
    let ids = outcome.into_result()?;

    info!(
        original_name = %upload.original_name(),
        format = format.label(),
        imported = record_count,
        distinct = ids.len(),
        "candidate import completed"
    );
    Ok(ImportSummary {
        format,
        imported: record_count,
    })
}

/// Keeps only the last row for each email, in first-seen order. The upserts run
/// concurrently, so duplicates must not reach the store together.
pub fn last_per_email(rows: impl IntoIterator<Item = NewCandidate>) -> Vec<NewCandidate> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<NewCandidate> = Vec::new();
    for row in rows {
        match positions.get(&row.email) {
            Some(&index) => kept[index] = row,
            None => {
                positions.insert(row.email.clone(), kept.len());
                kept.push(row);
            }
        }
    }
    kept
}

pub fn read_records(format: ImportFormat, path: &Path) -> Result<Vec<RawCandidate>, ImportError> {
    let file = File::open(path)?;
    match format {
        ImportFormat::Csv => parse_csv(file),
        ImportFormat::Json => parse_json(BufReader::new(file)),
    }
}

/// Header-keyed rows; ragged rows keep whatever columns they have.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawCandidate>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(RawCandidate::from_csv_row(&headers, &row?));
    }

    if records.is_empty() {
        return Err(ImportError::EmptyCsv);
    }
    Ok(records)
}

/// Accepts a bare array, `{"candidates": [...]}` or `{"data": [...]}`.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<RawCandidate>, ImportError> {
    let document: Value = serde_json::from_reader(reader)?;
    let items = candidate_array(document).ok_or(ImportError::InvalidShape)?;
    if items.is_empty() {
        return Err(ImportError::EmptyJson);
    }
    Ok(items.into_iter().map(RawCandidate::classify).collect())
}

fn candidate_array(document: Value) -> Option<Vec<Value>> {
    match document {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => ["candidates", "data"]
            .into_iter()
            .find_map(|key| match map.remove(key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }),
        _ => None,
    }
}
