use axum::extract::multipart::MultipartRejection;
use axum::extract::{Json, Multipart, State};
use serde::Serialize;
use tokio::task;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::import::{self, ImportError, UploadedFile, UPLOAD_FIELD};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
}

pub async fn import_candidates(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<ImportResponse>> {
    let mut multipart = multipart.map_err(|rejection| {
        let msg = rejection.body_text();
        error!(error = %msg, "import rejected: not a multipart request");
        AppError::bad_request(msg)
    })?;
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        let msg = format!("invalid multipart data: {err}");
        error!(error = %err, "invalid multipart data");
        AppError::bad_request(msg)
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|err| {
            let msg = format!("failed to read file bytes: {err}");
            error!(error = %err, "failed to read file bytes");
            AppError::bad_request(msg)
        })?;

        let dir = state.config.upload_dir.clone();
        let spooled =
            task::spawn_blocking(move || UploadedFile::persist_in(&dir, original_name, &data))
                .await
                .map_err(AppError::internal)??;
        upload = Some(spooled);
    }

    let upload = upload.ok_or_else(|| {
        error!("import rejected: missing file field");
        AppError::from(ImportError::MissingFile)
    })?;
    let original_name = upload.original_name().to_string();

    match import::import_upload(state.store(), upload).await {
        Ok(summary) => {
            info!(
                original_name = %original_name,
                imported = summary.imported,
                "import request succeeded"
            );
            Ok(Json(ImportResponse {
                message: summary.message(),
            }))
        }
        Err(err) => {
            error!(error = %err, original_name = %original_name, "import request failed");
            Err(err.into())
        }
    }
}
