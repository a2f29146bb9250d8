use axum::Json;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use sea_orm::*;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::uploaded_file;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::file::UploadFileResponse;
use crate::state::AppState;
use crate::utils::filename;

/// Body limit layer for the upload route. Slightly above the 5 MB file
/// cap to leave room for multipart framing.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(6 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Store an image",
    description = "Requires an admin token. The `file` multipart field must be an image and \
        at most 5 MB. The file lands on disk under a generated name, a metadata row is \
        recorded, and the generated filename is returned for use on catalog items. A failed \
        metadata insert removes the stored file again.",
    request_body(content_type = "multipart/form-data", description = "Image upload"),
    responses(
        (status = 201, description = "File stored", body = UploadFileResponse),
        (status = 400, description = "Missing file, wrong type, or too large", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadFileResponse>), AppError> {
    auth_user.require_admin()?;

    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let original_name = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;

            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_default();
            if !content_type.starts_with("image/") {
                return Err(AppError::Validation("Only image files are allowed".into()));
            }

            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
            upload = Some((original_name, content_type, data.to_vec()));
            break;
        }
    }

    let (original_name, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("No file uploaded".into()))?;

    if data.len() > state.config.storage.max_file_size {
        return Err(AppError::Validation(
            "File exceeds the maximum upload size".into(),
        ));
    }

    let stored = filename::stored_filename(&original_name);
    let path = state.config.storage.path.join(&stored);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

    let record = uploaded_file::ActiveModel {
        filename: Set(stored.clone()),
        original_name: Set(original_name),
        content_type: Set(content_type),
        size: Set(data.len() as i64),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match record.insert(&state.db).await {
        Ok(model) => Ok((StatusCode::CREATED, Json(UploadFileResponse::from(model)))),
        Err(e) => {
            // The stored file must not outlive a failed metadata insert.
            if let Err(rm) = tokio::fs::remove_file(&path).await {
                tracing::warn!("Failed to remove orphaned upload {}: {}", stored, rm);
            }
            Err(AppError::from(e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/{filename}",
    tag = "Files",
    operation_id = "getFile",
    summary = "Retrieve a stored file",
    description = "Public. Streams the file with a content type guessed from its extension.",
    params(("filename" = String, Path, description = "Stored filename")),
    responses(
        (status = 200, description = "File content"),
        (status = 400, description = "Invalid filename", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(filename = %filename))]
pub async fn get_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let safe = filename::validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?;
    let path = state.config.storage.path.join(safe);

    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound("File not found".into()),
            _ => AppError::Internal(format!("Failed to open file: {e}")),
        })?;
    let metadata = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat file: {e}")))?;

    let content_type = mime_guess::from_path(safe).first_or_octet_stream().to_string();
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
