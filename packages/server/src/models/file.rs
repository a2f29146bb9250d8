use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::uploaded_file;

/// Response for a stored upload. `filename` is the handle later used
/// with `GET /files/{filename}` and on catalog items.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponse {
    #[schema(example = "0d9f1f3a-77e1-4f41-bd5c-4f3ee1d53a10.png")]
    pub filename: String,
    #[schema(example = "product-shot.png")]
    pub original_name: String,
    #[schema(example = "image/png")]
    pub mimetype: String,
    /// File size in bytes.
    pub size: i64,
    pub upload_date: DateTime<Utc>,
}

impl From<uploaded_file::Model> for UploadFileResponse {
    fn from(m: uploaded_file::Model) -> Self {
        Self {
            filename: m.filename,
            original_name: m.original_name,
            mimetype: m.content_type,
            size: m.size,
            upload_date: m.created_at,
        }
    }
}
