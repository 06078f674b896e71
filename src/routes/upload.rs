use axum::{extract::Multipart, extract::State, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::{
    errors::{AppError, Result},
    storage::ResourceKind,
    state::AppState,
};

/// Accept a multipart upload (field `file`), store it in object storage and
/// return the durable URL
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .unwrap_or("upload.bin")
            .to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        file = Some((filename, content_type, bytes.to_vec()));
        break;
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };

    let kind = ResourceKind::from_content_type(&content_type);
    let key = format!("uploads/{}/{}", Uuid::new_v4(), filename);

    let url = state
        .storage
        .upload_object(kind, &key, bytes, &content_type)
        .await?;

    Ok(Json(json!({ "url": url })))
}
