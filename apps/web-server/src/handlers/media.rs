use actix_web::{HttpResponse, http::header, web};

use quill_core::ports::MediaError;

use crate::middleware::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/profile_pics/{name}
pub async fn profile_picture(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = name.into_inner();
    let bytes = state.images.load(&name).await.map_err(|e| match e {
        MediaError::NotFound => AppError::NotFound(name.clone()),
        other => AppError::Internal(other.to_string()),
    })?;

    let content_type = if name.to_ascii_lowercase().ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    };
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=3600"))
        .body(bytes))
}
