use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jiff::Timestamp;
use portal_core::ShortCode;
use tracing::info;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateUrlResponse>)> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let (url, expire_at) = request.validate(Timestamp::now())?;

    let record = state.shortener().shorten(url, expire_at).await?;
    info!(code = %record.id, expire_at = %record.expire_at, "Created short URL");

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse::new(record, state.base_url())),
    ))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let code = ShortCode::new(id)?;
    let url = state.shortener().resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
