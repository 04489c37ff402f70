//! HTTP request handlers

use super::mcp::handle_rpc;
use super::types::{ErrorResponse, LensResponse, UploadQuery, UploadResponse};
use super::AppState;
use crate::convert::{convert, ConvertError};
use crate::lens::LensError;
use crate::uploads::{FileStore, StoredFile, UploadError, UploadFlow, UploadRoute};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let rpc = Router::new()
        .route("/mcp", post(handle_rpc))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        // File conversion
        .route("/upload", post(upload))
        .route("/download/:filename", get(download))
        // Image search
        .route("/lens_upload", post(lens_upload))
        .route("/lens_download/:filename", get(lens_download))
        // Version
        .route("/version", get(get_version))
        .merge(rpc)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

// ============================================================
// Authentication
// ============================================================

async fn require_bearer(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match bearer {
        Some(TypedHeader(Authorization(bearer))) if bearer.token() == &*state.auth_token => {
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected request without valid bearer token");
            Err(AppError::Unauthorized("Invalid or missing bearer token.".to_string()))
        }
    }
}

// ============================================================
// File Conversion
// ============================================================

async fn upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(UploadError::InvalidToken.into());
    };
    let (file_name, bytes) = read_file_field(multipart).await?;

    let (ticket, extension) = state
        .tickets
        .check(Some(token), UploadRoute::Upload, &file_name)
        .await?;
    let UploadFlow::Convert { direction } = ticket.flow else {
        return Err(AppError::Internal("Token is not bound to a conversion".to_string()));
    };

    let input = save(&state.files, &extension, &bytes).await?;
    tracing::info!(
        user_id = %ticket.user_id,
        direction = %direction,
        path = %input.path.display(),
        size = bytes.len(),
        "Converting upload"
    );

    let output = tokio::task::spawn_blocking(move || convert(direction, &bytes))
        .await
        .map_err(|e| AppError::Internal(format!("Conversion task failed: {e}")))??;

    let output_name = input.sibling_name(direction.output_extension());
    state
        .files
        .save_as(&output_name, &output)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store converted file: {e}")))?;
    state.tickets.consume(token).await?;

    Ok(Json(UploadResponse {
        message: "File converted successfully!".to_string(),
        download_url: state.links.download(&output_name),
    }))
}

async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_file(&state.files, &filename).await
}

// ============================================================
// Image Search
// ============================================================

async fn lens_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<LensResponse>, AppError> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(UploadError::InvalidToken.into());
    };
    let (file_name, bytes) = read_file_field(multipart).await?;

    let (ticket, extension) = state
        .tickets
        .check(Some(token), UploadRoute::LensUpload, &file_name)
        .await?;

    let image = save(&state.files, &extension, &bytes).await?;
    tracing::info!(user_id = %ticket.user_id, file = %image.name, "Searching uploaded image");

    let results = state.lens.lookup(&bytes, &image.name).await?;

    let results_name = image.sibling_name(".txt");
    state
        .files
        .save_as(&results_name, results.as_bytes())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store results: {e}")))?;
    state.tickets.consume(token).await?;

    Ok(Json(LensResponse {
        message: "Image processed successfully.".to_string(),
        results,
        download_url: state.links.lens_download(&results_name),
    }))
}

async fn lens_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    serve_file(&state.files, &filename).await
}

// ============================================================
// Shared helpers
// ============================================================

/// Pull the `file` part out of a multipart body
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        return Ok((file_name, bytes));
    }
    Err(AppError::BadRequest("Missing file field.".to_string()))
}

async fn save(files: &FileStore, extension: &str, bytes: &[u8]) -> Result<StoredFile, AppError> {
    files
        .save(extension, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))
}

async fn serve_file(files: &FileStore, name: &str) -> Result<Response, AppError> {
    let bytes = files
        .read(name)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read file: {e}")))?
        .ok_or_else(|| AppError::NotFound("File not found.".to_string()))?;

    let content_type = mime_guess::from_path(name)
        .first_or_octet_stream()
        .to_string();
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn get_version() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidToken | UploadError::UnsupportedExtension(_) => {
                AppError::BadRequest(e.to_string())
            }
            UploadError::Store(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ConvertError> for AppError {
    fn from(e: ConvertError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<LensError> for AppError {
    fn from(e: LensError) -> Self {
        AppError::Internal(e.message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
