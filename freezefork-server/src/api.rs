//! REST surface of the vault backend.
//!
//! Error bodies use the `{"detail": ...}` shape the client parses.

use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use freezefork_core::model::{Commit, Project, UploadReceipt, UploadedFile};

use crate::store::VaultStore;

/// CAD packages are large; the default 2 MB body limit would reject them.
const MAX_UPLOAD_BYTES: usize = 1024 * 1024 * 1024;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn detail(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "detail": message.into() })))
}

pub fn create_router(store: Arc<VaultStore>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/health", get(health_handler))
        .route(
            "/api/v1/projects",
            get(list_projects_handler).post(create_project_handler),
        )
        .route(
            "/api/v1/projects/:project_id/commits",
            get(list_commits_handler).post(upload_commit_handler),
        )
        .route(
            "/api/v1/projects/:project_id/commits/:commit_id/files/:filename",
            get(download_file_handler),
        )
        .route(
            "/api/v1/projects/:project_id/commits/:commit_id/archive",
            get(download_archive_handler),
        )
        .route("/api/v1/files/upload", post(upload_file_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(store)
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": "FreezeFork vault API", "status": "running" }))
}

async fn health_handler(State(store): State<Arc<VaultStore>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "projects": store.project_count() }))
}

async fn list_projects_handler(State(store): State<Arc<VaultStore>>) -> Json<Vec<Project>> {
    Json(store.list_projects())
}

#[derive(Debug, Deserialize)]
struct CreateProjectPayload {
    name: Option<String>,
    description: Option<String>,
}

async fn create_project_handler(
    State(store): State<Arc<VaultStore>>,
    Json(payload): Json<CreateProjectPayload>,
) -> (StatusCode, Json<Project>) {
    let project = store.create_project(
        payload.name.as_deref().unwrap_or("New Project"),
        payload.description.as_deref().unwrap_or(""),
    );
    (StatusCode::CREATED, Json(project))
}

async fn list_commits_handler(
    State(store): State<Arc<VaultStore>>,
    Path(project_id): Path<String>,
) -> Json<Vec<Commit>> {
    // Unknown project ids yield an empty history, not an error.
    Json(store.list_commits(&project_id))
}

async fn upload_commit_handler(
    State(store): State<Arc<VaultStore>>,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadReceipt>, ApiError> {
    let mut message = String::new();
    let mut author = "Unknown".to_string();
    let mut branch = "main".to_string();
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, format!("malformed multipart: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => {
                message = field.text().await.map_err(bad_field)?;
            }
            Some("author") => {
                author = field.text().await.map_err(bad_field)?;
            }
            Some("branch") => {
                branch = field.text().await.map_err(bad_field)?;
            }
            Some("files") => {
                let filename = field
                    .file_name()
                    .unwrap_or("unnamed")
                    .to_string();
                let data = field.bytes().await.map_err(bad_field)?.to_vec();
                files.push((filename, data));
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(detail(StatusCode::BAD_REQUEST, "no files in upload"));
    }

    info!(project_id, files = files.len(), author = %author, "Receiving commit upload");
    store
        .append_commit(&project_id, &message, &author, &branch, files)
        .map(Json)
        .ok_or_else(|| {
            detail(
                StatusCode::NOT_FOUND,
                format!("project {project_id} not found"),
            )
        })
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    detail(StatusCode::BAD_REQUEST, format!("malformed field: {e}"))
}

async fn download_file_handler(
    State(store): State<Arc<VaultStore>>,
    Path((project_id, commit_id, filename)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    match store.file_bytes(&project_id, &commit_id, &filename) {
        Some(bytes) => Ok((
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )),
        None => Err(detail(
            StatusCode::NOT_FOUND,
            format!("file {filename} not found on commit {commit_id}"),
        )),
    }
}

async fn download_archive_handler(
    State(store): State<Arc<VaultStore>>,
    Path((project_id, commit_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let files = store.commit_files(&project_id, &commit_id).ok_or_else(|| {
        detail(
            StatusCode::NOT_FOUND,
            format!("commit {commit_id} not found"),
        )
    })?;

    let archive = zip_files(&files).map_err(|e| {
        error!(error = %e, commit_id, "Failed to build commit archive");
        detail(StatusCode::INTERNAL_SERVER_ERROR, "failed to build archive")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{commit_id}.zip\""),
            ),
        ],
        archive,
    ))
}

fn zip_files(files: &[(String, Vec<u8>)]) -> zip::result::ZipResult<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, data) in files {
            writer.start_file(name.clone(), options)?;
            writer.write_all(data)?;
        }
        writer.finish()?;
    }
    Ok(cursor.into_inner())
}

async fn upload_file_handler(
    State(store): State<Arc<VaultStore>>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, format!("malformed multipart: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let data = field.bytes().await.map_err(bad_field)?;
        let uploaded = UploadedFile {
            id: store.next_file_id(),
            name,
            size: data.len() as u64,
        };
        info!(id = %uploaded.id, name = %uploaded.name, size = uploaded.size, "Stored standalone file");
        return Ok(Json(uploaded));
    }
    Err(detail(StatusCode::BAD_REQUEST, "no file part in upload"))
}
