//! Content API
//!
//! The HTTP surface over the content layer: uploads (raw, multipart, and
//! pre-built DAGs), path-addressed writes, and name-or-CID reads with
//! directory listings.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use cidgate_core::error::CidGateError;
use cidgate_core::{Cid, Link, Node};
use cidgate_dag::split_path;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::AppState;

/// API error, rendered as a JSON `{"error": ...}` body
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Core(CidGateError),
}

impl From<CidGateError> for ApiError {
    fn from(err: CidGateError) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Core(err) => {
                let status = match &err {
                    CidGateError::NotFound(_)
                    | CidGateError::PathNotFound(_)
                    | CidGateError::NotRegistered(_) => StatusCode::NOT_FOUND,
                    CidGateError::InvalidPath(_)
                    | CidGateError::InvalidDirectory(_)
                    | CidGateError::InvalidCid(_)
                    | CidGateError::Malformed(_)
                    | CidGateError::NotAFile(_)
                    | CidGateError::NotADirectory(_)
                    | CidGateError::Naming(_) => StatusCode::BAD_REQUEST,
                    CidGateError::Unauthorized(_) => StatusCode::FORBIDDEN,
                    CidGateError::Storage(_) | CidGateError::Io(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub cid: String,
    pub size: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub cid: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct MultipartResponse {
    pub directory_cid: String,
    pub size: u64,
    pub files: BTreeMap<String, FileEntry>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DagUploadRequest {
    pub root: String,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Serialize)]
pub struct DagUploadResponse {
    pub root_cid: String,
    pub root_size: u64,
    pub stored_node_count: usize,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PutPathResponse {
    pub content_cid: String,
    pub content_size: u64,
    pub new_name_root_cid: String,
}

/// Create content API routes
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .route("/upload/multipart", post(upload_multipart))
        .route("/upload/dag", post(upload_dag))
        .route("/register", post(register_domain))
        .route("/:domain", get(fetch_root))
        .route("/:domain/", get(fetch_root))
        .route("/:domain/*path", put(put_at_path).get(fetch))
}

// =============================================================================
// UPLOADS
// =============================================================================

/// POST /upload - store the request body as a file DAG and publish it
async fn upload(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
    body: Bytes,
) -> ApiResult<Json<UploadResponse>> {
    let leaves = state.chunker().chunk_bytes(&body);
    let (root, size) = state.dag().build_file(&leaves)?;

    let name = query
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("file-{}", &root.to_hex()[..8]));
    state
        .resolver()
        .publish(state.signer(), &name, &root.to_hex())
        .await?;

    info!(cid = %root, size, name = %name, "Uploaded content");
    Ok(Json(UploadResponse {
        cid: root.to_hex(),
        size,
        name,
    }))
}

/// POST /upload/multipart - store each part as a file DAG, assemble a
/// directory over them, and publish both
async fn upload_multipart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut entries: Vec<(String, Cid, u64)> = Vec::new();
    let mut files = BTreeMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse multipart form: {}", e)))?
    {
        let filename = match field.file_name().map(str::to_string) {
            Some(name) if !name.is_empty() => name,
            _ => {
                warn!("Skipping multipart field without a filename");
                continue;
            }
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file {}: {}", filename, e)))?;

        let leaves = state.chunker().chunk_bytes(&data);
        let (file_cid, file_size) = state.dag().build_file(&leaves)?;

        // Each file is also published under its own filename
        state
            .resolver()
            .publish(state.signer(), &filename, &file_cid.to_hex())
            .await?;

        files.insert(
            filename.clone(),
            FileEntry {
                cid: file_cid.to_hex(),
                size: file_size,
            },
        );
        entries.push((filename, file_cid, file_size));
    }

    if entries.is_empty() {
        return Ok(Json(json!({ "message": "No files uploaded" })).into_response());
    }

    let (dir_cid, dir_size) = state.dag().build_directory(entries)?;
    let name = query
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("dir-{}", &dir_cid.to_hex()[..8]));
    state
        .resolver()
        .publish(state.signer(), &name, &dir_cid.to_hex())
        .await?;

    info!(cid = %dir_cid, size = dir_size, files = files.len(), name = %name, "Uploaded directory");
    Ok(Json(MultipartResponse {
        directory_cid: dir_cid.to_hex(),
        size: dir_size,
        files,
        name,
    })
    .into_response())
}

/// POST /upload/dag - store a pre-built DAG supplied by the client
async fn upload_dag(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
    Json(request): Json<DagUploadRequest>,
) -> ApiResult<Json<DagUploadResponse>> {
    if request.root.is_empty() {
        return Err(ApiError::BadRequest("Root CID is required".to_string()));
    }
    if request.nodes.is_empty() {
        return Err(ApiError::BadRequest("Node list is empty".to_string()));
    }

    let root = Cid::from_hex(&request.root)?;

    let mut stored: HashSet<Cid> = HashSet::new();
    for node in &request.nodes {
        stored.insert(state.dag().put_node(node)?);
    }

    if !stored.contains(&root) {
        return Err(ApiError::BadRequest(
            "Provided root CID was not found in the uploaded nodes".to_string(),
        ));
    }

    let root_size = state.dag().node_size(&root)?;
    let name = query
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("dag-{}", &request.root[..8]));
    state
        .resolver()
        .publish(state.signer(), &name, &root.to_hex())
        .await?;

    Ok(Json(DagUploadResponse {
        root_cid: root.to_hex(),
        root_size,
        stored_node_count: stored.len(),
        name,
    }))
}

// =============================================================================
// NAMES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub domain: Option<String>,
}

/// POST /register?domain= - register a domain with no content bound yet
async fn register_domain(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegisterQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let domain = query
        .domain
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing domain query parameter".to_string()))?;

    state.resolver().register(state.signer(), &domain, "").await?;

    Ok(Json(json!({
        "message": format!("Domain '{}' registered successfully", domain)
    })))
}

/// PUT /:domain/*path - store the body as a file DAG and graft it onto the
/// domain's tree at the given path, publishing the new root
async fn put_at_path(
    State(state): State<Arc<AppState>>,
    Path((domain, path)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<PutPathResponse>> {
    if split_path(&path).is_empty() {
        return Err(ApiError::BadRequest(
            "path must include the target file or directory name".to_string(),
        ));
    }

    let leaves = state.chunker().chunk_bytes(&body);
    let (content_cid, content_size) = state.dag().build_file(&leaves)?;

    // Rebase onto the domain's current root; an unbound domain starts from
    // a fresh empty root
    let current_root = match state.resolver().resolve(&domain).await? {
        Some(cid) => Cid::from_hex(&cid)?,
        None => state.dag().put_node(&Node::empty())?,
    };

    let new_root = state
        .dag()
        .put_at(&current_root, &path, &content_cid, content_size)?;

    state
        .resolver()
        .publish(state.signer(), &domain, &new_root.to_hex())
        .await?;

    info!(domain = %domain, path = %path, content = %content_cid, new_root = %new_root, "Put content at path");
    Ok(Json(PutPathResponse {
        content_cid: content_cid.to_hex(),
        content_size,
        new_name_root_cid: new_root.to_hex(),
    }))
}

// =============================================================================
// FETCH
// =============================================================================

/// GET /:domain - fetch the root of a name or direct CID
async fn fetch_root(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> ApiResult<Response> {
    fetch_content(state, domain, String::new()).await
}

/// GET /:domain/*path - fetch content under a name or direct CID
async fn fetch(
    State(state): State<Arc<AppState>>,
    Path((domain, path)): Path<(String, String)>,
) -> ApiResult<Response> {
    fetch_content(state, domain, path).await
}

async fn fetch_content(
    state: Arc<AppState>,
    domain: String,
    path: String,
) -> ApiResult<Response> {
    // A 64-hex name is a direct root CID and bypasses the naming layer
    let root = if Cid::is_hex_cid(&domain) {
        Cid::from_hex(&domain)?
    } else {
        let cid = state
            .resolver()
            .resolve(&domain)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Failed to resolve CID for {}", domain)))?;
        Cid::from_hex(&cid)?
    };

    let target = state.dag().resolve_path(&root, &path)?;
    let node = state.dag().get_node(&target)?;
    debug!(domain = %domain, path = %path, target = %target, "Resolved fetch target");

    if node.is_dir() {
        let base = format!("/{}/{}", domain, path.trim_matches('/'));
        let html = directory_listing_html(&base, &node.links);
        return Ok(Html(html).into_response());
    }

    let data = state.dag().read_file(&target)?;
    let filename = path
        .rsplit('/')
        .find(|c| !c.is_empty())
        .unwrap_or(&domain)
        .to_string();

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        data,
    )
        .into_response())
}

/// Render a directory node as an HTML listing
fn directory_listing_html(base: &str, links: &[Link]) -> String {
    let base = base.trim_end_matches('/');
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head><title>Index of ");
    html.push_str(base);
    html.push_str("</title></head>\n<body>\n");
    html.push_str(&format!("<h1>Index of {}</h1>\n<ul>\n", base));

    for link in links {
        html.push_str(&format!(
            "  <li><a href=\"{}/{}\">{}</a> ({} bytes, {})</li>\n",
            base, link.name, link.name, link.size, link.hash
        ));
    }

    html.push_str("</ul>\n</body>\n</html>\n");
    html
}

/// Best-effort content type from the final path component's extension
fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    }
}
