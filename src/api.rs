// 🌐 REST read surface over the categories table (axum)
//
// Read-only: listing by type and substring search. Seeding happens through
// the CLI, never through HTTP.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use crate::catalog::CategoryType;
use crate::endpoints::{count_items, error_message, list_path, ApiResponse};
use crate::error::{Result, SeedError};
use crate::record::CategoryRecord;
use crate::storage::CategoryStore;

pub type SharedStore = Arc<Mutex<dyn CategoryStore + Send>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

impl AppState {
    pub fn new<S: CategoryStore + Send + 'static>(store: S) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

/// Category as exposed over HTTP
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub category_type: String,
    pub name: String,
    pub description: String,
}

impl From<CategoryRecord> for CategoryResponse {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: record.id,
            category_type: record.category_type,
            name: record.name,
            description: record.description,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

// ============================================================================
// Helpers
// ============================================================================

fn read_store<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&(dyn CategoryStore + Send)) -> Result<T>,
{
    let store = state
        .store
        .lock()
        .map_err(|_| SeedError::Storage("store lock poisoned".to_string()))?;
    f(&*store)
}

fn respond(result: Result<Vec<CategoryRecord>>) -> Response {
    match result {
        Ok(records) => {
            let data: Vec<CategoryResponse> = records.into_iter().map(|r| r.into()).collect();
            (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
        }
        Err(e @ SeedError::UnknownCategoryType(_)) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::error(e.to_string()))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "category query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(e.to_string())),
            )
                .into_response()
        }
    }
}

fn list_records(state: &AppState, category_type: CategoryType) -> Response {
    respond(read_store(state, |store| store.query_active(category_type.as_str())))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/categories/:category_type - Active records of a type (key or slug)
async fn get_by_type(State(state): State<AppState>, Path(category_type): Path<String>) -> Response {
    match CategoryType::parse(&category_type) {
        Ok(category_type) => list_records(&state, category_type),
        Err(e) => respond(Err(e)),
    }
}

/// GET /api/categories/search?q=..&type=.. - Substring search on name or description
async fn search_categories(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match params.q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error("query parameter 'q' is required")),
            )
                .into_response()
        }
    };

    let category_type = match params.category_type.as_deref().filter(|t| !t.is_empty()) {
        Some(t) => match CategoryType::parse(t) {
            Ok(parsed) => Some(parsed),
            Err(e) => return respond(Err(e)),
        },
        None => None,
    };

    respond(read_store(&state, |store| {
        store.search(&query, category_type.map(|t| t.as_str()))
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/categories/search", get(search_categories))
        .route("/categories/:category_type", get(get_by_type));

    // GET /api/education, /api/industry, /api/experience-level, /api/role, /api/skills
    for category_type in CategoryType::ALL {
        api_routes = api_routes.route(
            &format!("/{}", category_type.slug()),
            get(move |State(state): State<AppState>| async move {
                list_records(&state, category_type)
            }),
        );
    }

    Router::new()
        .nest("/api", api_routes.with_state(state))
        .layer(CorsLayer::permissive())
}

// ============================================================================
// In-process endpoint checks (no socket)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub path: String,
    pub status: u16,
    /// Items in `data` when it is a list
    pub items: Option<usize>,
    pub error: Option<String>,
}

impl EndpointResult {
    pub fn passed(&self) -> bool {
        self.status == 200
    }
}

/// Send one GET through the router and decode the envelope
pub async fn check_endpoint(app: Router, path: &str) -> Result<EndpointResult> {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .map_err(|e| SeedError::EndpointCheck(format!("bad request {}: {}", path, e)))?;

    let response = app
        .oneshot(request)
        .await
        .map_err(|e| SeedError::EndpointCheck(format!("GET {} failed: {}", path, e)))?;

    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| SeedError::EndpointCheck(format!("GET {} body: {}", path, e)))?;
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    Ok(EndpointResult {
        path: path.to_string(),
        status,
        items: count_items(&body),
        error: error_message(&body),
    })
}

/// The endpoints exercised by the in-process check
pub fn check_paths() -> Vec<String> {
    vec![
        list_path(CategoryType::Education),
        list_path(CategoryType::Industry),
        list_path(CategoryType::Skills),
        format!("{}?q=python", crate::endpoints::SEARCH_PATH),
    ]
}

// ============================================================================
// TESTS
// ============================================================================
