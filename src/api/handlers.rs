//! API request handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::server::AppState;
use crate::core::{
    references, CategoryFilter, EditorSession, FieldRegistry, FormulaFunction, FormulaReferences,
    Validator,
};
use crate::types::{DataField, FormulaField};

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(RootResponse {
        name: "calcfield API Server".to_string(),
        version: state.version.clone(),
        description: "Calculated-field formula validation".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new("/api/v1/functions", "GET", "List catalog functions"),
            EndpointInfo::new("/api/v1/validate", "POST", "Validate a formula"),
            EndpointInfo::new("/api/v1/fields", "POST", "Build a calculated field"),
        ],
    }))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub function_count: usize,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        function_count: state.catalog.len(),
    }))
}

#[derive(Deserialize, Default)]
pub struct FunctionsQuery {
    pub category: Option<String>,
}

/// Catalog entry with its insertion template
#[derive(Serialize)]
pub struct FunctionInfo {
    #[serde(flatten)]
    pub function: FormulaFunction,
    pub template: String,
}

/// GET /api/v1/functions?category=... - List functions
pub async fn list_functions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FunctionsQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<FunctionInfo>>>) {
    let filter = match query.category.as_deref() {
        Some(c) => match c.parse::<CategoryFilter>() {
            Ok(f) => f,
            Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e.to_string()))),
        },
        None => CategoryFilter::All,
    };

    let functions = state
        .catalog
        .list_by_category(filter)
        .into_iter()
        .map(|f| FunctionInfo {
            template: f.template(),
            function: f.clone(),
        })
        .collect();

    (StatusCode::OK, Json(ApiResponse::ok(functions)))
}

/// Validate request
#[derive(Deserialize)]
pub struct ValidateRequest {
    pub formula: String,
    #[serde(default)]
    pub fields: Vec<DataField>,
}

/// Validate response
#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub references: FormulaReferences,
}

/// POST /api/v1/validate - Validate a formula against the supplied fields
pub async fn validate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateRequest>,
) -> impl IntoResponse {
    let registry = FieldRegistry::new(req.fields);
    let result = Validator::new(&registry, state.catalog).validate(&req.formula);

    Json(ApiResponse::ok(ValidateResponse {
        valid: result.is_valid(),
        state: result.state_name().to_string(),
        error: result.error_message(),
        references: references(&req.formula),
    }))
}

/// Calculated field request; `id` re-opens a previously saved field
#[derive(Deserialize)]
pub struct CreateFieldRequest {
    #[serde(default)]
    pub alias: String,
    pub formula: String,
    #[serde(default)]
    pub fields: Vec<DataField>,
    #[serde(default)]
    pub id: Option<Uuid>,
}

/// POST /api/v1/fields - Build a calculated field if it passes the save rules
pub async fn create_field(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateFieldRequest>,
) -> (StatusCode, Json<ApiResponse<FormulaField>>) {
    let registry = FieldRegistry::new(req.fields);

    let session = match req.id {
        Some(id) => {
            let existing = FormulaField {
                id,
                alias: req.alias,
                formula: req.formula,
                is_valid: false,
                validation_error: None,
                created_at: Utc::now(),
            };
            EditorSession::from_existing(&existing, &registry, state.catalog)
        }
        None => {
            let mut session = EditorSession::new(&registry, state.catalog);
            session.set_alias(req.alias);
            session.set_formula(req.formula);
            session
        }
    };

    match session.build() {
        Ok(field) => (StatusCode::OK, Json(ApiResponse::ok(field))),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::err(e.to_string())),
        ),
    }
}
