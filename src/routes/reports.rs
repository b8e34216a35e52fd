use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::{API_KEY_HEADER, REPORTS_BASE_PATH};
use crate::error::ApiError;
use crate::report::service::ReportUpload;
use crate::report::MutationTestingReport;
use crate::score::MutationTestResult;
use crate::state::SharedState;

// ============================================================================
// Query params
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ModuleParams {
    pub module: Option<String>,
}

// ============================================================================
// Response types
// ============================================================================

/// Wire shape of a served report: key fields and score at the top level,
/// flattened together with the detailed result when one was stored.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub version: String,
    #[serde(rename = "moduleName", skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(rename = "mutationScore")]
    pub mutation_score: f64,
    // A flattened None emits no fields at all
    #[serde(flatten)]
    pub result: Option<MutationTestResult>,
}

impl From<MutationTestingReport> for ReportResponse {
    fn from(report: MutationTestingReport) -> Self {
        ReportResponse {
            project_name: report.project_name,
            version: report.version,
            module_name: report.module_name,
            mutation_score: report.mutation_score,
            result: report.result,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HrefResponse {
    pub href: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /reports/{*slug}?module=<name>
pub async fn get_report(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(params): Query<ModuleParams>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = state.reports.get_report(&slug, params.module.as_deref())?;
    Ok(Json(ReportResponse::from(report)))
}

/// PUT /reports/{*slug}?module=<name> with an X-Api-Key header
pub async fn put_report(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
    Query(params): Query<ModuleParams>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<HrefResponse>, ApiError> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let upload = parse_upload(body)?;

    state
        .reports
        .put_report(&slug, params.module.as_deref(), api_key, upload)?;

    Ok(Json(HrefResponse {
        href: report_href(&state.config.base_url, &slug, params.module.as_deref()),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// CI tools send either the `{ result, mutationScore }` envelope or the bare
/// detailed result with `files` at the top level. An object carrying either
/// envelope field is the envelope; anything else is a bare result.
fn parse_upload(body: serde_json::Value) -> Result<ReportUpload, ApiError> {
    let enveloped = body
        .as_object()
        .is_some_and(|o| o.contains_key("result") || o.contains_key("mutationScore"));

    if enveloped {
        serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))
    } else {
        let result: MutationTestResult =
            serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        Ok(ReportUpload {
            result: Some(result),
            mutation_score: None,
        })
    }
}

/// Canonical absolute URL of a stored report: base URL plus the request
/// path, module query preserved verbatim.
fn report_href(base_url: &str, slug: &str, module: Option<&str>) -> String {
    let mut href = format!("{}{}/{}", base_url, REPORTS_BASE_PATH, slug);
    if let Some(module) = module {
        href.push_str("?module=");
        href.push_str(module);
    }
    href
}
