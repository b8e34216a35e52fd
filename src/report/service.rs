use serde::Deserialize;
use std::sync::Arc;

use crate::auth;
use crate::error::ApiError;
use crate::report::store::ReportStorage;
use crate::report::MutationTestingReport;
use crate::score::{self, MutationTestResult};
use crate::slug;

/// Payload of a report upload: a detailed result (score gets computed), or a
/// precomputed score with no result.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportUpload {
    #[serde(default)]
    pub result: Option<MutationTestResult>,
    #[serde(rename = "mutationScore", default)]
    pub mutation_score: Option<f64>,
}

/// Orchestrates the read and write paths. The only component that talks to
/// the storage seam.
pub struct ReportService {
    store: Arc<dyn ReportStorage>,
    require_enabled: bool,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStorage>, require_enabled: bool) -> Self {
        Self {
            store,
            require_enabled,
        }
    }

    pub fn get_report(
        &self,
        raw_slug: &str,
        module: Option<&str>,
    ) -> Result<MutationTestingReport, ApiError> {
        let key = slug::parse_slug(raw_slug, module)?;
        let found = self.store.find_report(&key).map_err(|e| {
            tracing::error!(
                project = %key.project_name,
                version = %key.version,
                module_name = ?key.module_name,
                error = %e,
                "Error while trying to fetch report"
            );
            ApiError::Storage(e)
        })?;
        found.ok_or(ApiError::ReportNotFound {
            project_name: key.project_name,
            version: key.version,
        })
    }

    pub fn put_report(
        &self,
        raw_slug: &str,
        module: Option<&str>,
        api_key: Option<&str>,
        upload: ReportUpload,
    ) -> Result<MutationTestingReport, ApiError> {
        let key = slug::parse_slug(raw_slug, module)?;

        let project = self
            .store
            .find_project(&key.project_name)
            .map_err(ApiError::Storage)?
            .ok_or(ApiError::ProjectNotFound)?;

        // Authorization comes before any scoring or storage write.
        auth::validate_api_key(api_key, &project)?;

        if self.require_enabled && !project.enabled {
            return Err(ApiError::ProjectDisabled(project.name));
        }

        let mutation_score = match &upload.result {
            Some(result) => score::compute_score(result),
            // Score-only submission: the caller's number is persisted verbatim
            None => upload.mutation_score.ok_or(ApiError::MissingScore)?,
        };

        let report = MutationTestingReport {
            project_name: key.project_name,
            version: key.version,
            module_name: key.module_name,
            mutation_score,
            result: upload.result,
        };

        if let Err(e) = self.store.upsert_report(&report) {
            tracing::error!(
                project = %report.project_name,
                version = %report.version,
                module_name = ?report.module_name,
                error = %e,
                "Error while trying to save report"
            );
            return Err(ApiError::Storage(e));
        }

        Ok(report)
    }
}
