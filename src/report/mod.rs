pub mod service;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::score::MutationTestResult;
use crate::slug::ReportKey;

/// A registered project. `name` is the full `<owner>/<name>` storage key;
/// `owner` is its first segment.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub owner: String,
    pub enabled: bool,
    pub api_key_hash: String,
}

/// The persisted unit: one report per (project, version, module) key.
/// `result` is absent for score-only submissions, in which case
/// `mutation_score` is whatever the caller supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationTestingReport {
    #[serde(rename = "projectName")]
    pub project_name: String,
    pub version: String,
    #[serde(rename = "moduleName", default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(rename = "mutationScore")]
    pub mutation_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<MutationTestResult>,
}

impl MutationTestingReport {
    pub fn key(&self) -> ReportKey {
        ReportKey {
            project_name: self.project_name.clone(),
            version: self.version.clone(),
            module_name: self.module_name.clone(),
        }
    }
}
