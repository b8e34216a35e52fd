use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::report::service::ReportService;

pub type SharedState = Arc<AppState>;

/// Shared per-process state. Requests carry no mutable state between them;
/// everything mutable lives behind the storage seam.
pub struct AppState {
    pub config: DashboardConfig,
    pub reports: ReportService,
}

impl AppState {
    pub fn new(config: DashboardConfig, reports: ReportService) -> Self {
        Self { config, reports }
    }
}
