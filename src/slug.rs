use crate::error::ApiError;

/// Storage key of a report: owner/name project, version, optional module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportKey {
    pub project_name: String,
    pub version: String,
    pub module_name: Option<String>,
}

/// Parse a report slug into its key.
///
/// The project is always exactly the first two path segments
/// (`<owner>/<name>`); everything after the second slash is the version and
/// is never re-split, so branch names like `feat/dashboard` survive intact.
/// The module never comes from the path, only from the `module` query
/// parameter.
pub fn parse_slug(raw: &str, module: Option<&str>) -> Result<ReportKey, ApiError> {
    let mut parts = raw.splitn(3, '/');
    let owner = parts.next().unwrap_or("");
    let name = parts.next().unwrap_or("");
    let version = parts.next().unwrap_or("");

    if owner.is_empty() || name.is_empty() || version.is_empty() {
        return Err(ApiError::InvalidSlug(raw.to_string()));
    }

    Ok(ReportKey {
        project_name: format!("{}/{}", owner, name),
        version: version.to_string(),
        // An empty `module=` means no module, not a module named "".
        module_name: module.filter(|m| !m.is_empty()).map(str::to_string),
    })
}
