use clap::Parser;
use std::path::PathBuf;

/// Mutadash — stores and serves mutation testing reports pushed from CI.
#[derive(Parser, Debug, Clone)]
#[command(name = "mutadash")]
pub struct CliArgs {
    /// Directory holding the report database
    #[arg(short = 'd', long = "data-dir", default_value = ".")]
    pub data_dir: PathBuf,

    /// HTTP port
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Public base URL used in report hrefs (defaults to http://localhost:<port>)
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Reject report uploads for projects that are not enabled
    #[arg(long = "require-enabled")]
    pub require_enabled: bool,

    /// Register a project (<owner>/<name>), print a fresh API key, and exit
    #[arg(long = "register")]
    pub register: Option<String>,
}

pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub base_url: String,
    pub require_enabled: bool,
}

pub const DEFAULT_PORT: u16 = 9400;

// Header carrying the project API key on report uploads
pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const API_KEY_BYTES: usize = 16;

pub const DB_FILE: &str = "reports.db";
pub const REPORTS_BASE_PATH: &str = "/reports";

// Reports with embedded sources run large; axum's 2 MB default is too small
pub const MAX_REPORT_BODY_BYTES: usize = 50 * 1024 * 1024;

impl DashboardConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        let base_url = args
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", args.port));

        DashboardConfig {
            data_dir: args.data_dir.clone(),
            port: args.port,
            base_url: base_url.trim_end_matches('/').to_string(),
            require_enabled: args.require_enabled,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            data_dir: PathBuf::from("/tmp/mutadash"),
            port: DEFAULT_PORT,
            base_url: None,
            require_enabled: false,
            register: None,
        }
    }

    #[test]
    fn test_base_url_defaults_to_localhost_port() {
        let config = DashboardConfig::from_args(&args());
        assert_eq!(config.base_url, "http://localhost:9400");
    }

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let mut a = args();
        a.base_url = Some("https://dashboard.example.com/".to_string());
        let config = DashboardConfig::from_args(&a);
        assert_eq!(config.base_url, "https://dashboard.example.com");
    }

    #[test]
    fn test_db_path_is_under_data_dir() {
        let config = DashboardConfig::from_args(&args());
        assert_eq!(config.db_path(), PathBuf::from("/tmp/mutadash/reports.db"));
    }
}
