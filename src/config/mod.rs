use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub session_file: PathBuf,
    pub session_ttl_days: i64,
    pub job_poll_interval_ms: u64,
    pub balance_refresh_secs: u64,
    pub suggest_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub export_dir: PathBuf,
    pub categories_file: Option<PathBuf>,
    pub regions_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config::from_lookup(|_| None)
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Missing or
    /// unparsable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = get("API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let session_file = get("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        Config {
            api_base,
            session_file,
            session_ttl_days: get("SESSION_TTL_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(7),
            job_poll_interval_ms: get("JOB_POLL_INTERVAL_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(1000),
            balance_refresh_secs: get("BALANCE_REFRESH_SECS")
                .and_then(|v| v.trim().trim_end_matches('s').parse().ok())
                .unwrap_or(15),
            suggest_debounce_ms: get("SUGGEST_DEBOUNCE_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(300),
            request_timeout_secs: get("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.trim().trim_end_matches('s').parse().ok())
                .unwrap_or(60),
            export_dir: get("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            categories_file: get("CATEGORIES_FILE").map(PathBuf::from),
            regions_file: get("REGIONS_FILE").map(PathBuf::from),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days.max(0))
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_millis(self.job_poll_interval_ms)
    }

    pub fn balance_refresh_interval(&self) -> Duration {
        // zero would make tokio's interval panic
        Duration::from_secs(self.balance_refresh_secs.max(1))
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_session_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parser-console")
        .join("session.json")
}
