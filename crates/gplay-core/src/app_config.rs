use crate::locale::Locale;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Store front end root, e.g. `https://play.google.com`.
    pub base_url: String,
    pub locale: Locale,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on independent pagination chains in flight at once.
    pub max_concurrent_chains: usize,
    pub inter_request_delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Hard cap on pages per chain; guards against cycling tokens.
    pub max_pages: usize,
    /// When set, a record missing a required field aborts its page instead
    /// of being skipped.
    pub strict_records: bool,
}
