/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3000). Env var: `PORT`.
    pub port: u16,
    /// Public origin used to build links in emails (e.g. "https://books.example.com").
    pub public_base_url: String,
    /// Session cookie `Domain`; unset or empty means host-only. Env var: `COOKIE_DOMAIN`.
    pub cookie_domain: Option<String>,
    /// Session cookie `Secure` flag (default true). Env var: `COOKIE_SECURE`.
    pub cookie_secure: bool,
    /// Admin session lifetime in hours (default 168). Env var: `SESSION_TTL_HOURS`.
    pub session_ttl_hours: i64,
    /// Mail provider endpoint accepting `{from, to, subject, text}` JSON.
    pub mail_api_url: String,
    /// Bearer key for the mail provider.
    pub mail_api_key: String,
    /// Sender address for outbound mail.
    pub mail_from: String,
    /// Upper bound on one mail provider call, in seconds (default 5).
    pub mail_timeout_secs: u64,
    /// Read the client address from proxy headers (default false).
    /// Env var: `TRUST_PROXY_HEADERS`. Enable only behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            port: parsed("PORT").unwrap_or(3000),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .expect("PUBLIC_BASE_URL")
                .trim_end_matches('/')
                .to_owned(),
            cookie_domain: std::env::var("COOKIE_DOMAIN")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            cookie_secure: parsed("COOKIE_SECURE").unwrap_or(true),
            session_ttl_hours: parsed("SESSION_TTL_HOURS").unwrap_or(168),
            mail_api_url: std::env::var("MAIL_API_URL").expect("MAIL_API_URL"),
            mail_api_key: std::env::var("MAIL_API_KEY").expect("MAIL_API_KEY"),
            mail_from: std::env::var("MAIL_FROM").expect("MAIL_FROM"),
            mail_timeout_secs: parsed("MAIL_TIMEOUT_SECS").unwrap_or(5),
            trust_proxy_headers: parsed("TRUST_PROXY_HEADERS").unwrap_or(false),
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
