//! Process configuration from environment variables.

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address for the HTTP server.
    pub bind_addr: String,
    /// Seed the synthetic dataset at startup (in-memory backend).
    pub seed_fixtures: bool,
    /// Postgres connection string; selects the persistent backend when the
    /// `postgres` feature is enabled.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            tracing::warn!("BIND_ADDR not set; defaulting to 0.0.0.0:8080");
            "0.0.0.0:8080".to_string()
        });

        let seed_fixtures = std::env::var("SEED_FIXTURES")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = std::env::var("DATABASE_URL").ok();

        Self {
            bind_addr,
            seed_fixtures,
            database_url,
        }
    }
}
