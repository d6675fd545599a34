//! Shared Configuration
//! Mission: One place that reads the environment

/// Server configuration, resolved from the environment with code defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./bugboard.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let jwt_secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());

        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(24);

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            token_ttl_hours,
        })
    }
}
