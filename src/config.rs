use anyhow::Context;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub certs_url: String,
    pub certs_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub google: GoogleConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://database.sqlite".into());
        let max_connections = parse_var("DB_MAX_CONNECTIONS").unwrap_or(5);
        let google = GoogleConfig {
            client_id: std::env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID must be set")?,
            certs_url: std::env::var("GOOGLE_CERTS_URL")
                .unwrap_or_else(|_| GOOGLE_CERTS_URL.into()),
            certs_ttl_secs: parse_var("GOOGLE_CERTS_TTL_SECS").unwrap_or(3600),
        };
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT")
            .or_else(|| parse_var("PORT"))
            .unwrap_or(8000);
        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            google,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
