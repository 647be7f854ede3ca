use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::auth::{GoogleVerifier, IdentityVerifier};
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Connect, ensure the schema, and wire the Google verifier.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let db = db::connect(&config).await?;
        db::migrate(&db).await?;
        info!(url = %config.database_url, "database ready");

        let verifier = Arc::new(GoogleVerifier::new(&config.google)) as Arc<dyn IdentityVerifier>;
        Ok(Self::from_parts(db, config, verifier))
    }

    pub fn from_parts(
        db: SqlitePool,
        config: Arc<AppConfig>,
        verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            db,
            config,
            verifier,
        }
    }

    /// Drain and close the pool. Call once the server has stopped.
    pub async fn close(&self) {
        self.db.close().await;
        info!("database pool closed");
    }

    /// In-memory database plus a verifier that knows the given credential to subject pairs.
    #[cfg(test)]
    pub async fn fake(subjects: &[(&str, &str)]) -> Self {
        use crate::auth::verifier::StaticVerifier;
        use crate::config::GoogleConfig;

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            google: GoogleConfig {
                client_id: "test-client".into(),
                certs_url: "http://127.0.0.1:9/certs".into(),
                certs_ttl_secs: 3600,
            },
        });
        let verifier =
            Arc::new(StaticVerifier::new(subjects.iter().copied())) as Arc<dyn IdentityVerifier>;
        Self::from_parts(db::memory().await, config, verifier)
    }
}
