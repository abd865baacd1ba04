use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub store_url: String,
    pub store_key: String,
    pub backup_bucket: String,
    pub backup_cron: String,
    pub client_dist: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            store_key: std::env::var("STORE_KEY").unwrap_or_default(),
            backup_bucket: std::env::var("BACKUP_BUCKET").unwrap_or_else(|_| "backups".into()),
            // sec min hour day month weekday
            backup_cron: std::env::var("BACKUP_CRON").unwrap_or_else(|_| "0 0 3 * * *".into()),
            client_dist: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../client/dist"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }
}
