use std::path::PathBuf;

use remat_core::bin::DEFAULT_FILL_INCREMENT;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. `DATABASE_URL`
/// is read separately in `main` because tests supply their own pool.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Model server root URL.
    pub classifier_url: String,
    /// Served model name.
    pub classifier_model: String,
    /// Per-request timeout for the model server, in seconds.
    pub classifier_timeout_secs: u64,
    /// Optional JSON file overlaying the built-in points table.
    pub points_table_path: Option<PathBuf>,
    /// Fill units added to a bin per accepted deposit.
    pub fill_increment: i32,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `CLASSIFIER_URL`          | `http://localhost:8501`    |
    /// | `CLASSIFIER_MODEL`        | `ewaste`                   |
    /// | `CLASSIFIER_TIMEOUT_SECS` | `10`                       |
    /// | `POINTS_TABLE_PATH`       | unset (built-in table)     |
    /// | `DEPOSIT_FILL_INCREMENT`  | `10`                       |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let classifier_url =
            std::env::var("CLASSIFIER_URL").unwrap_or_else(|_| "http://localhost:8501".into());

        let classifier_model =
            std::env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "ewaste".into());

        let classifier_timeout_secs: u64 = std::env::var("CLASSIFIER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("CLASSIFIER_TIMEOUT_SECS must be a valid u64");

        let points_table_path = std::env::var("POINTS_TABLE_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let fill_increment: i32 = std::env::var("DEPOSIT_FILL_INCREMENT")
            .map(|v| v.parse().expect("DEPOSIT_FILL_INCREMENT must be a valid i32"))
            .unwrap_or(DEFAULT_FILL_INCREMENT);

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "10485760".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            classifier_url,
            classifier_model,
            classifier_timeout_secs,
            points_table_path,
            fill_increment,
            max_upload_bytes,
        }
    }
}
