use maintrack_core::photos::DEFAULT_MAX_UPLOAD_BYTES;

/// Where uploaded photos are stored.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// Files under `dir` on the local filesystem, served from `public_base_url`.
    Local {
        dir: String,
        public_base_url: String,
    },
    /// Objects in an S3 bucket. URLs use `public_base_url` when set, otherwise
    /// the bucket's virtual-hosted endpoint.
    S3 {
        bucket: String,
        region: String,
        public_base_url: Option<String>,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
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
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Maximum accepted photo size in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// Photo storage backend.
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                          |
    /// |---------------------------|----------------------------------|
    /// | `HOST`                    | `0.0.0.0`                        |
    /// | `PORT`                    | `3000`                           |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`          |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                             |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                             |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`                       |
    /// | `STORAGE_BACKEND`         | `local` (`local` or `s3`)        |
    /// | `STORAGE_LOCAL_DIR`       | `storage/photos`                 |
    /// | `STORAGE_PUBLIC_BASE_URL` | `http://localhost:3000/photos`   |
    /// | `S3_BUCKET`               | required when backend is `s3`    |
    /// | `S3_REGION`               | `us-east-1`                      |
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

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL").ok();

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "local" => StorageConfig::Local {
                dir: std::env::var("STORAGE_LOCAL_DIR")
                    .unwrap_or_else(|_| "storage/photos".into()),
                public_base_url: public_base_url
                    .unwrap_or_else(|| format!("http://localhost:{port}/photos")),
            },
            "s3" => StorageConfig::S3 {
                bucket: std::env::var("S3_BUCKET")
                    .expect("S3_BUCKET must be set when STORAGE_BACKEND=s3"),
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                public_base_url,
            },
            other => panic!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            max_upload_bytes,
            storage,
        }
    }
}
