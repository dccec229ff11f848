/// Which storage backends the server runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryBackend {
    /// Postgres catalog and year configuration, S3 object storage.
    Postgres {
        database_url: String,
        bucket: String,
    },
    /// In-process stores; nothing survives a restart. Local development only.
    Memory { public_base_url: String },
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
    /// How long browsers may cache a CORS preflight, in seconds (default: `3600`).
    pub cors_max_age_secs: u64,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Key required by the admin endpoints. `None` disables them.
    pub admin_api_key: Option<String>,
    /// Shared secret the object store sends with object-created
    /// notifications. `None` accepts unauthenticated notifications.
    pub storage_event_secret: Option<String>,
    pub backend: GalleryBackend,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                               |
    /// |---------------------------|---------------------------------------|
    /// | `HOST`                    | `0.0.0.0`                             |
    /// | `PORT`                    | `3000`                                |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`               |
    /// | `CORS_MAX_AGE_SECS`       | `3600`                                |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                                  |
    /// | `ADMIN_API_KEY`           | unset (admin endpoints disabled)      |
    /// | `STORAGE_EVENT_SECRET`    | unset                                 |
    /// | `GALLERY_BACKEND`         | `postgres` (or `memory`)              |
    /// | `DATABASE_URL`            | required for `postgres`               |
    /// | `GALLERY_BUCKET`          | required for `postgres`               |
    /// | `GALLERY_PUBLIC_BASE_URL` | `http://localhost:3000/mock-storage`  |
    ///
    /// # Panics
    ///
    /// Panics on unparsable numbers, an unknown backend, or a missing
    /// variable required by the chosen backend.
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

        let cors_max_age_secs: u64 = std::env::var("CORS_MAX_AGE_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("CORS_MAX_AGE_SECS must be a valid u64");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_api_key = non_empty_var("ADMIN_API_KEY");
        let storage_event_secret = non_empty_var("STORAGE_EVENT_SECRET");

        let backend = match std::env::var("GALLERY_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .as_str()
        {
            "postgres" => GalleryBackend::Postgres {
                database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
                bucket: std::env::var("GALLERY_BUCKET").expect("GALLERY_BUCKET must be set"),
            },
            "memory" => GalleryBackend::Memory {
                public_base_url: std::env::var("GALLERY_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/mock-storage".into()),
            },
            other => panic!("GALLERY_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        Self {
            host,
            port,
            cors_origins,
            cors_max_age_secs,
            request_timeout_secs,
            admin_api_key,
            storage_event_secret,
            backend,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
