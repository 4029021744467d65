use std::path::PathBuf;

/// Which backend composes single-item place requests.
///
/// Multi-item and replace requests always need the generative backend;
/// this only picks the default for the single-item path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Local alpha compositing; keeps furniture pixels untouched.
    Pixel,
    /// External generative provider.
    Generative,
}

/// External provider endpoints and credentials.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible vision API.
    pub vision_api_url: String,
    pub vision_api_key: String,
    /// Vision model identifier (default: `gpt-4o`).
    pub vision_model: String,
    /// Generation provider task-creation endpoint.
    pub generation_create_url: String,
    /// Generation provider task-status endpoint.
    pub generation_query_url: String,
    pub generation_api_key: String,
    /// Generation model identifier (default: `nano-banana-pro`).
    pub generation_model: String,
    /// Image hosting upload endpoint.
    pub hosting_api_url: String,
    /// Image hosting key; absent means every image is inlined.
    pub hosting_api_key: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development; production
/// overrides via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `600`, long enough for
    /// a generation poll cycle).
    pub request_timeout_secs: u64,
    /// Root of the uploads/results/catalog directories.
    pub data_dir: PathBuf,
    /// SQLite database URL.
    pub database_url: String,
    /// Successful generations allowed per client.
    pub trial_limit: i64,
    /// Default backend for single-item place requests.
    pub backend: BackendKind,
    pub providers: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                     |
    /// |--------------------------|---------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                   |
    /// | `PORT`                   | `8000`                                      |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                     |
    /// | `REQUEST_TIMEOUT_SECS`   | `600`                                       |
    /// | `DATA_DIR`               | `data`                                      |
    /// | `DATABASE_URL`           | `sqlite://data/roomstage.db`                |
    /// | `TRIAL_LIMIT`            | `5`                                         |
    /// | `COMPOSE_BACKEND`        | `generative` (`pixel` to stay local)        |
    /// | `VISION_API_URL`         | `https://api.openai.com/v1`                 |
    /// | `VISION_API_KEY`         | empty                                       |
    /// | `VISION_MODEL`           | `gpt-4o`                                    |
    /// | `GENERATION_CREATE_URL`  | `https://api.kie.ai/api/v1/jobs/createTask` |
    /// | `GENERATION_QUERY_URL`   | `https://api.kie.ai/api/v1/jobs/recordInfo` |
    /// | `GENERATION_API_KEY`     | empty                                       |
    /// | `GENERATION_MODEL`       | `nano-banana-pro`                           |
    /// | `HOSTING_API_URL`        | `https://api.imgbb.com/1/upload`            |
    /// | `HOSTING_API_KEY`        | unset (inline data URIs)                    |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "8000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "600")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let trial_limit: i64 = env_or("TRIAL_LIMIT", "5")
            .parse()
            .expect("TRIAL_LIMIT must be a valid i64");

        let backend = match env_or("COMPOSE_BACKEND", "generative").as_str() {
            "pixel" => BackendKind::Pixel,
            "generative" => BackendKind::Generative,
            other => panic!("COMPOSE_BACKEND must be 'pixel' or 'generative', got '{other}'"),
        };

        let providers = ProviderConfig {
            vision_api_url: env_or("VISION_API_URL", "https://api.openai.com/v1"),
            vision_api_key: env_or("VISION_API_KEY", ""),
            vision_model: env_or("VISION_MODEL", "gpt-4o"),
            generation_create_url: env_or(
                "GENERATION_CREATE_URL",
                "https://api.kie.ai/api/v1/jobs/createTask",
            ),
            generation_query_url: env_or(
                "GENERATION_QUERY_URL",
                "https://api.kie.ai/api/v1/jobs/recordInfo",
            ),
            generation_api_key: env_or("GENERATION_API_KEY", ""),
            generation_model: env_or("GENERATION_MODEL", "nano-banana-pro"),
            hosting_api_url: env_or("HOSTING_API_URL", "https://api.imgbb.com/1/upload"),
            hosting_api_key: std::env::var("HOSTING_API_KEY").ok(),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            database_url: env_or("DATABASE_URL", "sqlite://data/roomstage.db"),
            trial_limit,
            backend,
            providers,
        }
    }

    /// Directory for uploaded room/furniture images.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    /// Directory for generation results.
    pub fn results_dir(&self) -> PathBuf {
        self.data_dir.join("results")
    }

    /// Directory for catalog item images.
    pub fn catalog_dir(&self) -> PathBuf {
        self.data_dir.join("catalog")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
