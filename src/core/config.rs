use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Static bearer token gating mutating routes. Token validation mechanics
/// live outside this service; an unset token disables the gate.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Configuration for the AI provider adapters and retrieval clients.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// API key for the hosted OpenAI-compatible provider (also used for embeddings)
    pub openai_api_key: Option<String>,
    /// API key for the hosted Groq provider
    pub groq_api_key: Option<String>,
    /// Base URL of the self-hosted CPU inference server (hf-small category)
    pub hf_cpu_url: Option<String>,
    /// Base URL of the self-hosted GPU inference server (hf-large category)
    pub hf_gpu_url: Option<String>,
    /// Model used to embed questions for context retrieval
    pub embedding_model: String,
    /// Vector store query endpoint
    pub vector_store_url: Option<String>,
    /// Vector store API key
    pub vector_store_api_key: Option<String>,
    /// Number of context chunks fetched per question
    pub retrieval_top_k: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env(),
            swagger: SwaggerConfig::from_env(),
            ai: AiConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Conservative defaults for small-medium apps
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        // Only enable the gate if a non-empty token is configured
        let api_token = env::var("API_TOKEN").ok().filter(|s| !s.is_empty());
        Self { api_token }
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Self {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Palaver API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Chat history and AI provider routing API".to_string());

        Self {
            username,
            password,
            title,
            version,
            description,
        }
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl AiConfig {
    const DEFAULT_EMBEDDING_MODEL: &'static str = "text-embedding-ada-002";
    const DEFAULT_RETRIEVAL_TOP_K: u32 = 5;

    pub fn from_env() -> Result<Self, String> {
        let openai_api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());
        let groq_api_key = env::var("GROQ_API_KEY").ok().filter(|s| !s.is_empty());
        let hf_cpu_url = env::var("SERVER_URL").ok().filter(|s| !s.is_empty());
        let hf_gpu_url = env::var("SERVER_GPU_URL").ok().filter(|s| !s.is_empty());

        let embedding_model = env::var("EMBEDDING_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_EMBEDDING_MODEL.to_string());

        let vector_store_url = env::var("VECTOR_STORE_URL").ok().filter(|s| !s.is_empty());
        let vector_store_api_key = env::var("VECTOR_STORE_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        let retrieval_top_k = env::var("RETRIEVAL_TOP_K")
            .unwrap_or_else(|_| Self::DEFAULT_RETRIEVAL_TOP_K.to_string())
            .parse::<u32>()
            .map_err(|_| "RETRIEVAL_TOP_K must be a valid number".to_string())?;

        Ok(Self {
            openai_api_key,
            groq_api_key,
            hf_cpu_url,
            hf_gpu_url,
            embedding_model,
            vector_store_url,
            vector_store_api_key,
            retrieval_top_k,
        })
    }
}

#[cfg(test)]
impl AiConfig {
    /// Config with nothing set, for dispatch tests
    pub fn empty() -> Self {
        Self {
            openai_api_key: None,
            groq_api_key: None,
            hf_cpu_url: None,
            hf_gpu_url: None,
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            vector_store_url: None,
            vector_store_api_key: None,
            retrieval_top_k: Self::DEFAULT_RETRIEVAL_TOP_K,
        }
    }
}
