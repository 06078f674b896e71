use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64, // seconds
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub account_id: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PerformanceConfig {
    pub max_upload_size_mb: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let bucket =
            env::var("CLOUDFLARE_R2_BUCKET").unwrap_or_else(|_| "classroom-uploads".to_string());

        let config = Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("Failed to parse PORT")?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:classroom.db?mode=rwc".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("Failed to parse DATABASE_MAX_CONNECTIONS")?,
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
                access_token_expiry: env::var("JWT_ACCESS_TOKEN_EXPIRY")
                    .unwrap_or_else(|_| "86400".to_string())
                    .parse()
                    .context("Failed to parse JWT_ACCESS_TOKEN_EXPIRY")?,
            },
            storage: StorageConfig {
                account_id: env::var("CLOUDFLARE_ACCOUNT_ID").ok(),
                access_key_id: env::var("CLOUDFLARE_R2_ACCESS_KEY_ID").ok(),
                secret_access_key: env::var("CLOUDFLARE_R2_SECRET_ACCESS_KEY").ok(),
                public_base_url: env::var("CLOUDFLARE_R2_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("https://{}.r2.dev", bucket)),
                bucket,
            },
            performance: PerformanceConfig {
                max_upload_size_mb: env::var("MAX_UPLOAD_SIZE_MB")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
            },
        };

        // Validate JWT secret length (minimum 32 characters for security)
        if config.jwt.secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
