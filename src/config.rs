use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr};

use crate::{services::file_service::FileSettings, store::s3::S3Settings};

/// Which object store client to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Any S3-compatible service (AWS S3, MinIO, ...).
    S3,
    /// In-process store; contents are lost on restart.
    Memory,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub store_backend: StoreBackend,
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub url_expiry_hours: u32,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "File and user gateway over an S3-compatible object store")]
pub struct Args {
    /// Host to bind to (overrides FILE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides FILE_GATEWAY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Object store backend (overrides FILE_GATEWAY_STORE_BACKEND)
    #[arg(long, value_enum)]
    pub store_backend: Option<StoreBackend>,

    /// Bucket holding uploaded files (overrides FILE_GATEWAY_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Object store endpoint URL (overrides FILE_GATEWAY_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Object store region (overrides FILE_GATEWAY_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Default validity of file URLs in hours (overrides FILE_GATEWAY_URL_EXPIRY_HOURS)
    #[arg(long)]
    pub url_expiry_hours: Option<u32>,

    /// Largest accepted upload body in bytes (overrides FILE_GATEWAY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args)?, migrate))
    }

    /// CLI flag wins, then environment, then built-in default.
    fn merge(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env_or("FILE_GATEWAY_HOST", "0.0.0.0");
        let env_port = env_parse("FILE_GATEWAY_PORT", 8080)?;
        let env_db = env_or(
            "FILE_GATEWAY_DATABASE_URL",
            "sqlite://./data/file_gateway.db",
        );
        let env_backend = match env::var("FILE_GATEWAY_STORE_BACKEND") {
            Ok(value) => StoreBackend::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!(err))
                .with_context(|| format!("parsing FILE_GATEWAY_STORE_BACKEND value `{}`", value))?,
            Err(env::VarError::NotPresent) => StoreBackend::S3,
            Err(err) => return Err(err).context("reading FILE_GATEWAY_STORE_BACKEND"),
        };
        let env_bucket = env_or("FILE_GATEWAY_BUCKET", "files");
        let env_endpoint = env_or("FILE_GATEWAY_ENDPOINT", "http://127.0.0.1:9000");
        let env_region = env_or("FILE_GATEWAY_REGION", "us-east-1");
        let env_expiry = env_parse("FILE_GATEWAY_URL_EXPIRY_HOURS", 1)?;
        let env_max_upload = env_parse("FILE_GATEWAY_MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            store_backend: args.store_backend.unwrap_or(env_backend),
            bucket: args.bucket.unwrap_or(env_bucket),
            endpoint: args.endpoint.unwrap_or(env_endpoint),
            region: args.region.unwrap_or(env_region),
            access_key: env::var("FILE_GATEWAY_ACCESS_KEY").ok(),
            secret_key: env::var("FILE_GATEWAY_SECRET_KEY").ok(),
            url_expiry_hours: args.url_expiry_hours.unwrap_or(env_expiry),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        if cfg.url_expiry_hours == 0 {
            anyhow::bail!("url expiry must be at least one hour");
        }

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn file_settings(&self) -> FileSettings {
        FileSettings {
            bucket: self.bucket.clone(),
            endpoint: self.endpoint.clone(),
            url_expiry_hours: self.url_expiry_hours,
        }
    }

    pub fn s3_settings(&self) -> S3Settings {
        S3Settings {
            endpoint: self.endpoint.clone(),
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        }
    }
}

// Hand-written so the secret key never reaches the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("store_backend", &self.store_backend)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("url_expiry_hours", &self.url_expiry_hours)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}
