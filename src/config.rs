use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Bucket holding the downloadable files. Optional on purpose: its
    /// absence degrades the file endpoints to a configuration error response
    /// instead of preventing startup.
    pub bucket: Option<String>,
    pub database_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Expiring signed-link service")]
pub struct Args {
    /// Host to bind to (overrides LINK_SERVICE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides LINK_SERVICE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket holding the downloadable files (overrides LINK_SERVICE_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Grant database URL (overrides LINK_SERVICE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("LINK_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("LINK_SERVICE_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing LINK_SERVICE_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 8080,
            Err(err) => return Err(err).context("reading LINK_SERVICE_PORT"),
        };
        let env_bucket = env::var("LINK_SERVICE_BUCKET").ok();
        let env_db = env::var("LINK_SERVICE_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/link_service.db".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            bucket: args.bucket.or(env_bucket),
            database_url: args.database_url.unwrap_or(env_db),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
