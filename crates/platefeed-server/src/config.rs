//! Server configuration loaded from environment variables.
//!
//! Most settings have sensible defaults so the server can start with zero
//! configuration for local development.  The media-storage credentials are
//! the exception: the process refuses to start without them, because food
//! creation would fail on its first upload anyway.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DATABASE_PATH`
    /// Default: `./platefeed.db`
    pub database_path: PathBuf,

    /// Session-token signing key (hex-encoded, 64 chars).
    /// Env: `TOKEN_SECRET`
    /// Default: random per-process key; sessions then do not survive a
    /// restart, so this is only acceptable for development.
    pub token_secret: [u8; 32],

    /// Media CDN public API key.
    /// Env: `STORAGE_PUBLIC_KEY` (required)
    ///
    /// The CDN issues its credentials as a set; uploads authenticate with
    /// the private key only, but an account missing its public key is
    /// misconfigured, so startup requires all three variables.
    pub storage_public_key: String,

    /// Media CDN private API key.
    /// Env: `STORAGE_PRIVATE_KEY` (required)
    pub storage_private_key: String,

    /// Media CDN endpoint base URL.
    /// Env: `STORAGE_URL_ENDPOINT` (required)
    pub storage_url_endpoint: String,

    /// Maximum accepted media upload size in bytes (50 MiB).
    pub max_media_size: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when any media-storage credential is absent or the token
    /// secret is malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut http_addr: SocketAddr = ([0, 0, 0, 0], 3000).into();
        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            http_addr = addr
                .parse()
                .with_context(|| format!("invalid HTTP_ADDR: {addr}"))?;
        }

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./platefeed.db"));

        let token_secret = match std::env::var("TOKEN_SECRET") {
            Ok(hex_key) => parse_hex_secret(&hex_key)
                .map_err(|e| anyhow::anyhow!("invalid TOKEN_SECRET: {e}"))?,
            Err(_) => {
                tracing::warn!(
                    "TOKEN_SECRET not set; using a random per-process key \
                     (sessions will not survive a restart)"
                );
                rand::random()
            }
        };

        let storage_public_key = require_env("STORAGE_PUBLIC_KEY")?;
        let storage_private_key = require_env("STORAGE_PRIVATE_KEY")?;
        let storage_url_endpoint = require_env("STORAGE_URL_ENDPOINT")?;

        Ok(Self {
            http_addr,
            database_path,
            token_secret,
            storage_public_key,
            storage_private_key,
            storage_url_endpoint,
            max_media_size: 50 * 1024 * 1024, // 50 MiB
        })
    }
}

fn require_env(name: &str) -> anyhow::Result<String> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => bail!("missing required media storage credential: {name}"),
    }
}

/// Parse a 64-character hex string into a 32-byte key.
fn parse_hex_secret(hex: &str) -> Result<[u8; 32], String> {
    let hex = hex.trim();
    if hex.len() != 64 {
        return Err(format!("expected 64 hex chars, got {}", hex.len()));
    }
    let bytes = hex::decode(hex).map_err(|e| e.to_string())?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}
