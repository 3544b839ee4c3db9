use anyhow::{Context, Result};
use std::env;

/// Server settings read from the environment (after `.env` loading).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, default `0.0.0.0`.
    pub bind_addr: String,
    /// Listen port, default 5000. Hosting platforms set `PORT`.
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        Ok(Self { bind_addr, port })
    }
}
