use anyhow::Result;

const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Runtime configuration for the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the discovery backend.
    pub api_url: String,
}

impl Config {
    /// Resolve configuration: explicit flag, then `SCOUT_API_URL`, then the
    /// local default.
    pub fn from_env(override_url: Option<String>) -> Result<Self> {
        let api_url = override_url
            .or_else(|| std::env::var("SCOUT_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self { api_url })
    }
}
