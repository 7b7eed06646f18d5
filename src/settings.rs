//! Process settings read from the environment.
//!
//! Values are looked up through `dotenvy`, so a `.env` file next to the
//! binary works as well as real environment variables.
//!
//! ```text
//! CLIENT_ID="your_client_id"
//! CLIENT_SECRET="your_client_secret"
//! REDIRECT_URL="http://localhost:1805/"
//! PROTOCOL="myapp"
//! ```
use tracing::error;

use crate::error::Error;

pub const DEFAULT_ISSUER_URL: &str = "https://athena.skymavis.com/";
pub const DEFAULT_PORT: u16 = 1805;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    /// URL scheme of the application receiving the tokens.
    pub protocol: String,
    pub issuer_url: String,
    pub port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds settings from any key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                error!("Failed to read env {}", key);
                Error::Env(key.to_string())
            })
        };

        let port = match get("PORT") {
            Some(port) => port.parse::<u16>().map_err(|e| {
                error!("Failed to parse PORT {:?}: {}", port, e);
                Error::Env("PORT".to_string())
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            client_id: require("CLIENT_ID")?,
            client_secret: require("CLIENT_SECRET")?,
            redirect_url: require("REDIRECT_URL")?,
            protocol: require("PROTOCOL")?,
            issuer_url: get("ISSUER_URL").unwrap_or_else(|| DEFAULT_ISSUER_URL.to_string()),
            port,
        })
    }
}
