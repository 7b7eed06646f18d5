//! Hands the tokens to the client application.
//!
//! The application registers a URL scheme (e.g. `myapp`); after a successful
//! login the browser is shown a link `myapp://login?{...}` whose query string
//! is the JSON encoded `LoginPayload`.
//!
//! # Caution
//! The JSON is embedded as is, without percent-encoding, because the receiving
//! application reads the raw query string. Tokens end up in browser history.
use serde::Serialize;
use tracing::error;

use crate::{
    error::Error,
    id_token::{IDTokenClaims, RawIDToken, TokenResponse},
};

/// Keys are serialized in this order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginPayload {
    pub access_token: String,
    pub id_token: String,
    /// Empty when the provider issued no refresh token.
    pub refresh_token: String,
    pub user_id: String,
}

impl LoginPayload {
    pub fn new(token: &TokenResponse, id_token: &RawIDToken, claims: &IDTokenClaims) -> Self {
        Self {
            access_token: token.access_token().value_as_str().to_string(),
            id_token: id_token.value_as_str().to_string(),
            refresh_token: token
                .refresh_token()
                .map(|t| t.value_as_str().to_string())
                .unwrap_or_default(),
            user_id: claims.sub.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppLink {
    protocol: String,
}

impl AppLink {
    pub fn new(protocol: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
        }
    }

    /// `<protocol>://login?<json>`
    pub fn link(&self, payload: &LoginPayload) -> Result<String, Error> {
        let json = serde_json::to_string(payload).map_err(|e| {
            error!("Failed to serialize login payload: {}", e);
            Error::Serialize
        })?;
        Ok(format!("{}://login?{}", self.protocol, json))
    }

    /// The HTML page offering the link to the user.
    pub fn page(&self, payload: &LoginPayload) -> Result<String, Error> {
        let link = self.link(payload)?;
        Ok(format!(
            "Click here to login to your app: <a href='{}'>Login</a>",
            link
        ))
    }
}
