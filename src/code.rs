//! This module handles the authorization request and the `code` returned on the callback.
//!
//! It provides the following key functionalities:
//! - Generating an authorization request URL (`CodeRequest`).
//! - Reading the callback query (`CallbackQuery`) into a `Code`.
//!
//! # Flow
//! 1. `GET /login` builds a `CodeRequest` and redirects the browser to its URL.
//! 2. After authentication the provider redirects back with `?code=...&state=...`.
//! 3. `CallbackQuery::code` yields the `Code` that is exchanged for tokens.
//!
//! # Example
//! ```rust,no_run
//! use tiny_oidc_login::{code::CodeRequest, config::Config, state::AuthState};
//!
//! let config = Config::builder()
//!     .auth_endpoint("https://idp.example.com/oauth2/auth")
//!     .token_endpoint("https://idp.example.com/oauth2/token")
//!     .client_id("your_client_id")
//!     .redirect_uri("http://localhost:1805/")
//!     .build()
//!     .unwrap();
//!
//! let url = CodeRequest::new(&config, &AuthState::fixed()).into_url();
//! println!("Auth URL: {}", url);
//! ```
use itertools::Itertools;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::{
    config::{AuthEndPoint, ClientID, Config, RedirectURI, SCOPES},
    state::AuthState,
};

/// The authorization code sent back by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Code(pub(crate) String);

impl Code {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Generates the URL that starts the authorization code flow.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    auth_endpoint: AuthEndPoint,
    client_id: ClientID,
    response_type: String,
    redirect_uri: RedirectURI,
    state: AuthState,
}

impl CodeRequest {
    pub fn new(config: &Config, state: &AuthState) -> Self {
        Self {
            auth_endpoint: config.auth_endpoint.to_owned(),
            client_id: config.client_id.to_owned(),
            response_type: "code".to_string(),
            redirect_uri: config.redirect_uri.to_owned(),
            state: state.to_owned(),
        }
    }

    /// Appends the request parameters to the authorization endpoint.
    /// Parameters already present on the endpoint are kept.
    pub fn into_url(&self) -> String {
        let mut url: Url = self.auth_endpoint.0.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id.0)
            .append_pair("redirect_uri", &self.redirect_uri.0)
            .append_pair("response_type", &self.response_type)
            .append_pair("scope", &SCOPES.iter().join(" "))
            .append_pair("state", &self.state.0);
        url.into()
    }
}

/// Query parameters of the callback request.
///
/// Every field is optional: a bare `GET /` simply means the user has not logged in yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackQuery {
    /// Returns the code, treating an empty value as absent.
    /// A provider error is logged and also yields `None`.
    pub fn code(&self) -> Option<Code> {
        if let Some(error) = &self.error {
            warn!(
                "Provider returned an error: {} ({})",
                error,
                self.error_description.as_deref().unwrap_or("no description")
            );
        }
        self.code
            .as_deref()
            .filter(|code| !code.is_empty())
            .map(Code::from)
    }
}
