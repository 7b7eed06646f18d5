//! Defines structures and builders related to the OAuth client configuration.
//!
//! Provides a structured way to handle the credentials and endpoints required
//! for the authorization request and the code exchange.
//!
//! ## Structures
//! - `Config`: Stores all the necessary client information.
//! - `ConfigBuilder`: A builder for constructing a `Config` instance.
//!
//! # Example
//! ```rust,no_run
//! use tiny_oidc_login::config::Config;
//!
//! let config = Config::builder()
//!     .auth_endpoint("https://idp.example.com/oauth2/auth")
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .token_endpoint("https://idp.example.com/oauth2/token")
//!     .redirect_uri("https://your-app.com/")
//!     .build()
//!     .unwrap();
//! ```
use tracing::error;
use url::Url;

use crate::error::Error;

/// Scopes requested on every authorization request.
/// `openid` is required for OpenID Connect, `offline` asks for a refresh token.
pub const SCOPES: [&str; 2] = ["openid", "offline"];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AuthEndPoint(pub Url);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TokenEndPoint(pub Url);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientID(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientSecret(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RedirectURI(pub String);

/// Holds the OAuth client information used for the whole process lifetime.
///
/// It is immutable once constructed. The endpoints are usually taken from the
/// provider's discovery document, see [`crate::provider::OidcProvider::discover`].
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) auth_endpoint: AuthEndPoint,
    pub(crate) client_id: ClientID,
    pub(crate) client_secret: ClientSecret,
    pub(crate) token_endpoint: TokenEndPoint,
    pub(crate) redirect_uri: RedirectURI,
}

// ==========impl Config==========
impl Config {
    /// Returns a new `ConfigBuilder` instance to create a `Config` object.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn auth_endpoint(&self) -> &Url {
        &self.auth_endpoint.0
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint.0
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri.0
    }
}

/// Provides a convenient way to create a `Config` instance step by step.
///
/// Endpoint URLs are validated in [`ConfigBuilder::build`], so a built
/// `Config` can always produce an authorization URL.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    auth_endpoint: String,
    client_id: ClientID,
    client_secret: ClientSecret,
    token_endpoint: String,
    redirect_uri: RedirectURI,
}

// ==========impl ConfigBuilder==========
impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` instance with default values.
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Sets the authorization endpoint URL.
    pub fn auth_endpoint(mut self, auth_endpoint: &str) -> Self {
        self.auth_endpoint = auth_endpoint.to_string();
        self
    }

    /// Sets the client ID registered at the provider.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientID(client_id.to_string());
        self
    }

    /// Sets the client secret associated with the client ID.
    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = ClientSecret(client_secret.to_string());
        self
    }

    /// Sets the token exchange endpoint URL.
    pub fn token_endpoint(mut self, token_endpoint: &str) -> Self {
        self.token_endpoint = token_endpoint.to_string();
        self
    }

    /// Sets the redirect URI registered at the provider.
    pub fn redirect_uri(mut self, redirect_uri: &str) -> Self {
        self.redirect_uri = RedirectURI(redirect_uri.to_string());
        self
    }

    /// Constructs a `Config` instance, parsing both endpoint URLs.
    pub fn build(self) -> Result<Config, Error> {
        Ok(Config {
            auth_endpoint: AuthEndPoint(parse_endpoint(&self.auth_endpoint)?),
            client_id: self.client_id,
            client_secret: self.client_secret,
            token_endpoint: TokenEndPoint(parse_endpoint(&self.token_endpoint)?),
            redirect_uri: self.redirect_uri,
        })
    }
}

fn parse_endpoint(value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| {
        error!("Failed to parse endpoint {:?}: {}", value, e);
        Error::URL
    })
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::error::Error;

    use super::{Config, ConfigBuilder};

    #[test]
    fn test_config_builder() {
        let auth_endpoint = "https://auth.example.com/auth";
        let client_id = "my_client_id";
        let client_secret = "my_secret";
        let token_endpoint = "https://token.example.com/token";
        let redirect_uri = "https://redirect.example.com";

        let config = ConfigBuilder::new()
            .auth_endpoint(auth_endpoint)
            .client_id(client_id)
            .client_secret(client_secret)
            .token_endpoint(token_endpoint)
            .redirect_uri(redirect_uri)
            .build()
            .unwrap();

        assert_eq!(config.auth_endpoint.0.as_str(), auth_endpoint);
        assert_eq!(config.client_id.0, client_id);
        assert_eq!(config.client_secret.0, client_secret);
        assert_eq!(config.token_endpoint.0.as_str(), token_endpoint);
        assert_eq!(config.redirect_uri.0, redirect_uri);
    }

    #[test]
    fn test_config_builder_default_fails() {
        let config = ConfigBuilder::default().build();
        assert!(matches!(config, Err(Error::URL)));
    }

    #[test]
    fn test_config_builder_invalid_token_endpoint() {
        let config = Config::builder()
            .auth_endpoint("https://auth.example.com/auth")
            .token_endpoint("not a url")
            .build();
        assert!(matches!(config, Err(Error::URL)));
    }

    #[test]
    fn test_config_getters() {
        let config = Config::builder()
            .auth_endpoint("https://auth.example.com/auth")
            .client_id("my_client_id")
            .token_endpoint("https://token.example.com/token")
            .redirect_uri("https://redirect.example.com")
            .build()
            .unwrap();

        assert_eq!(config.client_id(), "my_client_id");
        assert_eq!(config.redirect_uri(), "https://redirect.example.com");
        assert_eq!(config.auth_endpoint().host_str(), Some("auth.example.com"));
        assert_eq!(config.token_endpoint().path(), "/token");
    }
}
