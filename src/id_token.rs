//! Provides the code exchange and the tokens it returns.
//!
//! This module:
//! TokenRequest: A data structure for sending the code to the token endpoint.
//! TokenResponse: The token set returned by the token endpoint, with every non-standard field kept in `extra`.
//! AccessToken / RefreshToken: Tokens handed on to the client application.
//! RawIDToken: The encoded ID token, before verification.
//! IDTokenClaims: The claims of an ID token that passed verification.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Number, Value};
use url::Url;

use crate::{
    code::Code,
    config::{ClientID, ClientSecret, Config, RedirectURI, TokenEndPoint},
    error::Error,
};

/// Represents an OAuth 2.0 access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    pub fn value_as_str(&self) -> &str {
        &self.0
    }
}

/// Represents an OAuth 2.0 refresh token, issued when `offline` access was granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    pub fn value_as_str(&self) -> &str {
        &self.0
    }
}

/// Represents an encoded ID token, which must be verified before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIDToken(pub(crate) String);

impl RawIDToken {
    pub fn value_as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawIDToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A structure used to send the authorization code to the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    token_endpoint: TokenEndPoint,
    code: Code,
    client_id: ClientID,
    client_secret: ClientSecret,
    redirect_uri: RedirectURI,
    grant_type: String,
}

impl TokenRequest {
    /// Creates a new request using parameters from Config.
    pub fn new(config: &Config, code: Code) -> Self {
        Self {
            token_endpoint: config.token_endpoint.to_owned(),
            code,
            client_id: config.client_id.to_owned(),
            client_secret: config.client_secret.to_owned(),
            redirect_uri: config.redirect_uri.to_owned(),
            grant_type: "authorization_code".to_string(),
        }
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint.0
    }

    pub fn code(&self) -> &str {
        &self.code.0
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret.0
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri.0
    }

    pub fn grant_type(&self) -> &str {
        &self.grant_type
    }
}

/// The response of the token endpoint.
///
/// `id_token` is not an OAuth 2.0 field, so it is looked up in `extra`
/// together with anything else the provider chose to return.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    access_token: AccessToken,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl TokenResponse {
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Looks up an additional field returned by the token endpoint.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// The raw ID token. Absent or non-string values are `Error::MissingIDToken`.
    pub fn id_token(&self) -> Result<RawIDToken, Error> {
        self.extra("id_token")
            .and_then(Value::as_str)
            .map(RawIDToken::from)
            .ok_or(Error::MissingIDToken)
    }
}

/// Claims of a verified ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IDTokenClaims {
    pub iss: String,
    pub sub: String,
    #[serde(deserialize_with = "numeric_date")]
    pub exp: u64,
    #[serde(default, deserialize_with = "optional_numeric_date")]
    pub iat: Option<u64>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// NumericDate may carry a fractional part; whole seconds are kept.
fn numeric_date<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    match (number.as_u64(), number.as_f64()) {
        (Some(secs), _) => Ok(secs),
        (None, Some(secs)) if secs >= 0.0 => Ok(secs as u64),
        _ => Err(de::Error::custom(format!("invalid NumericDate {}", number))),
    }
}

fn optional_numeric_date<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "numeric_date")] u64);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(secs)| secs))
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::{code::Code, config::ConfigBuilder, error::Error};

    use super::{IDTokenClaims, RawIDToken, TokenRequest, TokenResponse};

    #[test]
    fn test_token_request_new() {
        let config = ConfigBuilder::new()
            .auth_endpoint("https://auth.example.com/auth")
            .token_endpoint("https://token.example.com/token")
            .client_id("client_id")
            .client_secret("secret")
            .redirect_uri("https://redirect.example.com")
            .build()
            .unwrap();

        let code = Code::from("auth_code");
        let request = TokenRequest::new(&config, code.clone());

        assert_eq!(request.token_endpoint().as_str(), "https://token.example.com/token");
        assert_eq!(request.client_id(), "client_id");
        assert_eq!(request.client_secret(), "secret");
        assert_eq!(request.redirect_uri(), "https://redirect.example.com");
        assert_eq!(request.grant_type(), "authorization_code");
        assert_eq!(request.code, code);
    }

    #[test]
    fn test_token_response_with_id_token() {
        let json = r#"{
            "access_token": "access_token_value",
            "token_type": "Bearer",
            "refresh_token": "refresh_token_value",
            "expires_in": 3600,
            "scope": "openid offline",
            "id_token": "header.payload.signature"
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.access_token().value_as_str(), "access_token_value");
        assert_eq!(response.token_type(), "Bearer");
        assert_eq!(
            response.refresh_token().map(|t| t.value_as_str()),
            Some("refresh_token_value")
        );
        assert_eq!(response.expires_in(), Some(3600));
        assert_eq!(response.scope(), Some("openid offline"));
        assert_eq!(
            response.id_token().unwrap(),
            RawIDToken::from("header.payload.signature")
        );
    }

    #[test]
    fn test_token_response_without_id_token() {
        let json = r#"{"access_token": "a", "token_type": "Bearer"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();

        assert!(response.refresh_token().is_none());
        assert!(matches!(response.id_token(), Err(Error::MissingIDToken)));
    }

    #[test]
    fn test_token_response_non_string_id_token() {
        let json = r#"{"access_token": "a", "token_type": "Bearer", "id_token": 42}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();

        assert!(response.extra("id_token").is_some());
        assert!(matches!(response.id_token(), Err(Error::MissingIDToken)));
    }

    #[test]
    fn test_token_response_without_token_type() {
        let json = r#"{"access_token": "a", "id_token": "header.payload.signature"}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.token_type(), "");
        assert!(response.id_token().is_ok());
    }

    #[test]
    fn test_claims_fractional_dates() {
        let json = r#"{"iss": "https://idp.example.com/", "sub": "abc123", "exp": 1742193216.5, "iat": 1742189616.25}"#;
        let claims: IDTokenClaims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.exp, 1742193216);
        assert_eq!(claims.iat, Some(1742189616));
    }

    #[test]
    fn test_claims_integer_dates() {
        let json = r#"{"iss": "https://idp.example.com/", "sub": "abc123", "exp": 1742193216, "iat": null}"#;
        let claims: IDTokenClaims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.exp, 1742193216);
        assert_eq!(claims.iat, None);

        let json = r#"{"iss": "https://idp.example.com/", "sub": "abc123", "exp": -5}"#;
        assert!(serde_json::from_str::<IDTokenClaims>(json).is_err());
    }
}
