//! Provider discovery.
//!
//! The provider publishes its endpoints at
//! `<issuer>/.well-known/openid-configuration`. Only the fields this crate
//! consumes are modelled; everything else in the document is ignored.
use serde::Deserialize;
use tracing::error;
use url::Url;

use crate::executer::ExecuteError;

const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

/// A request for the discovery document of one issuer.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryRequest {
    issuer: String,
}

impl DiscoveryRequest {
    pub fn new(issuer: &str) -> Self {
        Self {
            issuer: issuer.to_string(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// `<issuer>/.well-known/openid-configuration`, with or without a trailing slash on the issuer.
    pub fn well_known_url(&self) -> Result<Url, ExecuteError> {
        let url = format!("{}/{}", self.issuer.trim_end_matches('/'), WELL_KNOWN_PATH);
        Url::parse(&url).map_err(|e| {
            error!("Failed to parse url: {:?}", e);
            ExecuteError::URL
        })
    }
}

/// The subset of the OpenID Provider Metadata used by the relying party.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub jwks_uri: String,
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    #[serde(default)]
    pub scopes_supported: Vec<String>,
    #[serde(default)]
    pub id_token_signing_alg_values_supported: Vec<String>,
}

impl ProviderMetadata {
    /// Issuers compare equal when they differ only by a trailing slash.
    pub fn issued_by(&self, issuer: &str) -> bool {
        self.issuer.trim_end_matches('/') == issuer.trim_end_matches('/')
    }
}
