//! The narrow interface between the HTTP handlers and the identity provider.
//!
//! Handlers only ever see `dyn Provider`; `OidcProvider` is the implementation
//! talking to a real provider, and tests substitute their own.
use std::pin::Pin;

use reqwest::Client;
use tracing::{error, info};

use crate::{
    code::{Code, CodeRequest},
    config::Config,
    discovery::{DiscoveryRequest, ProviderMetadata},
    error::Error,
    executer::{DiscoveryExe, Executer, TokenExe},
    id_token::{IDTokenClaims, RawIDToken, TokenRequest, TokenResponse},
    settings::Settings,
    state::AuthState,
    verifier::IDTokenVerifier,
};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 'a>>;

pub trait Provider: Send + Sync {
    /// URL the browser is sent to in order to authenticate.
    fn authorization_url(&self, state: &AuthState) -> String;

    /// Exchanges an authorization code at the token endpoint.
    fn exchange<'a>(&'a self, code: &'a Code) -> ProviderFuture<'a, TokenResponse>;

    /// Verifies an ID token and returns its claims.
    fn verify<'a>(&'a self, id_token: &'a RawIDToken) -> ProviderFuture<'a, IDTokenClaims>;
}

#[derive(Debug)]
pub struct OidcProvider {
    config: Config,
    metadata: ProviderMetadata,
    verifier: IDTokenVerifier,
    token_exe: TokenExe,
}

impl OidcProvider {
    /// Fetches the discovery document of `settings.issuer_url` and builds the
    /// client configuration and verifier from it.
    pub async fn discover(settings: &Settings) -> Result<Self, Error> {
        let client = Client::new();
        let req = DiscoveryRequest::new(&settings.issuer_url);
        let metadata = DiscoveryExe::new(client.clone())
            .execute(&req)
            .await
            .map_err(Error::Discovery)?;

        if !metadata.issued_by(req.issuer()) {
            error!(
                "Issuer mismatch: configured {}, discovered {}",
                req.issuer(),
                metadata.issuer
            );
            return Err(Error::IssuerMismatch {
                expected: req.issuer().to_string(),
                actual: metadata.issuer,
            });
        }

        let config = Config::builder()
            .auth_endpoint(&metadata.authorization_endpoint)
            .token_endpoint(&metadata.token_endpoint)
            .client_id(&settings.client_id)
            .client_secret(&settings.client_secret)
            .redirect_uri(&settings.redirect_url)
            .build()?;
        let verifier = IDTokenVerifier::new(
            &settings.client_id,
            &metadata.issuer,
            &metadata.jwks_uri,
            &metadata.id_token_signing_alg_values_supported,
            client.clone(),
        )?;
        info!("Discovered provider {}", metadata.issuer);

        Ok(Self {
            config,
            metadata,
            verifier,
            token_exe: TokenExe::new(client),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }
}

impl Provider for OidcProvider {
    fn authorization_url(&self, state: &AuthState) -> String {
        CodeRequest::new(&self.config, state).into_url()
    }

    fn exchange<'a>(&'a self, code: &'a Code) -> ProviderFuture<'a, TokenResponse> {
        Box::pin(async move {
            let req = TokenRequest::new(&self.config, code.clone());
            self.token_exe.execute(&req).await.map_err(Error::Exchange)
        })
    }

    fn verify<'a>(&'a self, id_token: &'a RawIDToken) -> ProviderFuture<'a, IDTokenClaims> {
        Box::pin(async move { Ok(self.verifier.verify(id_token).await?) })
    }
}
