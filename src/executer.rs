//! Provides an asynchronous execution framework for sending HTTP requests to the provider.
//!
//! This module:
//! - Defines the Executer trait, which provides a unified interface for making HTTP requests.
//! - Implements executers for discovery, code exchange and JWKS requests.

use std::{collections::HashMap, error::Error, pin::Pin};

use http::StatusCode;
use jsonwebtoken::jwk::JwkSet;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;

use crate::{
    discovery::{DiscoveryRequest, ProviderMetadata},
    id_token::{TokenRequest, TokenResponse},
    verifier::JwksRequest,
};

/// generic asynchronous execution interface for sending HTTP requests.
/// Key Components:
/// - Req: The request type that the executer will handle.
/// - Response: The expected response type.
/// - Error: The error type that will be returned on failure.
/// - Future: The asynchronous execution result, returning either Response or Error
pub trait Executer<'a, Req>
where
    Req: Send,
{
    type Response;
    type Error: Error;
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send + 'a;

    fn execute(&'a self, req: &'a Req) -> Self::Future;
}

/// Defines possible errors that can occur during request execution.
#[derive(Debug, Clone, Error)]
pub enum ExecuteError {
    #[error("Failed to parse data")]
    Parse,
    #[error("Failed to send request")]
    Send,
    #[error("Failed to parse url")]
    URL,
    #[error("{status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

type ExecuteFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ExecuteError>> + Send + 'a>>;

/// Fetches the provider metadata from the discovery endpoint.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryExe {
    client: Client,
}

impl DiscoveryExe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl<'a> Executer<'a, DiscoveryRequest> for DiscoveryExe {
    type Response = ProviderMetadata;
    type Error = ExecuteError;
    type Future = ExecuteFuture<'a, Self::Response>;

    fn execute(&'a self, req: &'a DiscoveryRequest) -> Self::Future {
        Box::pin(async move {
            let url = req.well_known_url()?;
            let res = self.client.get(url).send().await.map_err(|e| {
                error!("Failed to send request: {:?}", e);
                ExecuteError::Send
            })?;
            parse_json(res).await
        })
    }
}

/// Exchanges an authorization code for a token set.
///
/// Request Workflow
/// 1. Prepare the form parameters.
/// 2. Send an HTTP POST request to the token endpoint.
/// 3. Parse and return the response as TokenResponse.
#[derive(Debug, Clone, Default)]
pub struct TokenExe {
    client: Client,
}

impl TokenExe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl<'a> Executer<'a, TokenRequest> for TokenExe {
    type Response = TokenResponse;
    type Error = ExecuteError;
    type Future = ExecuteFuture<'a, Self::Response>;

    fn execute(&'a self, req: &'a TokenRequest) -> Self::Future {
        Box::pin(async move {
            let mut params = HashMap::new();
            params.insert("code", req.code());
            params.insert("client_id", req.client_id());
            params.insert("client_secret", req.client_secret());
            params.insert("redirect_uri", req.redirect_uri());
            params.insert("grant_type", req.grant_type());

            let res = self
                .client
                .post(req.token_endpoint().clone())
                .header("Accept", "application/json")
                .form(&params)
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            parse_json(res).await
        })
    }
}

/// Fetches the provider's signing keys.
#[derive(Debug, Clone, Default)]
pub struct JwksExe {
    client: Client,
}

impl JwksExe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl<'a> Executer<'a, JwksRequest> for JwksExe {
    type Response = JwkSet;
    type Error = ExecuteError;
    type Future = ExecuteFuture<'a, Self::Response>;

    fn execute(&'a self, req: &'a JwksRequest) -> Self::Future {
        Box::pin(async move {
            let res = self
                .client
                .get(req.jwks_uri().clone())
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            parse_json(res).await
        })
    }
}

/// Non-2xx responses are returned as `Rejected` with the raw body.
async fn parse_json<T: DeserializeOwned>(res: Response) -> Result<T, ExecuteError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        error!("Request rejected with {}: {}", status, body);
        return Err(ExecuteError::Rejected { status, body });
    }
    res.json::<T>().await.map_err(|e| {
        error!("Failed to parse JSON: {:?}", e);
        ExecuteError::Parse
    })
}
