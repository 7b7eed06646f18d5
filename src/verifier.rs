//! ID token verification.
//!
//! `IDTokenVerifier` is bound to one client id and one issuer. Signature, `iss`
//! and `aud` checks are done by `jsonwebtoken`. `exp` is checked here after
//! decoding, because providers may send it with a fractional part.
//!
//! Only asymmetric algorithms advertised by the provider are accepted, `RS256`
//! when it advertises none. Every cached key matching the token's `kid` (every
//! key when the token has none) is tried in turn. When none of them produces a
//! valid signature the key set is fetched once more, so key rotation at the
//! provider does not require a restart.
use std::{str::FromStr, sync::Arc};

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header, get_current_timestamp,
    errors::ErrorKind,
    jwk::{Jwk, JwkSet},
};
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    error::Error,
    executer::{ExecuteError, Executer, JwksExe},
    id_token::{IDTokenClaims, RawIDToken},
};

/// Claims an ID token must carry to be accepted. `exp` is required by `IDTokenClaims`.
const REQUIRED_CLAIMS: [&str; 3] = ["iss", "aud", "sub"];

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed jwt: {0}")]
    Header(jsonwebtoken::errors::Error),
    #[error("id token signed with unsupported algorithm, expected {expected:?} got {actual:?}")]
    UnsupportedAlgorithm {
        expected: Vec<Algorithm>,
        actual: Algorithm,
    },
    #[error("failed to fetch keys: {0}")]
    Keys(ExecuteError),
    #[error("failed to verify id token signature (kid {0:?})")]
    UnknownKey(Option<String>),
    #[error("{0}")]
    Claims(jsonwebtoken::errors::Error),
}

/// A request for the provider's JSON Web Key Set.
#[derive(Debug, Clone, PartialEq)]
pub struct JwksRequest {
    jwks_uri: Url,
}

impl JwksRequest {
    pub fn new(jwks_uri: &str) -> Result<Self, Error> {
        let jwks_uri = Url::parse(jwks_uri).map_err(|e| {
            error!("Failed to parse jwks_uri: {}", e);
            Error::URL
        })?;
        Ok(Self { jwks_uri })
    }

    pub fn jwks_uri(&self) -> &Url {
        &self.jwks_uri
    }
}

#[derive(Debug)]
pub struct IDTokenVerifier {
    client_id: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
    jwks: JwksRequest,
    exe: JwksExe,
    keys: RwLock<Option<Arc<JwkSet>>>,
}

impl IDTokenVerifier {
    /// `algorithms` are the provider's `id_token_signing_alg_values_supported`.
    pub fn new(
        client_id: &str,
        issuer: &str,
        jwks_uri: &str,
        algorithms: &[String],
        client: Client,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id: client_id.to_string(),
            issuer: issuer.to_string(),
            algorithms: supported_algorithms(algorithms),
            jwks: JwksRequest::new(jwks_uri)?,
            exe: JwksExe::new(client),
            keys: RwLock::new(None),
        })
    }

    #[cfg(test)]
    fn with_key_set(mut self, keys: JwkSet) -> Self {
        self.keys = RwLock::new(Some(Arc::new(keys)));
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// Checks signature, issuer, audience and expiry and returns the claims.
    pub async fn verify(&self, raw: &RawIDToken) -> Result<IDTokenClaims, VerifyError> {
        let header = decode_header(raw.value_as_str()).map_err(|e| {
            error!("Failed to decode ID Token header: {}", e);
            VerifyError::Header(e)
        })?;
        if !self.algorithms.contains(&header.alg) {
            error!("ID Token signed with unsupported algorithm {:?}", header.alg);
            return Err(VerifyError::UnsupportedAlgorithm {
                expected: self.algorithms.clone(),
                actual: header.alg,
            });
        }

        // one algorithm per Validation: jsonwebtoken requires every listed
        // algorithm to match the key family
        let mut validation = Validation::new(header.alg);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.validate_exp = false;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.client_id.as_str()]);

        let kid = header.kid.as_deref();
        let cached = self.keys.read().await.clone();
        if let Some(keys) = cached {
            if let Some(res) = try_keys(&keys, kid, raw, &validation) {
                return res;
            }
            debug!("No cached key verifies kid {:?}, refreshing", kid);
        }
        let keys = self.refresh_keys().await?;
        try_keys(&keys, kid, raw, &validation).unwrap_or_else(|| {
            error!("No signing key verifies kid {:?}", kid);
            Err(VerifyError::UnknownKey(kid.map(str::to_string)))
        })
    }

    async fn refresh_keys(&self) -> Result<Arc<JwkSet>, VerifyError> {
        let keys = Arc::new(self.exe.execute(&self.jwks).await.map_err(VerifyError::Keys)?);
        *self.keys.write().await = Some(Arc::clone(&keys));
        Ok(keys)
    }
}

/// Advertised asymmetric algorithms, `RS256` when there are none.
/// HMAC is never accepted: its key would be the client secret, not the provider's.
fn supported_algorithms(advertised: &[String]) -> Vec<Algorithm> {
    let algorithms: Vec<Algorithm> = advertised
        .iter()
        .filter_map(|alg| match Algorithm::from_str(alg) {
            Ok(alg) => Some(alg),
            Err(_) => {
                warn!("Ignoring unknown signing algorithm {:?}", alg);
                None
            }
        })
        .filter(|alg| !matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
        .collect();
    if algorithms.is_empty() {
        vec![Algorithm::RS256]
    } else {
        algorithms
    }
}

/// Keys whose id equals `kid`, or every key when the token has no `kid`.
fn candidates<'a>(keys: &'a JwkSet, kid: Option<&'a str>) -> impl Iterator<Item = &'a Jwk> {
    keys.keys
        .iter()
        .filter(move |jwk| kid.is_none() || jwk.common.key_id.as_deref() == kid)
}

/// `None` when no candidate key produced a valid signature.
/// Once a signature verifies, a claim failure is final.
fn try_keys(
    keys: &JwkSet,
    kid: Option<&str>,
    raw: &RawIDToken,
    validation: &Validation,
) -> Option<Result<IDTokenClaims, VerifyError>> {
    for jwk in candidates(keys, kid) {
        let key = match DecodingKey::from_jwk(jwk) {
            Ok(key) => key,
            Err(e) => {
                debug!("Skipping unusable key {:?}: {}", jwk.common.key_id, e);
                continue;
            }
        };
        match decode::<IDTokenClaims>(raw.value_as_str(), &key, validation) {
            Ok(data) => return Some(check_expiry(data.claims, validation.leeway)),
            Err(e) if is_key_mismatch(e.kind()) => continue,
            Err(e) => {
                error!("ID Token rejected: {}", e);
                return Some(Err(VerifyError::Claims(e)));
            }
        }
    }
    None
}

fn check_expiry(claims: IDTokenClaims, leeway: u64) -> Result<IDTokenClaims, VerifyError> {
    if claims.exp.saturating_add(leeway) < get_current_timestamp() {
        error!("ID Token expired at {}", claims.exp);
        return Err(VerifyError::Claims(ErrorKind::ExpiredSignature.into()));
    }
    Ok(claims)
}

fn is_key_mismatch(kind: &ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidRsaKey(_)
    )
}
