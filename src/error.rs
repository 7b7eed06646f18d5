use thiserror::Error;

use crate::{executer::ExecuteError, verifier::VerifyError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to discover provider: {0}")]
    Discovery(ExecuteError),
    #[error("issuer did not match the issuer returned by provider, expected {expected:?} got {actual:?}")]
    IssuerMismatch { expected: String, actual: String },
    #[error("failed to exchange code: {0}")]
    Exchange(ExecuteError),
    #[error("no id_token field in oauth2 token")]
    MissingIDToken,
    #[error("failed to verify ID Token: {0}")]
    Verify(#[from] VerifyError),
    #[error("Failed to parse url")]
    URL,
    #[error("missing environment variable {0}")]
    Env(String),
    #[error("Failed to serialize login payload")]
    Serialize,
}
