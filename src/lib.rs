//! Tiny OpenID Connect relying party for native applications.
//!
//! The browser is redirected to the identity provider, the authorization code
//! is exchanged for tokens, the ID token is verified, and the tokens are handed
//! to a client application through a link on its own URL scheme.
//! # Feature
//! - Discover the provider's endpoints (`/.well-known/openid-configuration`)
//! - Generate an authorization request URL (code flow)
//! - Exchange the code for tokens (using reqwest)
//! - Verify the ID token against the provider's JWKS (using jsonwebtoken)
//! - Serve `/login` and the callback with axum
//! # Caution
//! - The `state` parameter is a fixed value and is not checked on the callback,
//!   see [`state`]. Do not rely on it for CSRF protection.
//! - Tokens are placed in a link query string, unescaped.
pub mod app_link;
pub mod code;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executer;
pub mod id_token;
pub mod provider;
pub mod server;
pub mod settings;
pub mod state;
pub mod verifier;
