//! The `state` parameter sent with the authorization request.
//!
//! # Caution
//! The value is a fixed literal shared by every login and it is never checked
//! on the callback, so it gives **no** CSRF protection. A per-request value
//! would need server-side session storage to be verified on return.

/// The literal sent as `state` on every authorization request.
pub const FIXED_STATE: &str = "this-is-ma-state";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState(pub(crate) String);

impl AuthState {
    /// The shared, non-random state value.
    pub fn fixed() -> Self {
        Self(FIXED_STATE.to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::fixed()
    }
}
