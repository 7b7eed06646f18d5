//! HTTP surface of the relying party.
//!
//! - `GET /login`: 307 redirect to the provider's authorization URL.
//! - `GET /`: callback. Without `code` it shows a login prompt, with `code` it
//!   exchanges and verifies the tokens and shows a link into the client application.
//!
//! Every failure on the callback is a 500 whose body is the error text as a JSON string.
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use http::StatusCode;
use tracing::error;

use crate::{
    app_link::{AppLink, LoginPayload},
    code::CallbackQuery,
    error::Error,
    provider::Provider,
    state::AuthState,
};

pub const LOGIN_PROMPT: &str = "Please login at <a href='/login'>/login</a> first.";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn Provider>,
    app_link: AppLink,
    state: AuthState,
}

impl AppState {
    pub fn new(provider: Arc<dyn Provider>, app_link: AppLink) -> Self {
        Self {
            provider,
            app_link,
            state: AuthState::fixed(),
        }
    }
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/", get(callback))
        .with_state(Arc::new(app_state))
}

async fn login(State(app_state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&app_state.provider.authorization_url(&app_state.state))
}

async fn callback(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Html<String>, Error> {
    let Some(code) = query.code() else {
        return Ok(Html(LOGIN_PROMPT.to_string()));
    };

    let token = app_state.provider.exchange(&code).await?;
    let id_token = token.id_token()?;
    let claims = app_state.provider.verify(&id_token).await?;

    let payload = LoginPayload::new(&token, &id_token, &claims);
    Ok(Html(app_state.app_link.page(&payload)?))
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Login failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.to_string())).into_response()
    }
}
