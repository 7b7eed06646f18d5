// Set .env file (or export the variables)
// ```.env
// CLIENT_ID="your_client_id"
// CLIENT_SECRET="your_client_secret"
// REDIRECT_URL="http://localhost:1805/"
// PROTOCOL="your_app_scheme"
// ```
// then ```cargo run``` and open http://localhost:1805/
use std::{
    net::{Ipv4Addr, SocketAddrV4},
    sync::Arc,
};

use anyhow::Context;
use tiny_oidc_login::{
    app_link::AppLink,
    provider::OidcProvider,
    server::{AppState, router},
    settings::Settings,
    state::FIXED_STATE,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log settings
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env().context("Failed to read settings")?;

    // Discovery failure is fatal
    let provider = OidcProvider::discover(&settings)
        .await
        .context("Failed to create provider")?;
    warn!(
        "Authorization requests use the fixed state {:?}; it is not verified on callback",
        FIXED_STATE
    );

    let app_state = AppState::new(Arc::new(provider), AppLink::new(&settings.protocol));
    let app = router(app_state);

    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, settings.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind tcp listener")?;
    info!("Listening on {:?}", addr);

    axum::serve(listener, app).await?;
    anyhow::Ok(())
}
