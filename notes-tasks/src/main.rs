mod config;

mod app;
mod auth;
mod ctx;
mod db;
mod errors;
mod notes;
mod openapi;
mod shared;
mod state;
mod summarize;
mod tasks;
mod users;

use std::net::SocketAddr;

use app::AppParams;
use auth::SessionKeys;
pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use shared::tracing::{add_tracing_layer, setup_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    setup_tracing(config.log_json);

    if config.uses_dev_secret() {
        tracing::warn!("SESSION_SECRET is not set, sessions are signed with the development secret");
    }

    let conn = init_db().await?;

    let (app, _) = app::create(AppParams {
        db: conn,
        summarizer: summarize::from_config(config)?,
        session_keys: SessionKeys::from_config(config),
        router: app::routes,
    })
    .await?;

    let app = add_tracing_layer(app);

    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port))
        .await
        .map_err(|e| Error::App(e.into()))?;

    tracing::info!("listening on http://{}", listener.local_addr().map_err(|e| Error::App(e.into()))?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| Error::App(e.into()))?;

    Ok(())
}
