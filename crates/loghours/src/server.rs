use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use loghours_core::notify::Notifier;
use loghours_core::sheet::SpreadsheetConnector;
use loghours_core::updater::SheetUpdater;
use loghours_error::{Result, ResultExt};
use loghours_http::callback::ResponseUrlNotifier;
use loghours_http::client::ReqwestHttpClient;
use loghours_http::google::sheets::SheetsConnector;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::handlers::{ServerState, healthz, log_hours};
use crate::tasks::TaskPool;

pub fn router<C, N>(state: Arc<ServerState<C, N>>) -> Router
where
    C: SpreadsheetConnector + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/healthz", get(healthz))
        .route("/loghours", post(log_hours::<C, N>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the slash command endpoint until ctrl-c.
///
/// Updates still running when the listener closes are allowed to finish.
pub async fn serve(config: AppConfig) -> Result<()> {
    let client = ReqwestHttpClient::new(reqwest::Client::new());
    let connector = SheetsConnector::try_new(
        client.clone(),
        config.service_account.clone(),
        config.spreadsheet_id.clone(),
    )?;
    let notifier = ResponseUrlNotifier::new(client);

    let tasks = TaskPool::new(Handle::current());
    let state = Arc::new(ServerState {
        updater: Arc::new(SheetUpdater::new(connector, notifier)),
        tasks: tasks.clone(),
    });

    let listener = TcpListener::bind(config.bind)
        .await
        .context_fn(|| format!("Failed to bind to {}", config.bind))?;
    info!(addr = %config.bind, spreadsheet_id = %config.spreadsheet_id, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(in_flight = tasks.in_flight(), "shutting down");
    tasks.wait_idle().await;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c"),
        Err(e) => tracing::error!(%e, "failed to listen for ctrl-c"),
    }
}
