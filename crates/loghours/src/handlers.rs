use std::sync::Arc;

use axum::extract::State;
use axum::{Form, Json};
use loghours_core::message::{ACK_TEXT, SlashResponse, USAGE_TEXT};
use loghours_core::notify::Notifier;
use loghours_core::request::LogRequest;
use loghours_core::sheet::SpreadsheetConnector;
use loghours_core::updater::SheetUpdater;
use serde::Deserialize;
use tracing::{debug, info};

use crate::tasks::TaskPool;

/// State that's passed to all handlers.
#[derive(Debug)]
pub struct ServerState<C, N> {
    pub updater: Arc<SheetUpdater<C, N>>,
    /// Pool running updates after the command has been acknowledged.
    pub tasks: TaskPool,
}

/// Fields of a slash command we care about. Everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SlashCommandForm {
    pub text: String,
    pub response_url: String,
}

pub async fn healthz() -> &'static str {
    "OK"
}

pub async fn log_hours<C, N>(
    State(state): State<Arc<ServerState<C, N>>>,
    Form(form): Form<SlashCommandForm>,
) -> Json<SlashResponse>
where
    C: SpreadsheetConnector + 'static,
    N: Notifier + 'static,
{
    let request = match LogRequest::parse(&form.text) {
        Ok(request) => request,
        Err(e) => {
            debug!(text = %form.text, %e, "rejecting malformed command");
            return Json(SlashResponse::ephemeral(USAGE_TEXT));
        }
    };

    info!(name = %request.name, month = %request.month, "accepted log hours command");

    let updater = state.updater.clone();
    let response_url = form.response_url;
    state.tasks.submit(async move {
        // Outcome has been reported through the response url.
        let _ = updater.process(&request, &response_url).await;
    });

    Json(SlashResponse::in_channel(ACK_TEXT))
}
