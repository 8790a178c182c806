use loghours_core::message::SlashResponse;
use loghours_core::notify::Notifier;
use loghours_error::{Result, ResultExt};
use reqwest::{Method, Request};
use tracing::debug;
use url::Url;

use crate::client::{HttpClient, ensure_success, set_json_body};

/// Posts messages to the response url handed out with a slash command.
#[derive(Debug, Clone)]
pub struct ResponseUrlNotifier<C: HttpClient> {
    client: C,
}

impl<C> ResponseUrlNotifier<C>
where
    C: HttpClient,
{
    pub fn new(client: C) -> Self {
        ResponseUrlNotifier { client }
    }
}

impl<C> Notifier for ResponseUrlNotifier<C>
where
    C: HttpClient,
{
    async fn notify(&self, response_url: &str, message: &SlashResponse) -> Result<()> {
        let url = Url::parse(response_url).context("Failed to parse response url")?;
        debug!(%url, response_type = ?message.response_type, "posting to response url");

        let mut request = Request::new(Method::POST, url);
        set_json_body(&mut request, message)?;

        ensure_success(self.client.do_request(request).await?).await?;

        Ok(())
    }
}
