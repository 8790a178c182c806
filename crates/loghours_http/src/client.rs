use std::fmt::Debug;

use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt, TryStreamExt};
use loghours_error::{ErrorKind, LogError, Result, ResultExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Request, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub trait HttpClient: Sync + Send + Debug + Clone + 'static {
    type Response: HttpResponse;
    type RequestFuture: Future<Output = Result<Self::Response>> + Send + Unpin;

    /// Do the request.
    fn do_request(&self, request: Request) -> Self::RequestFuture;
}

pub trait HttpResponse: Send {
    type BytesStream: Stream<Item = Result<Bytes>> + Send + Unpin;

    fn status(&self) -> StatusCode;
    fn headers(&self) -> &HeaderMap;

    /// Convert the response body into a byte stream.
    fn into_bytes_stream(self) -> Self::BytesStream;
}

/// Http client backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestHttpClient { client }
    }
}

impl HttpClient for ReqwestHttpClient {
    type Response = ReqwestHttpResponse;
    type RequestFuture = BoxFuture<'static, Result<Self::Response>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        self.client
            .execute(request)
            .map(|result| match result {
                Ok(resp) => Ok(ReqwestHttpResponse(resp)),
                Err(e) => Err(LogError::with_source("Failed to make request", Box::new(e))),
            })
            .boxed()
    }
}

#[derive(Debug)]
pub struct ReqwestHttpResponse(reqwest::Response);

impl HttpResponse for ReqwestHttpResponse {
    type BytesStream = BoxStream<'static, Result<Bytes>>;

    fn status(&self) -> StatusCode {
        self.0.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.0.headers()
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        self.0
            .bytes_stream()
            .map_err(|e| LogError::with_source("Failed to stream body", Box::new(e)))
            .boxed()
    }
}

/// Helper to set a json body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_json_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_vec(body).context("Failed to serialize request body to json")?;
    *request.body_mut() = Some(body.into());
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(())
}

/// Helper to set a form body on this request.
///
/// Overwrites the existing body and 'Content-Type' of the request.
pub fn set_form_body<T>(request: &mut Request, body: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let body = serde_urlencoded::to_string(body)
        .context("Failed to serialize request body to url encoded form")?;
    *request.body_mut() = Some(body.into());
    request.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );

    Ok(())
}

/// Set the 'Authorization' header to a bearer token.
pub fn set_bearer_auth(request: &mut Request, token: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .context("Access token is not a valid header value")?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);

    Ok(())
}

/// Collect the full body from a byte stream.
pub async fn read_body<S>(mut stream: S) -> Result<Vec<u8>>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let mut bytes = Vec::new();
    while let Some(resp) = stream.try_next().await? {
        bytes.extend_from_slice(resp.as_ref());
    }
    Ok(bytes)
}

/// Helper to read a json response from a byte stream.
///
/// This will collect the full response before trying to deserialize it.
pub async fn read_json_response<T, S>(stream: S) -> Result<T>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
{
    let bytes = read_body(stream).await?;
    serde_json::from_slice(&bytes).context("Failed to deserialize response body as json")
}

/// Return the response if it has a success status, otherwise an error
/// containing the status and body.
pub async fn ensure_success<R>(resp: R) -> Result<R>
where
    R: HttpResponse,
{
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = read_body(resp.into_bytes_stream()).await.unwrap_or_default();
    let body = String::from_utf8_lossy(&body);

    Err(status_error(status, body.trim()))
}

fn status_error(status: StatusCode, body: &str) -> LogError {
    let kind = if status.is_client_error() || status.is_server_error() {
        ErrorKind::Provider
    } else {
        ErrorKind::Unclassified
    };
    let mut err = LogError::new(format!("Request failed with status {status}")).with_kind(kind);
    if !body.is_empty() {
        err = err.with_field("body", body);
    }
    err
}
