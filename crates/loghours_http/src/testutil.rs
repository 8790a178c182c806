//! Http client returning canned responses.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::{Ready, ready};
use futures::stream::{Iter, iter};
use loghours_error::{LogError, Result};
use parking_lot::Mutex;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Method, Request, StatusCode};
use url::Url;

use crate::client::{HttpClient, HttpResponse};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub authorization: Option<String>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<(StatusCode, String)>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    pub fn push_response(&self, status: StatusCode, body: &str) {
        self.state
            .lock()
            .responses
            .push_back((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

impl HttpClient for MockHttpClient {
    type Response = MockHttpResponse;
    type RequestFuture = Ready<Result<MockHttpResponse>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            authorization: request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body: request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| b.to_vec()),
        });

        ready(match state.responses.pop_front() {
            Some((status, body)) => Ok(MockHttpResponse {
                status,
                headers: HeaderMap::new(),
                body: Bytes::from(body),
            }),
            None => Err(LogError::new("No mock response queued")),
        })
    }
}

#[derive(Debug)]
pub struct MockHttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse for MockHttpResponse {
    type BytesStream = Iter<std::vec::IntoIter<Result<Bytes>>>;

    fn status(&self) -> StatusCode {
        self.status
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        iter(vec![Ok(self.body)])
    }
}
