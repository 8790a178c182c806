pub mod callback;
pub mod client;
pub mod google;

#[cfg(test)]
mod testutil;

// Re-export some types to use with the http client.
pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, Request, StatusCode};
