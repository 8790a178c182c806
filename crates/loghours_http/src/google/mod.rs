//! Google service account auth and the Sheets api.

pub mod credentials;
pub mod sheets;
pub mod types;
