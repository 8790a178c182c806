use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use loghours_error::{LogError, Result};
use loghours_http::google::credentials::ServiceAccount;

use crate::args::Arguments;

/// Configuration loaded once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub spreadsheet_id: String,
    pub service_account: Arc<ServiceAccount>,
}

impl AppConfig {
    pub fn try_from_args(args: &Arguments) -> Result<Self> {
        let spreadsheet_id = args.sheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(LogError::new("Spreadsheet id must not be empty"));
        }

        let service_account = ServiceAccount::try_from_base64(&args.credentials_b64)
            .map_err(|e| LogError::with_source("Failed to load service account credentials", Box::new(e)))?;

        Ok(AppConfig {
            bind: args.bind,
            spreadsheet_id: spreadsheet_id.to_string(),
            service_account: Arc::new(service_account),
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("client_email", &self.service_account.client_email)
            .finish()
    }
}
