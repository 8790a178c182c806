use std::net::SocketAddr;

use clap::Parser;
use logutil::LogFormat;

#[derive(Debug, Parser)]
#[clap(name = "loghours")]
pub struct Arguments {
    /// TCP address to bind to for the slash command endpoint.
    #[arg(short = 'b', long = "bind", env = "LOGHOURS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Base64 encoded json key for the Google service account.
    ///
    /// The spreadsheet must be shared with the service account's email.
    #[arg(long, env = "GOOGLE_CREDENTIALS_B64", hide_env_values = true)]
    pub credentials_b64: String,

    /// Identifier of the spreadsheet to log hours into.
    #[arg(long, env = "GOOGLE_SHEET_ID")]
    pub sheet_id: String,

    /// Log output format, 'human' or 'json'.
    #[arg(long, env = "LOGHOURS_LOG_FORMAT", default_value = "human")]
    pub log_format: LogFormat,

    /// Default log level. Overridden by RUST_LOG.
    #[arg(long, env = "LOGHOURS_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}
