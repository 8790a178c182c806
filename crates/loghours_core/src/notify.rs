use std::fmt::Debug;

use loghours_error::Result;

use crate::message::SlashResponse;

/// Delivers the deferred outcome of a command.
pub trait Notifier: Sync + Send + Debug {
    fn notify(
        &self,
        response_url: &str,
        message: &SlashResponse,
    ) -> impl Future<Output = Result<()>> + Send;
}
