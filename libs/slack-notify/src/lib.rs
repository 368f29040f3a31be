//! Delivery side of the notifier: resolves the Slack incoming-webhook URL
//! and posts the rendered alert to it.

mod error;
mod webhook;

use async_trait::async_trait;

pub use error::{NotifyError, NotifyResult};
pub use webhook::{SlackWebhookNotifier, WebhookEndpoint, parse_webhook_secret};

/// Something that can put an alert in front of a human.
///
/// Implementations deliver exactly once per call and report failure to the
/// caller; retrying is not their job.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, text: &str) -> NotifyResult<()>;
}
