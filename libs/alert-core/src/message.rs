use std::fmt;

use crate::classifier::Classification;
use crate::config::NotifyConfig;
use crate::event::ExtractedEvent;
use crate::redaction::{
    format_account_id, mask_access_key, mask_network_address, mask_resource_account_segment,
};

const AUTOMATED_LABEL: &str = "*S3 GetObject from Task*";
const HUMAN_LABEL: &str = "*S3 GetObject detected*";

/// A fully rendered Slack message, one mrkdwn line per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    lines: Vec<String>,
}

impl Alert {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn prefix(classification: &Classification, config: &NotifyConfig) -> String {
    if classification.is_automated() {
        format!("{} {}", config.robot_icon, AUTOMATED_LABEL)
    } else {
        format!("{} {}", config.human_icon, HUMAN_LABEL)
    }
}

/// Masks the sensitive fields of `event` and lays them out in a fixed order.
/// Bucket and key lines are left out when those values are missing.
pub fn format_alert(
    event: &ExtractedEvent,
    classification: &Classification,
    config: &NotifyConfig,
) -> Alert {
    let policy = &config.redaction;

    let ip = mask_network_address(event.source_ip.as_deref(), policy);
    let arn = mask_resource_account_segment(event.identity_arn.as_deref(), policy);
    let access_key = mask_access_key(event.access_key_id.as_deref(), policy);
    let account = format_account_id(&event.account_id, policy);

    let mut lines = vec![
        prefix(classification, config),
        format!("- *Time:* {}", event.event_time),
    ];
    if let Some(bucket) = event.bucket.as_deref().filter(|b| !b.is_empty()) {
        lines.push(format!("- *Bucket:* `{}`", bucket));
    }
    if let Some(key) = event.key.as_deref().filter(|k| !k.is_empty()) {
        lines.push(format!("- *Key:* `{}`", key));
    }

    let mut summary = format!("- *Event:* `{}` via `{}`", event.event_name, event.event_source);
    if !account.is_empty() {
        summary.push_str(&format!(" (Account `{}`)", account));
    }

    lines.extend([
        format!("- *IP:* `{}`", ip),
        format!("- *UserAgent:* `{}`", event.user_agent),
        format!("- *UserIdentity.type:* `{}`", event.identity_type),
        format!("- *UserIdentity.arn:* `{}`", arn),
        format!("- *AccessKeyId:* `{}`", access_key),
        summary,
    ]);

    Alert { lines }
}
