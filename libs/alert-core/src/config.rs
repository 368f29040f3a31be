use std::env;

use crate::redaction::RedactionPolicy;

pub const DEFAULT_HUMAN_ICON: &str = ":inbox_tray:";
pub const DEFAULT_ROBOT_ICON: &str = ":robot_face:";

/// Immutable snapshot of the notifier settings.
///
/// Built once at process start and handed by reference to every
/// formatting call. Nothing in this crate reads the environment after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub redaction: RedactionPolicy,
    pub human_icon: String,
    pub robot_icon: String,
    pub treat_cli_as_human: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            redaction: RedactionPolicy::default(),
            human_icon: DEFAULT_HUMAN_ICON.to_string(),
            robot_icon: DEFAULT_ROBOT_ICON.to_string(),
            treat_cli_as_human: false,
        }
    }
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves every setting through `lookup`, falling back to the defaults
    /// for anything it does not return.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str, default: bool| {
            lookup(name)
                .map(|value| value.to_lowercase() == "true")
                .unwrap_or(default)
        };

        let config = NotifyConfig {
            redaction: RedactionPolicy {
                mask_ip: flag("MASK_IP", true),
                mask_access_key: flag("MASK_ACCESS_KEY", true),
                mask_account_id: flag("MASK_ACCOUNT_ID", true),
            },
            human_icon: lookup("EMOJI_HUMAN").unwrap_or_else(|| DEFAULT_HUMAN_ICON.to_string()),
            robot_icon: lookup("EMOJI_ROBOT").unwrap_or_else(|| DEFAULT_ROBOT_ICON.to_string()),
            treat_cli_as_human: flag("TREAT_CLI_AS_HUMAN", false),
        };

        tracing::debug!("Resolved notifier config: {:?}", config);
        config
    }
}
