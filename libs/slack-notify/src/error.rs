use thiserror::Error;

/// Why an alert could not be delivered. Every variant reads as a delivery
/// failure; the detail is only there for the logs.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: webhook secret unavailable: {0}")]
    SecretUnavailable(String),

    #[error("notification delivery failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification delivery failed: webhook returned {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

pub type NotifyResult<T> = Result<T, NotifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_delivery_failure() {
        let errors = [
            NotifyError::SecretUnavailable("AccessDeniedException".to_string()),
            NotifyError::Rejected {
                status: reqwest::StatusCode::NOT_FOUND,
                body: "no_team".to_string(),
            },
        ];
        for err in &errors {
            assert!(err.to_string().starts_with("notification delivery failed"));
        }
    }
}
