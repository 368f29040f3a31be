mod handler;

use std::env;
use std::fs;
use std::process;
use std::time::Duration;

use aws_sdk_sqs::Client;
use serde_json::Value;
use tracing_subscriber::filter;

use alert_core::NotifyConfig;
use slack_notify::{Notifier, SlackWebhookNotifier, WebhookEndpoint};

use handler::handle_event;

const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 5;

struct QueuedEvent {
    pub body: Value,
    pub receipt_handle: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_max_level(filter::LevelFilter::INFO)
        .init();

    // read once, never touched again for the life of the process
    let config = NotifyConfig::from_env();

    let notifier = match build_notifier().await {
        Ok(notifier) => notifier,
        Err(err) => {
            tracing::error!("{}", err);
            process::exit(1);
        }
    };

    // a path argument means a single invocation with the event taken from that file
    if let Some(event_path) = env::args().nth(1) {
        let code = run_once(&event_path, &config, &notifier).await;
        process::exit(code);
    }

    let queue_url = match env::var("EVENT_QUEUE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("EVENT_QUEUE_URL not set");
            process::exit(1);
        }
    };

    let poll_interval = env::var("POLL_INTERVAL_SECONDS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECONDS);

    let client = aws_sdk_sqs::Client::new(&aws_config::load_from_env().await);

    tracing::info!("Listening for GetObject events on {}", queue_url);

    loop {
        let queued_event_opt = receive_event(&client, &queue_url)
            .await
            .unwrap_or_else(|err| {
                tracing::error!("Error receiving event notification: {}", err);
                None
            });

        if let Some(queued_event) = queued_event_opt {
            match handle_event(&queued_event.body, &config, &notifier).await {
                Ok(_) => tracing::info!("Event handled"),
                Err(err) => tracing::error!("{}", err),
            }

            // deleted whether or not delivery worked, a failed alert is not retried
            delete_message(&client, &queue_url, &queued_event.receipt_handle)
                .await
                .unwrap_or_else(|err| {
                    tracing::error!("Error deleting message: {}", err);
                });
        }

        tokio::time::sleep(Duration::from_secs(poll_interval)).await;
    }
}

async fn build_notifier() -> Result<SlackWebhookNotifier, String> {
    let notifier = if let Ok(url) = env::var("SLACK_WEBHOOK_URL") {
        tracing::info!("Using fixed Slack webhook URL");
        SlackWebhookNotifier::new(WebhookEndpoint::Url(url))
    } else if let Ok(secret_name) = env::var("SLACK_SECRET_NAME") {
        tracing::info!("Using Slack webhook from secret {}", secret_name);
        SlackWebhookNotifier::from_secret(&secret_name).await
    } else {
        return Err("Neither SLACK_WEBHOOK_URL nor SLACK_SECRET_NAME is set".to_string());
    };

    notifier.map_err(|err| format!("Failed to create Slack notifier: {}", err))
}

async fn run_once(event_path: &str, config: &NotifyConfig, notifier: &dyn Notifier) -> i32 {
    let raw = match fs::read_to_string(event_path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!("Failed to read event file {}: {}", event_path, err);
            return 1;
        }
    };

    let event: Value = match serde_json::from_str(&raw) {
        Ok(event) => event,
        Err(err) => {
            tracing::error!("Failed to parse event file as JSON: {}", err);
            return 1;
        }
    };

    match handle_event(&event, config, notifier).await {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(json) => {
                println!("{}", json);
                0
            }
            Err(err) => {
                tracing::error!("Failed to serialize handler response: {}", err);
                1
            }
        },
        Err(err) => {
            tracing::error!("{}", err);
            1
        }
    }
}

/// Parses an SQS message body as an EventBridge event. `Err` carries the
/// reason the message should be dropped instead of handled.
fn parse_message_body(body: Option<&str>) -> Result<Value, String> {
    let body = body.ok_or_else(|| "message has no body".to_string())?;
    serde_json::from_str(body).map_err(|err| format!("body is not valid JSON: {}", err))
}

async fn receive_event(
    client: &Client,
    queue_url: &str,
) -> Result<Option<QueuedEvent>, aws_sdk_sqs::Error> {
    let rcv_message_output = client
        .receive_message()
        .queue_url(queue_url)
        .max_number_of_messages(1)
        .send()
        .await?;

    for message in rcv_message_output.messages.unwrap_or_default() {
        let receipt_handle = message.receipt_handle.unwrap_or_default();

        match parse_message_body(message.body.as_deref()) {
            Ok(event) => {
                return Ok(Some(QueuedEvent {
                    body: event,
                    receipt_handle,
                }));
            }
            Err(reason) => {
                // never redelivered, a broken message is not retried either
                tracing::error!("Dropping unusable message: {}", reason);
                if !receipt_handle.is_empty() {
                    delete_message(client, queue_url, &receipt_handle).await?;
                }
            }
        }
    }

    Ok(None)
}

async fn delete_message(
    client: &Client,
    queue_url: &str,
    receipt_handle: &str,
) -> Result<(), aws_sdk_sqs::Error> {
    client
        .delete_message()
        .queue_url(queue_url)
        .receipt_handle(receipt_handle)
        .send()
        .await?;

    tracing::info!("Message deleted successfully");
    Ok(())
}
