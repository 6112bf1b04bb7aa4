//! Chat webhook notification for finished rounds.

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::models::StoredRound, dto::format_epoch_ms};

const MESSAGE_TITLE: &str = "🎤 Whitney Houston Challenge Score!";

/// Failures while delivering a notification. Callers log them and move on.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent.
    #[error("failed to post to webhook")]
    Send {
        #[source]
        source: reqwest::Error,
    },
    /// The webhook answered with a non-success status.
    #[error("webhook answered with status {status}")]
    Status { status: StatusCode },
}

/// One-shot delivery of a round summary to a webhook.
pub trait Notifier: Send + Sync {
    /// Post `round` to `webhook_url`.
    fn notify(
        &self,
        webhook_url: String,
        round: StoredRound,
    ) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// [`Notifier`] posting Slack-formatted messages.
#[derive(Debug, Clone, Default)]
pub struct SlackNotifier {
    client: Client,
}

impl SlackNotifier {
    /// Create a notifier with its own HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for SlackNotifier {
    fn notify(
        &self,
        webhook_url: String,
        round: StoredRound,
    ) -> BoxFuture<'static, Result<(), NotifyError>> {
        let client = self.client.clone();
        Box::pin(async move {
            let response = client
                .post(&webhook_url)
                .json(&SlackMessage::for_round(&round))
                .send()
                .await
                .map_err(|source| NotifyError::Send { source })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(NotifyError::Status {
                    status: response.status(),
                })
            }
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct SlackMessage {
    text: String,
    blocks: Vec<SlackBlock>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackBlock {
    Section { text: Markdown },
    Context { elements: Vec<Markdown> },
}

#[derive(Debug, Serialize, PartialEq)]
struct Markdown {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl Markdown {
    fn new(text: String) -> Self {
        Self {
            kind: "mrkdwn",
            text,
        }
    }
}

impl SlackMessage {
    fn for_round(round: &StoredRound) -> Self {
        let summary = format!(
            "*🎤 Whitney Houston Challenge*\n*Team:* {}\n*Score:* {} points\n*Accuracy:* {}",
            round.team_name,
            round.score,
            accuracy_label(round.ms_off)
        );
        let played_at = format!("Played at {}", format_epoch_ms(round.game_played_at));

        Self {
            text: MESSAGE_TITLE.to_string(),
            blocks: vec![
                SlackBlock::Section {
                    text: Markdown::new(summary),
                },
                SlackBlock::Context {
                    elements: vec![Markdown::new(played_at)],
                },
            ],
        }
    }
}

/// Human-readable accuracy for the summary.
pub fn accuracy_label(ms_off: f64) -> String {
    if ms_off.is_finite() {
        format!("{}ms off", ms_off.round() as i64)
    } else {
        "timed out".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accuracy_is_rounded_to_the_millisecond() {
        assert_eq!(accuracy_label(199.6), "200ms off");
        assert_eq!(accuracy_label(0.0), "0ms off");
        assert_eq!(accuracy_label(f64::INFINITY), "timed out");
    }

    #[test]
    fn message_carries_team_score_and_accuracy() {
        let round = StoredRound::new("Divas".into(), 10, 200.2, 0);
        let value = serde_json::to_value(SlackMessage::for_round(&round)).unwrap();

        assert_eq!(value["text"], json!(MESSAGE_TITLE));
        assert_eq!(value["blocks"][0]["type"], json!("section"));
        assert_eq!(value["blocks"][0]["text"]["type"], json!("mrkdwn"));
        assert_eq!(
            value["blocks"][0]["text"]["text"],
            json!(
                "*🎤 Whitney Houston Challenge*\n*Team:* Divas\n*Score:* 10 points\n*Accuracy:* 200ms off"
            )
        );
        assert_eq!(value["blocks"][1]["type"], json!("context"));
        assert_eq!(
            value["blocks"][1]["elements"][0]["text"],
            json!("Played at 1970-01-01T00:00:00Z")
        );
    }
}
