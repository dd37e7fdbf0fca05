//! Reqwest-backed Expo push sender.
//!
//! This adapter owns transport details only: batching, request
//! serialisation, timeout and HTTP error mapping, and ticket decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use super::dto::{ExpoMessageDto, ExpoResponseDto};
use crate::domain::ports::{PushSendError, PushSender};
use crate::domain::{PushMessage, PushOutcome, PushReceipt};

/// Public Expo push endpoint.
pub const DEFAULT_EXPO_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// Expo accepts at most this many messages per request.
const EXPO_BATCH_LIMIT: usize = 100;
const USER_AGENT: &str = "homecafe-backend/0.1";

/// Push sender posting message batches to one Expo endpoint.
pub struct ExpoPushSender {
    client: Client,
    endpoint: Url,
}

impl ExpoPushSender {
    /// Build a sender whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    async fn send_batch(&self, batch: &[PushMessage]) -> Result<Vec<PushReceipt>, PushSendError> {
        let payload: Vec<ExpoMessageDto<'_>> = batch.iter().map(ExpoMessageDto::from).collect();
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_receipts(batch, body.as_ref())
    }
}

#[async_trait]
impl PushSender for ExpoPushSender {
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushReceipt>, PushSendError> {
        let mut receipts = Vec::with_capacity(messages.len());
        let mut delivered_batches = 0_usize;
        let mut last_error = None;
        for batch in messages.chunks(EXPO_BATCH_LIMIT) {
            debug!(count = batch.len(), "sending push batch");
            match absorb_batch(&mut receipts, batch, self.send_batch(batch).await) {
                Some(error) => last_error = Some(error),
                None => delivered_batches += 1,
            }
        }
        match last_error {
            Some(error) if delivered_batches == 0 => Err(error),
            _ => Ok(receipts),
        }
    }
}

/// Fold one batch result into `receipts`. A failed batch is logged and its
/// messages are reported as failed, so receipts from other batches survive.
fn absorb_batch(
    receipts: &mut Vec<PushReceipt>,
    batch: &[PushMessage],
    result: Result<Vec<PushReceipt>, PushSendError>,
) -> Option<PushSendError> {
    match result {
        Ok(batch_receipts) => {
            receipts.extend(batch_receipts);
            None
        }
        Err(error) => {
            warn!(count = batch.len(), %error, "push batch failed");
            let reason = error.to_string();
            receipts.extend(batch.iter().map(|message| PushReceipt {
                token: message.to.clone(),
                outcome: PushOutcome::Failed(reason.clone()),
            }));
            Some(error)
        }
    }
}

/// Pair each ticket with the message at the same position.
fn parse_receipts(batch: &[PushMessage], body: &[u8]) -> Result<Vec<PushReceipt>, PushSendError> {
    let decoded: ExpoResponseDto = serde_json::from_slice(body)
        .map_err(|error| PushSendError::response(format!("invalid Expo JSON payload: {error}")))?;
    if decoded.data.len() != batch.len() {
        return Err(PushSendError::response(format!(
            "expected {} tickets, got {}",
            batch.len(),
            decoded.data.len()
        )));
    }
    Ok(batch
        .iter()
        .zip(decoded.data)
        .map(|(message, ticket)| PushReceipt {
            token: message.to.clone(),
            outcome: ticket.into_outcome(),
        })
        .collect())
}

fn map_transport_error(error: reqwest::Error) -> PushSendError {
    PushSendError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> PushSendError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        PushSendError::transport(message)
    } else {
        PushSendError::response(message)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network parts of the Expo adapter.

    use super::*;
    use crate::domain::PushToken;
    use rstest::rstest;
    use serde_json::json;

    fn message(token: &str) -> PushMessage {
        PushMessage {
            to: PushToken::new(token).expect("valid token"),
            title: "New reaction".to_owned(),
            body: "Ada reacted ☕ to your post".to_owned(),
            data: json!({ "postId": "p1" }),
        }
    }

    #[test]
    fn messages_serialise_with_default_sound() {
        let msg = message("ExponentPushToken[aaa]");
        let encoded = serde_json::to_value(ExpoMessageDto::from(&msg)).expect("encode");
        assert_eq!(
            encoded,
            json!({
                "to": "ExponentPushToken[aaa]",
                "title": "New reaction",
                "body": "Ada reacted ☕ to your post",
                "data": { "postId": "p1" },
                "sound": "default"
            })
        );
    }

    #[test]
    fn tickets_map_to_outcomes_in_order() {
        let batch = vec![
            message("ExponentPushToken[aaa]"),
            message("ExponentPushToken[bbb]"),
            message("ExponentPushToken[ccc]"),
        ];
        let body = json!({
            "data": [
                { "status": "ok", "id": "ticket-1" },
                {
                    "status": "error",
                    "message": "not a registered device",
                    "details": { "error": "DeviceNotRegistered" }
                },
                {
                    "status": "error",
                    "message": "Message too big",
                    "details": { "error": "MessageTooBig" }
                }
            ]
        })
        .to_string();

        let receipts = parse_receipts(&batch, body.as_bytes()).expect("tickets decode");
        let outcomes: Vec<_> = receipts.iter().map(|r| r.outcome.clone()).collect();
        assert_eq!(
            outcomes,
            vec![
                PushOutcome::Accepted,
                PushOutcome::DeviceNotRegistered,
                PushOutcome::Failed("Message too big".to_owned()),
            ]
        );
        assert_eq!(receipts[1].token.as_str(), "ExponentPushToken[bbb]");
    }

    #[test]
    fn ticket_count_mismatch_is_a_response_error() {
        let batch = vec![message("ExponentPushToken[aaa]")];
        let error = parse_receipts(&batch, br#"{"data":[]}"#).expect_err("mismatch");
        assert!(matches!(error, PushSendError::Response { .. }));
    }

    #[test]
    fn failed_batch_keeps_receipts_from_earlier_batches() {
        let first = vec![message("ExponentPushToken[aaa]")];
        let second = vec![message("ExponentPushToken[bbb]")];
        let mut receipts = Vec::new();

        let ok = absorb_batch(
            &mut receipts,
            &first,
            Ok(vec![PushReceipt {
                token: first[0].to.clone(),
                outcome: PushOutcome::DeviceNotRegistered,
            }]),
        );
        let failed = absorb_batch(
            &mut receipts,
            &second,
            Err(PushSendError::transport("connection reset")),
        );

        assert!(ok.is_none());
        assert!(matches!(failed, Some(PushSendError::Transport { .. })));
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].outcome, PushOutcome::DeviceNotRegistered);
        assert_eq!(receipts[1].token.as_str(), "ExponentPushToken[bbb]");
        assert!(matches!(receipts[1].outcome, PushOutcome::Failed(_)));
    }

    #[rstest]
    #[case::server_error(StatusCode::BAD_GATEWAY, true)]
    #[case::rate_limited(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    fn statuses_map_to_transport_or_response(#[case] status: StatusCode, #[case] transport: bool) {
        let error = map_status_error(status, b"{\"errors\":[{\"code\":\"X\"}]}");
        assert_eq!(matches!(error, PushSendError::Transport { .. }), transport);
    }

    #[test]
    fn default_endpoint_parses() {
        assert!(Url::parse(DEFAULT_EXPO_ENDPOINT).is_ok());
    }
}
