//! Wire types for the Expo push API.
//!
//! Messages are encoded from borrowed domain data; tickets are decoded into
//! these DTOs first and then mapped onto [`PushOutcome`] values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{PushMessage, PushOutcome};

const DEVICE_NOT_REGISTERED: &str = "DeviceNotRegistered";

#[derive(Debug, Serialize)]
pub(super) struct ExpoMessageDto<'a> {
    pub(super) to: &'a str,
    pub(super) title: &'a str,
    pub(super) body: &'a str,
    pub(super) data: &'a Value,
    pub(super) sound: &'static str,
}

impl<'a> From<&'a PushMessage> for ExpoMessageDto<'a> {
    fn from(message: &'a PushMessage) -> Self {
        Self {
            to: message.to.as_str(),
            title: message.title.as_str(),
            body: message.body.as_str(),
            data: &message.data,
            sound: "default",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ExpoResponseDto {
    #[serde(default)]
    pub(super) data: Vec<ExpoTicketDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExpoTicketDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) details: Option<ExpoTicketDetailsDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ExpoTicketDetailsDto {
    #[serde(default)]
    pub(super) error: Option<String>,
}

impl ExpoTicketDto {
    pub(super) fn into_outcome(self) -> PushOutcome {
        if self.status == "ok" {
            return PushOutcome::Accepted;
        }
        let error = self.details.and_then(|details| details.error);
        match error.as_deref() {
            Some(DEVICE_NOT_REGISTERED) => PushOutcome::DeviceNotRegistered,
            _ => PushOutcome::Failed(
                self.message
                    .or(error)
                    .unwrap_or_else(|| format!("ticket status {}", self.status)),
            ),
        }
    }
}
