//! Expo push outbound adapter.
//!
//! Provides a reqwest implementation of the `PushSender` port.

mod dto;
mod expo_sender;

pub use expo_sender::{DEFAULT_EXPO_ENDPOINT, ExpoPushSender};
