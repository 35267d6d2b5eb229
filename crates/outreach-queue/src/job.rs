use serde::{Deserialize, Serialize};

/// Task name the delivery workers dispatch on.
pub const SEND_PROMO_MESSAGE: &str = "send_promo_message";

/// One unit of asynchronous work handed to the queue. Wire shape is
/// `{"task": ..., "phone": ...}`; workers route on `task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub task: String,
    pub phone: String,
}

impl Job {
    /// Delivery task: send the promotional message content to one phone.
    pub fn send_promo_message(phone: impl Into<String>) -> Self {
        Self {
            task: SEND_PROMO_MESSAGE.to_string(),
            phone: phone.into(),
        }
    }
}
