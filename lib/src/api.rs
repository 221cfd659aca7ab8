//! Contains the result type handed back to callers of the transport.
use serde::{Deserialize, Serialize};

use crate::sparkpost::types::TransmissionResponse;

/// Normalized outcome of a successful send.
///
/// Serializes as `{"messageId": ..., "accepted": ..., "rejected": ...}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub message_id: String,
    pub accepted: u64,
    pub rejected: u64,
}

impl From<TransmissionResponse> for SendResult {
    fn from(resp: TransmissionResponse) -> Self {
        Self {
            message_id: resp.results.id,
            accepted: resp.results.total_accepted_recipients,
            rejected: resp.results.total_rejected_recipients,
        }
    }
}
