//! Request and response bodies of the SparkPost transmissions API.
//!
//! See: https://developers.sparkpost.com/api/transmissions/
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical address shape used by SparkPost for `from` and recipients.
///
/// `email` may be missing when a caller supplies a structured address
/// without one; it is passed through as-is and left to the provider to reject.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EmailAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: Some(email.into()),
            name,
        }
    }
}

/// A single transmission recipient.
///
/// Any other recipient attributes SparkPost accepts (`tags`, `metadata`,
/// `substitution_data`, ...) are kept in `extra` and sent unchanged.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Recipient {
    pub address: EmailAddress,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Recipient {
    pub fn new(address: EmailAddress) -> Self {
        Self {
            address,
            extra: Map::new(),
        }
    }
}

impl From<EmailAddress> for Recipient {
    fn from(address: EmailAddress) -> Self {
        Self::new(address)
    }
}

/// Inline attachment as expected in `content.attachments`
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Attachment {
    /// MIME type of attachment (e.g., text/plain)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Base64 encoded payload
    pub data: String,
}

/// Body of `POST /api/v1/transmissions`.
///
/// `content` is kept as a JSON object so that caller supplied content
/// overrides (templates, headers, AMP bodies, ...) can be merged key by key.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Transmission {
    pub recipients: Vec<Recipient>,
    pub content: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

/// Successful response:
/// `{ "results": { "total_rejected_recipients": 0, "total_accepted_recipients": 1, "id": "66123596945797072" } }`
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransmissionResponse {
    pub results: TransmissionResults,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TransmissionResults {
    pub id: String,
    pub total_accepted_recipients: u64,
    pub total_rejected_recipients: u64,
}

/// Error response: `{ "errors": [ { "message": ..., "description": ..., "code": ... } ] }`
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ProviderError>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ProviderError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
