use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::SendResult;
use crate::config::TransportConfig;
use crate::email::{parse_address, AttachmentDescriptor, MailMessage};
use crate::sparkpost::types::{Attachment, Recipient, Transmission};
use crate::sparkpost::{SparkPostClient, TransmissionClient};
use crate::Error;

pub const TRANSPORT_NAME: &str = "SparkPost";

/// Mail transport that delivers `MailMessage`s as SparkPost transmissions.
///
/// The transport is immutable once built; concurrent sends share only the
/// configured defaults.
pub struct SparkPostTransport {
    config: TransportConfig,
    client: Box<dyn TransmissionClient>,
}

impl SparkPostTransport {
    /// Build a transport talking to SparkPost over HTTP.
    ///
    /// The credential is taken from `config` only. Reading it from the
    /// environment is up to the application (see `config::load_config`).
    pub fn new(config: TransportConfig) -> Result<Self, Error> {
        let client = SparkPostClient::new(
            config.api_key.clone(),
            config.endpoint(),
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: TransportConfig, client: impl TransmissionClient + 'static) -> Self {
        Self {
            config,
            client: Box::new(client),
        }
    }

    pub fn name(&self) -> &'static str {
        TRANSPORT_NAME
    }

    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Send `message` as a single transmission.
    ///
    /// Provider errors are returned exactly as the client reported them.
    pub async fn send(&self, message: &MailMessage) -> Result<SendResult, Error> {
        let transmission = self.build_transmission(message);

        log::debug!(
            "Sending transmission to {} recipient(s)",
            transmission.recipients.len()
        );

        let resp = self
            .client
            .send_transmission(&transmission)
            .await
            .map_err(|e| {
                log::error!("SparkPost transmission failed: {}", e);
                e
            })?;

        let result = SendResult::from(resp);

        log::info!(
            "Transmission {} accepted: {}, rejected: {}",
            result.message_id,
            result.accepted,
            result.rejected
        );

        Ok(result)
    }

    /// Build the transmission body for `message` without sending it.
    ///
    /// Message fields take precedence over the configured defaults.
    pub fn build_transmission(&self, message: &MailMessage) -> Transmission {
        Transmission {
            recipients: self.recipients(message),
            content: self.content(message),
            tags: pick(message.tags.as_ref(), self.config.tags.as_ref()),
            campaign_id: pick(message.campaign_id.as_ref(), self.config.campaign_id.as_ref()),
            metadata: pick(message.metadata.as_ref(), self.config.metadata.as_ref()),
            substitution_data: pick(
                message.substitution_data.as_ref(),
                self.config.substitution_data.as_ref(),
            ),
            options: pick(message.options.as_ref(), self.config.options.as_ref()),
        }
    }

    /// Shallow merge of, in increasing precedence: configured content,
    /// fields derived from the message, the message's own `content`.
    fn content(&self, message: &MailMessage) -> Map<String, Value> {
        let mut content = self.config.content.clone().unwrap_or_default();

        let from = message
            .from
            .iter()
            .flat_map(|from| from.as_slice())
            .flat_map(parse_address)
            .next();

        if let Some(from) = from.as_ref().and_then(to_json) {
            content.insert("from".to_string(), from);
        }

        let fields = [
            ("subject", &message.subject),
            ("html", &message.html),
            ("text", &message.text),
        ];

        for (key, value) in fields {
            if let Some(value) = value {
                content.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        if let Some(ref reply_to) = message.reply_to {
            content.insert("reply_to".to_string(), reply_to.clone());
        }

        if let Some(ref attachments) = message.attachments {
            let attachments: Vec<Attachment> = attachments
                .iter()
                .filter_map(AttachmentDescriptor::transform)
                .collect();

            if let Some(attachments) = to_json(&attachments) {
                content.insert("attachments".to_string(), attachments);
            }
        }

        if let Some(ref overrides) = message.content {
            for (key, value) in overrides {
                content.insert(key.clone(), value.clone());
            }
        }

        content
    }

    /// Explicit recipients (message, else configured) followed by the parsed
    /// `to`, `cc` and `bcc` addresses, in that order.
    fn recipients(&self, message: &MailMessage) -> Vec<Recipient> {
        let mut recipients = pick(
            message.recipients.as_ref(),
            self.config.recipients.as_ref(),
        )
        .unwrap_or_default();

        for field in [&message.to, &message.cc, &message.bcc] {
            let parsed = field
                .iter()
                .flat_map(|addresses| addresses.as_slice())
                .flat_map(parse_address)
                .map(Recipient::from);

            recipients.extend(parsed);
        }

        recipients
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value)
        .map_err(|e| log::error!("Failed to serialize transmission content: {}", e))
        .ok()
}

/// Values that count as "not set" when empty.
trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl IsEmpty for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl IsEmpty for Map<String, Value> {
    fn is_empty(&self) -> bool {
        Map::is_empty(self)
    }
}

/// The message value when present and non-empty, else the configured default
fn pick<T: IsEmpty + Clone>(value: Option<&T>, default: Option<&T>) -> Option<T> {
    value.filter(|v| !v.is_empty()).or(default).cloned()
}
