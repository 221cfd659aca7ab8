//! Provider agnostic mail message and the helpers that turn its loosely typed
//! pieces (address strings, attachment descriptors) into SparkPost shapes.
use mailparse::{MailAddr, SingleInfo};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sparkpost::types::{Attachment, EmailAddress, Recipient};

/// The only attachment encoding that can be sent inline
pub const BASE64_ENCODING: &str = "base64";

/// An address as supplied by the caller.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AddressInput {
    /// Header style value, possibly a list: `a@x.com, B <b@x.com>`
    Raw(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl From<&str> for AddressInput {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<String> for AddressInput {
    fn from(raw: String) -> Self {
        Self::Raw(raw)
    }
}

/// A field that may hold a single value or a list of them.
// `Many` must come first: a struct can also deserialize from a JSON array.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Many(values) => values,
            Self::One(value) => std::slice::from_ref(value),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl AttachmentDescriptor {
    pub fn base64(
        content_type: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content_type: Some(content_type.into()),
            filename: Some(filename.into()),
            encoding: Some(BASE64_ENCODING.to_string()),
            content: Some(content.into()),
        }
    }

    /// Convert into a SparkPost inline attachment.
    ///
    /// Returns `None` for anything that is not non-empty base64 content;
    /// such attachments are dropped from the transmission.
    pub fn transform(&self) -> Option<Attachment> {
        if self.encoding.as_deref() != Some(BASE64_ENCODING) {
            log::debug!(
                "Dropping attachment {:?} with encoding {:?}",
                self.filename,
                self.encoding
            );
            return None;
        }

        let data = self.content.as_ref().filter(|c| !c.is_empty())?;

        Some(Attachment {
            type_: self.content_type.clone(),
            name: self.filename.clone(),
            data: data.clone(),
        })
    }
}

/// Normalized mail message handed to the transport.
///
/// The JSON shape follows the usual mail framework conventions (`replyTo`,
/// `contentType`); SparkPost specific overrides keep their API names.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<OneOrMany<AddressInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Copied to `content.reply_to` as given, whatever its shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentDescriptor>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<OneOrMany<AddressInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<OneOrMany<AddressInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<OneOrMany<AddressInput>>,

    // Overrides for the transport defaults
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        rename = "campaign_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub campaign_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(
        rename = "substitution_data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub substitution_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<Recipient>>,
}

impl MailMessage {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, crate::Error> {
        serde_json::from_str(raw).map_err(|e| e.into())
    }

    pub fn with_from(mut self, from: impl Into<AddressInput>) -> Self {
        self.from = Some(OneOrMany::One(from.into()));
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<Value>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<AddressInput>) -> Self {
        self.to = Some(push_address(self.to.take(), to.into()));
        self
    }

    pub fn with_cc(mut self, cc: impl Into<AddressInput>) -> Self {
        self.cc = Some(push_address(self.cc.take(), cc.into()));
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<AddressInput>) -> Self {
        self.bcc = Some(push_address(self.bcc.take(), bcc.into()));
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }
}

fn push_address(
    current: Option<OneOrMany<AddressInput>>,
    address: AddressInput,
) -> OneOrMany<AddressInput> {
    match current {
        None => OneOrMany::One(address),
        Some(OneOrMany::One(first)) => OneOrMany::Many(vec![first, address]),
        Some(OneOrMany::Many(mut all)) => {
            all.push(address);
            OneOrMany::Many(all)
        }
    }
}

/// Resolve a caller supplied address into zero or more canonical addresses.
///
/// Structured addresses are passed through untouched. Strings are parsed as
/// an RFC 5322 address list; a list that fails to parse, or that holds any
/// entry which is not a valid mailbox, yields nothing at all.
///
/// Quoted local parts (`"john doe"@x.com`) are rejected by the parser, so
/// such addresses are dropped too.
pub fn parse_address(input: &AddressInput) -> Vec<EmailAddress> {
    match input {
        AddressInput::Structured { address, name } => vec![EmailAddress {
            email: address.clone(),
            name: name.clone(),
        }],
        AddressInput::Raw(raw) => parse_address_list(raw),
    }
}

pub fn parse_address_list(raw: &str) -> Vec<EmailAddress> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let list = match mailparse::addrparse(raw) {
        Ok(list) => list,
        Err(e) => {
            log::debug!("Dropping unparseable address list {:?}: {}", raw, e);
            return Vec::new();
        }
    };

    let mailboxes: Vec<SingleInfo> = list
        .iter()
        .flat_map(|addr| match addr {
            MailAddr::Single(info) => vec![info.clone()],
            // Group names carry no meaning for delivery; keep the members
            MailAddr::Group(group) => group.addrs.clone(),
        })
        .collect();

    if let Some(invalid) = mailboxes
        .iter()
        .find(|info| !email_address::EmailAddress::is_valid(&info.addr))
    {
        log::debug!(
            "Dropping address list {:?}, invalid address {:?}",
            raw,
            invalid.addr
        );
        return Vec::new();
    }

    mailboxes
        .into_iter()
        .map(|info| EmailAddress {
            email: Some(info.addr),
            name: info.display_name,
        })
        .collect()
}
