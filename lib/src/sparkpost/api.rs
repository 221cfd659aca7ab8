use reqwest::StatusCode;
use url::Url;

use crate::sparkpost::types::{ErrorResponse, ProviderError};
use crate::Error;

pub const SPARKPOST_BASE_API: &str = "https://api.sparkpost.com";
pub const SPARKPOST_EU_BASE_API: &str = "https://api.eu.sparkpost.com";

// Request timeout, in seconds
pub(crate) const SPARKPOST_REQUEST_TIMEOUT: u64 = 30;

pub enum Endpoint {
    Transmissions,
}

/// Join an API origin (e.g. `https://api.sparkpost.com`) with the path of
/// `endpoint`.
pub fn build_endpoint_url(base: &str, endpoint: Endpoint) -> Result<Url, Error> {
    let base = Url::parse(base)?;

    let path = match endpoint {
        Endpoint::Transmissions => "api/v1/transmissions",
    };

    Ok(base.join(path)?)
}

/// Turn a non-2xx SparkPost response into `Error::Provider`.
///
/// The provider's `errors` array is kept verbatim. Bodies that are not
/// SparkPost error documents (proxies, load balancers) become a single entry
/// holding the raw body.
pub fn map_status(status: StatusCode, body: &[u8]) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }

    let errors = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(resp) => resp.errors,
        Err(_) => {
            let raw = String::from_utf8_lossy(body).trim().to_string();
            let message = if raw.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                raw
            };

            vec![ProviderError {
                message,
                ..Default::default()
            }]
        }
    };

    Err(Error::Provider {
        status: status.as_u16(),
        errors,
    })
}
