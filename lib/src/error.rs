use serde::{Deserialize, Serialize};

use crate::sparkpost::types::ProviderError;

/// All possible transport errors.
///
/// Provider failures are carried through as reported by SparkPost: the HTTP
/// status and the `errors` array of the response body, untouched.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, thiserror::Error)]
pub enum Error {
    #[error("Provider ({status}): {}", describe(.errors))]
    Provider {
        status: u16,
        errors: Vec<ProviderError>,
    },
    #[error("RequestTimeout")]
    RequestTimeout,
    #[error("RequestError: {0}")]
    Request(String),
    #[error("UrlParseError: {0}")]
    UrlParse(String),
    #[error("JsonParseError: {0}")]
    JsonParse(String),
    #[error("ConfigError: {0}")]
    Config(String),
}

fn describe(errors: &[ProviderError]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }

    errors
        .iter()
        .map(|e| match e.description {
            Some(ref description) => format!("{} ({})", e.message, description),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::UrlParse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl From<serde_json::error::Error> for Error {
    fn from(err: serde_json::error::Error) -> Self {
        Self::JsonParse(err.to_string())
    }
}

impl From<::config::ConfigError> for Error {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_lists_messages() {
        let err = Error::Provider {
            status: 401,
            errors: vec![ProviderError {
                message: "Unauthorized.".to_string(),
                description: None,
                code: None,
            }],
        };

        assert_eq!(err.to_string(), "Provider (401): Unauthorized.");
    }

    #[test]
    fn provider_error_display_includes_description() {
        let err = Error::Provider {
            status: 422,
            errors: vec![ProviderError {
                message: "invalid data format/type".to_string(),
                description: Some("Invalid recipient address".to_string()),
                code: Some("1300".to_string()),
            }],
        };

        assert_eq!(
            err.to_string(),
            "Provider (422): invalid data format/type (Invalid recipient address)"
        );
    }
}
