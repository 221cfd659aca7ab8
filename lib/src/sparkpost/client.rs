use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use url::Url;

use super::api;
use super::types::{Transmission, TransmissionResponse};

use crate::Error;

// Definition of future types for async use
pub type ClientFuture<'a, T> = BoxFuture<'a, Result<T, Error>>;

/// Anything that can deliver a transmission to SparkPost.
///
/// `SparkPostClient` is the HTTP implementation; the transport only depends
/// on this trait.
pub trait TransmissionClient: Send + Sync {
    fn send_transmission<'a>(
        &'a self,
        transmission: &'a Transmission,
    ) -> ClientFuture<'a, TransmissionResponse>;
}

pub struct SparkPostClient {
    api_key: Option<String>,
    url: Url,
    client: reqwest::Client,
}

impl SparkPostClient {
    /// Build a client for the API origin `base` (see `api::SPARKPOST_BASE_API`).
    ///
    /// A missing key is not an error here; SparkPost rejects the request
    /// when it is sent.
    pub fn new(api_key: Option<String>, base: &str, timeout: Duration) -> Result<Self, Error> {
        let url = api::build_endpoint_url(base, api::Endpoint::Transmissions)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            url,
            client,
        })
    }

    pub fn from_key(api_key: impl Into<String>) -> Result<Self, Error> {
        Self::new(
            Some(api_key.into()),
            api::SPARKPOST_BASE_API,
            Duration::from_secs(api::SPARKPOST_REQUEST_TIMEOUT),
        )
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn request(&self, transmission: &Transmission) -> Result<TransmissionResponse, Error> {
        let mut req = self
            .client
            .post(self.url.clone())
            .header(ACCEPT, "application/json")
            .json(transmission);

        // SparkPost expects the bare API key, no scheme
        if let Some(ref key) = self.api_key {
            req = req.header(AUTHORIZATION, key.as_str());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        // Map response into an error if applicable
        api::map_status(status, &body)?;

        serde_json::from_slice(&body).map_err(|e| e.into())
    }
}

impl TransmissionClient for SparkPostClient {
    fn send_transmission<'a>(
        &'a self,
        transmission: &'a Transmission,
    ) -> ClientFuture<'a, TransmissionResponse> {
        Box::pin(self.request(transmission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparkpost::types::EmailAddress;
    use mockito::Matcher;
    use serde_json::json;

    const SUCCESS_BODY: &str = r#"{"results":{"total_rejected_recipients":0,"total_accepted_recipients":1,"id":"66123596945797072"}}"#;

    fn transmission() -> Transmission {
        let mut transmission = Transmission::default();
        transmission
            .recipients
            .push(EmailAddress::new("a@x.com", None).into());
        transmission
            .content
            .insert("subject".to_string(), json!("Hello"));
        transmission
    }

    fn client(server: &mockito::Server, key: Option<&str>) -> SparkPostClient {
        SparkPostClient::new(
            key.map(|k| k.to_string()),
            &server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_transmission() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/transmissions")
            .match_header("authorization", "secret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "recipients": [{ "address": { "email": "a@x.com" } }],
                "content": { "subject": "Hello" },
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let result = client(&server, Some("secret"))
            .send_transmission(&transmission())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.results.id, "66123596945797072");
        assert_eq!(result.results.total_accepted_recipients, 1);
        assert_eq!(result.results.total_rejected_recipients, 0);
    }

    #[tokio::test]
    async fn test_missing_key_is_left_to_provider() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/transmissions")
            .match_header("authorization", Matcher::Missing)
            .with_status(401)
            .with_body(r#"{"errors":[{"message":"Unauthorized."}]}"#)
            .create_async()
            .await;

        let result = client(&server, None)
            .send_transmission(&transmission())
            .await;

        mock.assert_async().await;
        match result {
            Err(Error::Provider { status, errors }) => {
                assert_eq!(status, 401);
                assert_eq!(errors[0].message, "Unauthorized.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/transmissions")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let result = client(&server, Some("secret"))
            .send_transmission(&transmission())
            .await;

        assert!(matches!(result, Err(Error::JsonParse(_))));
    }

    #[test]
    fn test_url_from_base() {
        let client = SparkPostClient::from_key("secret").unwrap();
        assert_eq!(
            client.url().as_str(),
            "https://api.sparkpost.com/api/v1/transmissions"
        );
    }
}
