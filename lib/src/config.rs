use ::config::{Config, Environment, File, Source};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sparkpost::api::{SPARKPOST_BASE_API, SPARKPOST_REQUEST_TIMEOUT};
use crate::sparkpost::types::Recipient;
use crate::Error;

const ENV_PREFIX: &str = "SPARKPOST";
const ENV_LIST_SEPARATOR: &str = ",";

/// Transport configuration.
///
/// Besides the credentials, this holds the defaults applied to every
/// transmission unless the message overrides them. Unknown keys are ignored.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// SparkPost API key; needs the Transmissions: Read/Write permission
    pub api_key: Option<String>,

    /// API origin, defaults to the US region
    pub endpoint: Option<String>,

    /// Request timeout, in seconds
    pub timeout_secs: u64,

    pub tags: Option<Vec<String>>,
    pub campaign_id: Option<String>,
    pub metadata: Option<Map<String, Value>>,
    pub substitution_data: Option<Map<String, Value>>,
    pub options: Option<Map<String, Value>>,
    pub content: Option<Map<String, Value>>,
    pub recipients: Option<Vec<Recipient>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            timeout_secs: SPARKPOST_REQUEST_TIMEOUT,
            tags: None,
            campaign_id: None,
            metadata: None,
            substitution_data: None,
            options: None,
            content: None,
            recipients: None,
        }
    }
}

impl TransportConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(SPARKPOST_BASE_API)
    }
}

/// Loads transport config from an optional TOML file and merges it with any
/// environment variables prefixed with SPARKPOST_.
///
/// Environment variables win over the file, so `SPARKPOST_API_KEY` replaces
/// an `api_key` set in the file. `SPARKPOST_TAGS` takes a comma separated
/// list; the map valued keys can only be set from the file.
pub fn load_config(path: Option<&str>) -> Result<TransportConfig, Error> {
    let file = path.map(File::with_name);
    load_from(file, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .list_separator(ENV_LIST_SEPARATOR)
        .with_list_parse_key("tags")
}

fn load_from<S>(file: Option<S>, env: Environment) -> Result<TransportConfig, Error>
where
    S: Source + Send + Sync + 'static,
{
    let mut builder = Config::builder();

    if let Some(file) = file {
        builder = builder.add_source(file);
    }

    let settings = builder.add_source(env).build()?;
    let config: TransportConfig = settings.try_deserialize()?;

    log::debug!(
        "Loaded transport config for {} (api key set: {})",
        config.endpoint(),
        config.api_key.is_some()
    );

    Ok(config)
}
