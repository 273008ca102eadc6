//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default, so an empty file is a valid config.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::config::duration::go_duration;
use crate::config::loader::ConfigError;
use crate::payload::{HeaderSet, STDIN_SOURCE};
use crate::resilience::RetryPolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MultipostConfig {
    /// Delivery settings shared by every target.
    pub delivery: DeliveryConfig,
}

/// Settings applied uniformly to every delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Log every attempt, not only failures.
    pub verbose: bool,

    /// Maximum attempts per target.
    pub retries: u32,

    /// Wait between failed attempts.
    #[serde(with = "go_duration")]
    pub retry_time: Duration,

    /// Payload source path, or `-` for stdin.
    pub input: String,

    /// Form parameter name wrapping the payload. Empty sends raw bytes.
    pub param: String,

    /// Absolute budget for the whole run.
    #[serde(with = "go_duration")]
    pub time_limit: Duration,

    /// User-Agent sent with each request.
    pub user_agent: Option<String>,

    /// Extra headers sent with each request, in order. A name may repeat.
    #[serde(with = "header_table")]
    pub headers: Vec<(String, String)>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            retries: 3,
            retry_time: Duration::from_secs(30),
            input: STDIN_SOURCE.to_string(),
            param: "payload".to_string(),
            time_limit: Duration::from_secs(15 * 60),
            user_agent: Some(default_user_agent()),
            headers: Vec::new(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("multipost/", env!("CARGO_PKG_VERSION")).to_string()
}

impl DeliveryConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, self.retry_time)
    }

    /// Build the immutable header set from the configured headers.
    ///
    /// The User-Agent is applied by the transport, not here.
    pub fn header_set(&self) -> Result<HeaderSet, ConfigError> {
        let mut headers = HeaderSet::new();
        for (name, value) in &self.headers {
            let (name, value) = parse_header_pair(name, value)?;
            headers.append(name, value);
        }
        Ok(headers)
    }

    pub fn user_agent_value(&self) -> Result<Option<HeaderValue>, ConfigError> {
        self.user_agent
            .as_deref()
            .map(|ua| {
                HeaderValue::from_str(ua).map_err(|e| ConfigError::InvalidHeader {
                    name: USER_AGENT.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// `[delivery.headers]` as ordered pairs.
///
/// Each key maps to a string or an array of strings; every array element
/// becomes its own header line. Entries keep their order in the file.
mod header_table {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize, Serialize)]
    #[serde(untagged)]
    enum Values<T> {
        One(T),
        Many(Vec<T>),
    }

    pub fn serialize<S: Serializer>(
        headers: &[(String, String)],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for (name, value) in headers {
            match grouped.iter_mut().find(|(seen, _)| *seen == name.as_str()) {
                Some((_, values)) => values.push(value.as_str()),
                None => grouped.push((name.as_str(), vec![value.as_str()])),
            }
        }

        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (name, mut values) in grouped {
            if values.len() == 1 {
                map.serialize_entry(name, &Values::One(values.remove(0)))?;
            } else {
                map.serialize_entry(name, &Values::Many(values))?;
            }
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, String)>, D::Error> {
        deserializer.deserialize_map(HeaderTable)
    }

    struct HeaderTable;

    impl<'de> Visitor<'de> for HeaderTable {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a table of header names to a string or array of strings")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut headers = Vec::new();
            while let Some((name, values)) = map.next_entry::<String, Values<String>>()? {
                match values {
                    Values::One(value) => headers.push((name, value)),
                    Values::Many(values) => {
                        headers.extend(values.into_iter().map(|value| (name.clone(), value)));
                    }
                }
            }
            Ok(headers)
        }
    }
}

/// Validate one header name/value pair.
pub fn parse_header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let header_name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
        ConfigError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    let header_value = HeaderValue::from_str(value.trim()).map_err(|e| ConfigError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok((header_name, header_value))
}
