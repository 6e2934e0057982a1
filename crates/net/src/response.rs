use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// How a response relates to the origin the application is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin response; fully readable and eligible for caching.
    Basic,
    /// Cross-origin response the remote allowed us to read.
    Cors,
    /// Cross-origin response whose contents are hidden from us.
    Opaque,
    /// Produced locally rather than by the network.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    pub status: u16,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}
impl Response {
    /// Status in the `2xx` range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; returns the first matching value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).or_raise(|| ErrorKind::Decode(self.url.to_string()))
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).or_raise(|| ErrorKind::Decode(self.url.to_string()))
    }

    /// Build a locally produced `200 OK` JSON response for `url`.
    pub fn synthetic_json(url: Url, value: &serde_json::Value) -> Self {
        Self {
            url,
            status: 200,
            kind: ResponseKind::Synthetic,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: value.to_string().into_bytes(),
        }
    }
}
