use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reqwest::{Method, Url};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// An outgoing request.
///
/// Deliberately small: the application only ever reads from the network, so
/// there is no request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}
impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url, headers: Vec::new() }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Parse `url` and build a `GET` request for it.
    pub fn get_str(url: &str) -> Result<Self> {
        let parsed = Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
        Ok(Self::get(parsed))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Host name of the target authority, if the URL has one.
    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    /// Identity of this request for caching purposes: method and full URL.
    /// Headers do not participate.
    pub fn key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}
impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.method, self.url)
    }
}
