//! Request and response model shared by the router, the strategies and the cache.
//!
//! Bodies are held as [`Bytes`], so a fetched payload can be handed to the cache
//! and to the caller without re-reading it.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// How the page issued the request.
///
/// Only `Navigate` changes routing; the other modes are carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// Top-level document load.
    Navigate,
    #[default]
    NoCors,
    Cors,
    SameOrigin,
}

impl FromStr for RequestMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "navigate" => Ok(RequestMode::Navigate),
            "no-cors" => Ok(RequestMode::NoCors),
            "cors" => Ok(RequestMode::Cors),
            "same-origin" => Ok(RequestMode::SameOrigin),
            other => Err(Error::InvalidInput(format!("unknown request mode: {other}"))),
        }
    }
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::Navigate => write!(f, "navigate"),
            RequestMode::NoCors => write!(f, "no-cors"),
            RequestMode::Cors => write!(f, "cors"),
            RequestMode::SameOrigin => write!(f, "same-origin"),
        }
    }
}

/// A request observed by the worker.
///
/// Transient: classified once by the router, never persisted as such.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptedRequest {
    pub method: String,
    pub url: Url,
    pub mode: RequestMode,
}

impl InterceptedRequest {
    /// Build a request; the method is normalized to upper case.
    pub fn new(method: &str, url: Url, mode: RequestMode) -> Self {
        Self { method: method.trim().to_ascii_uppercase(), url, mode }
    }

    /// A plain sub-resource `GET`.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, RequestMode::NoCors)
    }

    /// A document navigation.
    pub fn navigate(url: Url) -> Self {
        Self::new("GET", url, RequestMode::Navigate)
    }

    /// Parse an absolute URL string into a request.
    pub fn parse(method: &str, url: &str, mode: RequestMode) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new(method, url, mode))
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    pub fn is_http(&self) -> bool {
        matches!(self.url.scheme(), "http" | "https")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for InterceptedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response as delivered to the page or stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: status_text.into(), headers: Vec::new(), body: body.into() }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, "OK", body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
