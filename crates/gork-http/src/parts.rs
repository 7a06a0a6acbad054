//! Raw request data the binder reads from

use crate::error::{RequestError, SectionErrors};
use gork_core::Section;
use http::header::{HeaderName, COOKIE};
use http::{HeaderMap, HeaderValue, Method, Request};
use std::collections::BTreeMap;

/// The parts of an HTTP request that request sections are bound from
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub method: Method,
    pub path: String,
    /// Values captured by the router for `{name}` placeholders
    pub path_params: BTreeMap<String, String>,
    /// Decoded query pairs in request order; keys may repeat
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RequestParts {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Default::default()
        }
    }

    /// Split an `http::Request`, adding the router's path parameters.
    /// An undecodable query string is reported as a `query` validation error.
    pub fn from_request<I>(request: Request<Vec<u8>>, path_params: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (head, body) = request.into_parts();
        let query = match head.uri.query() {
            Some(query) => decode_query(query)?,
            None => Vec::new(),
        };
        Ok(Self {
            method: head.method,
            path: head.uri.path().to_string(),
            path_params: path_params.into_iter().collect(),
            query,
            headers: head.headers,
            body,
        })
    }

    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append the pairs of an encoded query string
    pub fn with_query_string(mut self, query: &str) -> Result<Self, RequestError> {
        self.query.extend(decode_query(query)?);
        Ok(self)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Every value of a query key, in request order
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Every value of a header. Names compare case-insensitively; values that
    /// are not visible ASCII are skipped.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            return Vec::new();
        };
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    /// Cookies from every `Cookie` header, in order
    pub fn cookies(&self) -> Vec<(&str, &str)> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                Some((name.trim(), value))
            })
            .filter(|(name, _)| !name.is_empty())
            .collect()
    }

    pub fn cookie_values(&self, name: &str) -> Vec<&str> {
        self.cookies()
            .into_iter()
            .filter(|(cookie, _)| *cookie == name)
            .map(|(_, value)| value)
            .collect()
    }

    /// Values for `name` within a section; the body has no named values
    pub fn values(&self, section: Section, name: &str) -> Vec<&str> {
        match section {
            Section::Path => self.path_param(name).into_iter().collect(),
            Section::Query => self.query_values(name),
            Section::Headers => self.header_values(name),
            Section::Cookies => self.cookie_values(name),
            Section::Body => Vec::new(),
        }
    }
}

fn decode_query(query: &str) -> Result<Vec<(String, String)>, RequestError> {
    serde_urlencoded::from_str(query).map_err(|e| {
        RequestError::Validation(SectionErrors::single(
            Section::Query.key(),
            format!("Invalid query string: {}", e),
        ))
    })
}
