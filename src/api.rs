use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::http_client::http_client;
use crate::model::{CreateResult, Entity};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Every failure of an API call, whatever the cause.
///
/// `status` and `detail` are for the diagnostic log only; the dashboard shows a
/// fixed message per screen.
#[derive(Debug, Clone, Error)]
#[error("{method} {path} failed")]
pub struct RequestFailed {
    pub method: Method,
    pub path: String,
    pub status: Option<u16>,
    pub detail: String,
}

impl RequestFailed {
    pub fn new(method: Method, path: &str, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

/// The REST server as seen by the dashboard.
pub trait Backend: Send + Sync {
    fn get(&self, path: &str) -> Result<Value, RequestFailed>;
    fn post(&self, path: &str, body: &Value) -> Result<Value, RequestFailed>;
}

/// Blocking client that attaches the operator's bearer token to every call.
pub struct ApiClient {
    base_url: String,
    session: Arc<SessionStore>,
    client: &'static Client,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            session,
            client: http_client()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    // Read at call time so a fresh login is picked up by the next request.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => req.header(AUTHORIZATION, format!("Bearer {token}")),
            None => req,
        }
    }
}

impl Backend for ApiClient {
    fn get(&self, path: &str) -> Result<Value, RequestFailed> {
        let req = self
            .client
            .get(self.url_for(path))
            .header(CACHE_CONTROL, "no-store")
            .header(PRAGMA, "no-cache");
        let resp = self.authorize(req).send().map_err(|err| {
            log_failure(RequestFailed::new(Method::Get, path, None, err.to_string()))
        })?;
        read_json(Method::Get, path, resp)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, RequestFailed> {
        let req = self.client.post(self.url_for(path)).json(body);
        let resp = self.authorize(req).send().map_err(|err| {
            log_failure(RequestFailed::new(Method::Post, path, None, err.to_string()))
        })?;
        read_json(Method::Post, path, resp)
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

fn read_json(method: Method, path: &str, resp: Response) -> Result<Value, RequestFailed> {
    let status = resp.status();
    let body = resp.text().map_err(|err| {
        log_failure(RequestFailed::new(
            method,
            path,
            Some(status.as_u16()),
            format!("failed reading body: {err}"),
        ))
    })?;
    if !status.is_success() {
        let body = if body.trim().is_empty() {
            "<no body>".to_string()
        } else {
            body
        };
        return Err(log_failure(RequestFailed::new(
            method,
            path,
            Some(status.as_u16()),
            body,
        )));
    }
    parse_body(&body).map_err(|err| {
        log_failure(RequestFailed::new(
            method,
            path,
            Some(status.as_u16()),
            format!("invalid json: {err}"),
        ))
    })
}

fn parse_body(raw: &str) -> Result<Value, serde_json::Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed)
}

fn log_failure(err: RequestFailed) -> RequestFailed {
    match err.status {
        Some(status) => log::error!(
            "{} ERROR {} {} {}",
            err.method,
            err.path,
            status,
            snippet(&err.detail)
        ),
        None => log::error!("{} ERROR {} {}", err.method, err.path, err.detail),
    }
    err
}

fn snippet(body: &str) -> String {
    body.trim()
        .replace(['\n', '\r'], " ")
        .chars()
        .take(400)
        .collect()
}

/// `null` counts as an empty collection.
pub fn get_list<T: DeserializeOwned>(api: &dyn Backend, path: &str) -> Result<Vec<T>, RequestFailed> {
    match api.get(path)? {
        Value::Null => Ok(Vec::new()),
        value => decode(Method::Get, path, value),
    }
}

/// `null` means the record does not exist.
pub fn get_optional<T: DeserializeOwned>(
    api: &dyn Backend,
    path: &str,
) -> Result<Option<T>, RequestFailed> {
    match api.get(path)? {
        Value::Null => Ok(None),
        value => decode(Method::Get, path, value).map(Some),
    }
}

/// POSTs `body` and decodes the created record, bare or wrapped.
pub fn create<T: Entity, B: Serialize>(
    api: &dyn Backend,
    path: &str,
    body: &B,
) -> Result<CreateResult<T>, RequestFailed> {
    let body = serde_json::to_value(body).map_err(|err| {
        RequestFailed::new(Method::Post, path, None, format!("serialize body: {err}"))
    })?;
    let created = api.post(path, &body)?;
    CreateResult::decode(created).map_err(|err| {
        log_failure(RequestFailed::new(
            Method::Post,
            path,
            None,
            format!("unexpected {} payload: {err}", T::SINGULAR),
        ))
    })
}

fn decode<T: DeserializeOwned>(method: Method, path: &str, value: Value) -> Result<T, RequestFailed> {
    serde_json::from_value(value).map_err(|err| {
        log_failure(RequestFailed::new(
            method,
            path,
            None,
            format!("unexpected payload: {err}"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_avoids_double_slash() {
        assert_eq!(join_url("http://api.local/", "/teams"), "http://api.local/teams");
        assert_eq!(join_url("http://api.local", "teams"), "http://api.local/teams");
        assert_eq!(join_url("http://api.local/v1//", ""), "http://api.local/v1");
    }

    #[test]
    fn empty_body_parses_as_null() {
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert!(parse_body("<html>").is_err());
    }
}
