use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use http::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DispatchError;
use crate::route::Route;

/// Read side of the current request.
///
/// Parameter getters return every parameter as a JSON object when `key`
/// is `None`, otherwise the single value if present.
pub trait RequestReader: Send + Sync {
    fn uri(&self) -> &str;
    fn get_parameter(&self, key: Option<&str>) -> Option<Value>;
    fn post_parameter(&self, key: Option<&str>) -> Option<Value>;
    fn put_parameter(&self, key: Option<&str>) -> Option<Value>;
    fn is_get(&self) -> bool;
    fn is_post(&self) -> bool;
    fn is_put(&self) -> bool;
    fn is_delete(&self) -> bool;
    /// Ask the client to go to `handler`/`action` instead.
    fn redirect(&self, handler: &str, action: &str) -> Result<(), DispatchError>;
}

/// In-process request built from a method, a URI and an optional
/// form-encoded body.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: String,
    query: Map<String, Value>,
    body: Map<String, Value>,
    redirect: Mutex<Option<String>>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let query = to_object(parse_query_params(&uri));
        Self {
            method,
            uri,
            query,
            body: Map::new(),
            redirect: Mutex::new(None),
        }
    }

    /// Attach a form-encoded body (`a=1&b=two`).
    #[must_use]
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.body = to_object(parse_form(body));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target recorded by the last [`RequestReader::redirect`] call.
    #[must_use]
    pub fn redirect_target(&self) -> Option<String> {
        self.redirect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn body_for(&self, method: &Method, key: Option<&str>) -> Option<Value> {
        if &self.method != method {
            return match key {
                None => Some(Value::Object(Map::new())),
                Some(_) => None,
            };
        }
        lookup(&self.body, key)
    }
}

impl RequestReader for Request {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn get_parameter(&self, key: Option<&str>) -> Option<Value> {
        lookup(&self.query, key)
    }

    fn post_parameter(&self, key: Option<&str>) -> Option<Value> {
        self.body_for(&Method::POST, key)
    }

    fn put_parameter(&self, key: Option<&str>) -> Option<Value> {
        self.body_for(&Method::PUT, key)
    }

    fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    fn is_put(&self) -> bool {
        self.method == Method::PUT
    }

    fn is_delete(&self) -> bool {
        self.method == Method::DELETE
    }

    fn redirect(&self, handler: &str, action: &str) -> Result<(), DispatchError> {
        if handler.is_empty() || handler.contains('/') || action.contains('/') {
            return Err(DispatchError::Other(anyhow::anyhow!(
                "invalid redirect target {handler:?}/{action:?}"
            )));
        }
        let target = format!("{}/{handler}/{action}", Route::parse(&self.uri).base_path());
        debug!(target = %target, "Redirect requested");
        *self.redirect.lock().unwrap_or_else(PoisonError::into_inner) = Some(target);
        Ok(())
    }
}

fn lookup(params: &Map<String, Value>, key: Option<&str>) -> Option<Value> {
    match key {
        None => Some(Value::Object(params.clone())),
        Some(k) => params.get(k).cloned(),
    }
}

fn to_object(params: HashMap<String, String>) -> Map<String, Value> {
    params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

/// Parse query string parameters from a URI
///
/// Everything after the first `?` is URL-decoded; a fragment is ignored.
/// Repeated keys keep the last value.
#[must_use]
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    match uri.split_once('?') {
        Some((_, query)) => parse_form(query.split('#').next().unwrap_or_default()),
        None => HashMap::new(),
    }
}

/// Parse an `application/x-www-form-urlencoded` string.
#[must_use]
pub fn parse_form(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
