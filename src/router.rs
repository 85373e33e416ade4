//! Request dispatch: `GET /<p>/<p>/<kind>/<seg>/<logical file...>?pos=&scope=`.

use crate::config::Config;
use crate::model::{CallersResult, ImplementsResult, PeersResult, ReferrersResult, Status};
use crate::oracle::{Invocation, OracleError, QueryKind};
use crate::resolve::{LogicalPosition, Resolver};
use crate::roots::SourceRoots;
use crate::translate::Translate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const KIND_SEGMENT: usize = 2;
const FILE_SEGMENTS_START: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
}

impl Request {
    /// Build a request from a raw, url-encoded query string. The first value
    /// of a repeated parameter wins.
    pub fn new(method: &str, path: &str, query_string: &str) -> Self {
        let mut query = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query_string.as_bytes()) {
            query
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }
        Self {
            method: method.to_string(),
            path: path.to_string(),
            query,
        }
    }

    /// Missing parameters read as empty.
    pub fn param(&self, name: &str) -> &str {
        self.query.get(name).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body: Some(body),
            },
            Err(err) => Self::error(500, "Failed to encode response", Some(err.to_string())),
        }
    }

    /// Status envelope with `severity = Error`.
    pub fn error(status: u16, message: &str, detail: Option<String>) -> Self {
        Self::json(status, &Status::error(status, message, detail))
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn not_handled() -> Self {
        Self::error(400, "Request not handled", None)
    }
}

impl From<OracleError> for Response {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::ToolUnavailable { source, .. } => Response::error(
                500,
                "Oracle tool failed or is not installed.",
                Some(source.to_string()),
            ),
            OracleError::PipeSetup => Response::error(500, "Error opening pipe", None),
            OracleError::NoResult { .. } => Response::no_content(),
            OracleError::Timeout(_) => {
                Response::error(504, "Oracle tool timed out.", Some(err.to_string()))
            }
            OracleError::Wait(source) => Response::error(
                500,
                "Oracle tool failed or is not installed.",
                Some(source.to_string()),
            ),
        }
    }
}

/// Logical file path carried by the request path: every segment after the
/// fourth, rooted at `/`.
pub fn logical_file_path(segments: &[&str]) -> String {
    let rest = segments.get(FILE_SEGMENTS_START..).unwrap_or(&[]);
    format!("/{}", rest.join("/"))
}

#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    config: &'a Config,
    roots: &'a SourceRoots,
}

impl<'a> Router<'a> {
    pub fn new(config: &'a Config, roots: &'a SourceRoots) -> Self {
        Self { config, roots }
    }

    /// Always produces a response; unmatched requests get the 400 envelope.
    pub fn handle(&self, req: &Request) -> Response {
        self.route(req).unwrap_or_else(|| {
            tracing::debug!(method = %req.method, path = %req.path, "request not handled");
            Response::not_handled()
        })
    }

    /// `None` when the method/path combination is not ours.
    pub fn route(&self, req: &Request) -> Option<Response> {
        if req.method != "GET" {
            return None;
        }
        let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();
        if segments.len() < FILE_SEGMENTS_START {
            return None;
        }
        let kind = QueryKind::parse(segments[KIND_SEGMENT])?;

        let logical = LogicalPosition {
            path: logical_file_path(&segments),
            offset: req.param("pos").to_string(),
            scope: req.param("scope").to_string(),
        };
        let resolver = Resolver::new(self.roots, self.config.tie_break);
        let physical = resolver.to_physical(&logical);
        let invocation = Invocation {
            program: &self.config.oracle_bin,
            kind,
            position: &physical,
        };
        tracing::debug!(kind = kind.as_str(), logical = %logical.path, "dispatching");

        Some(match kind {
            QueryKind::Implements => self.answer::<ImplementsResult>(&invocation, &resolver),
            QueryKind::Referrers => self.answer::<ReferrersResult>(&invocation, &resolver),
            QueryKind::Callers => self.answer::<CallersResult>(&invocation, &resolver),
            QueryKind::Peers => self.answer::<PeersResult>(&invocation, &resolver),
        })
    }

    fn answer<T>(&self, invocation: &Invocation<'_>, resolver: &Resolver<'_>) -> Response
    where
        T: Translate + Serialize + DeserializeOwned + Default + Send + 'static,
    {
        match invocation
            .kind
            .exec_mode()
            .run::<T>(invocation, self.config.timeout)
        {
            Ok(mut result) => {
                result.translate(resolver);
                Response::json(200, &result)
            }
            Err(err) => Response::from(err),
        }
    }
}
