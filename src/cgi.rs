//! CGI transport: request from the environment, response on stdout.

use crate::router::{Request, Response};
use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::env;
use std::io::Write;

/// Build the request the web server handed us through CGI variables.
pub fn request_from_env() -> Result<Request> {
    request_from_lookup(|key| env::var(key).ok())
}

pub fn request_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Request> {
    let method = lookup("REQUEST_METHOD")
        .filter(|value| !value.is_empty())
        .context("REQUEST_METHOD is not set; not running under CGI")?;

    // The router counts segments from the full URL path, so the script's
    // mount point has to stay in front of PATH_INFO.
    let uri = lookup("REQUEST_URI").filter(|value| !value.is_empty());
    let (path, uri_query) = match uri.as_deref() {
        Some(uri) => {
            let (raw_path, raw_query) = uri.split_once('?').unwrap_or((uri, ""));
            (
                percent_decode_str(raw_path).decode_utf8_lossy().into_owned(),
                raw_query.to_string(),
            )
        }
        None => (
            format!(
                "{}{}",
                lookup("SCRIPT_NAME").unwrap_or_default(),
                lookup("PATH_INFO").unwrap_or_default()
            ),
            String::new(),
        ),
    };
    let query = lookup("QUERY_STRING")
        .filter(|value| !value.is_empty())
        .unwrap_or(uri_query);

    Ok(Request::new(&method, &path, &query))
}

/// `Status:` line, headers, blank line, body.
pub fn write_response<W: Write>(out: &mut W, response: &Response) -> Result<()> {
    write!(out, "Status: {}\r\n", response.status).context("write status")?;
    for (name, value) in &response.headers {
        write!(out, "{name}: {value}\r\n").context("write header")?;
    }
    out.write_all(b"\r\n").context("write header terminator")?;
    if let Some(body) = &response.body {
        out.write_all(body).context("write body")?;
    }
    out.flush().context("flush response")?;
    Ok(())
}
