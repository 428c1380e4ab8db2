use reqwest::{header, Method, Url};

use crate::{CentralError, Result};

/// Path prefix shared by every central API endpoint.
pub(crate) const API_PREFIX: &str = "/api/central/v1";

/// Name of the cookie carrying the session key.
pub(crate) const SESSION_COOKIE: &str = "checkpoint.session";

/// Resolves `path` and `query` against the service base URL.
///
/// The base URL's own path is replaced by [`API_PREFIX`] followed by `path`.
/// When `query` is present it replaces any query string on the base URL.
pub(crate) fn format_url(base: &Url, path: &str, query: Option<&[(&str, &str)]>) -> Url {
    let mut url = base.clone();
    url.set_path(&format!("{API_PREFIX}{path}"));
    if let Some(pairs) = query {
        url.set_query(None);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
    url
}

/// Builds a request against the central API without sending it.
pub(crate) fn new_request(
    http: &reqwest::Client,
    base: &Url,
    session_key: Option<&str>,
    method: Method,
    path: &str,
    query: Option<&[(&str, &str)]>,
) -> Result<reqwest::Request> {
    let url = format_url(base, path, query);
    let mut builder = http
        .request(method, url)
        .header(header::ACCEPT, "application/json");

    if let Some(key) = session_key.filter(|key| !key.is_empty()) {
        builder = builder.header(header::COOKIE, session_cookie(key));
    }

    builder.build().map_err(CentralError::Transport)
}

/// Returns `true` if any `/`-separated segment of `value` is `.` or `..`,
/// literally or percent-encoded.
///
/// URL parsing collapses such segments, so a path built from `value` would
/// address a different resource than the one named.
pub(crate) fn has_dot_segment(value: &str) -> bool {
    value.split('/').any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

pub(crate) fn session_cookie(key: &str) -> String {
    format!("{SESSION_COOKIE}={key}")
}
