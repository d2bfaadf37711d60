//! Installer download URL resolution
//!
//! The served `installerUrl` comes from one of three places, in order:
//!
//! 1. an absolute `PORTAL_INSTALLER_URL`, returned as-is;
//! 2. `SERVER_BASE_URL` joined with `PORTAL_INSTALLER_PATH`;
//! 3. a base guessed from the request (honouring `X-Forwarded-Proto` and
//!    `X-Forwarded-Host` set by a reverse proxy) joined with the path.
//!
//! Blank strings count as absent everywhere. An empty result means no URL
//! can be derived, which is not an error.

use axum::http::{header, HeaderMap, Uri};

use crate::auth;

pub const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";
pub const FORWARDED_HOST_HEADER: &str = "x-forwarded-host";

const DEFAULT_SCHEME: &str = "http";

/// Configured installer location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallerSource {
    pub url: Option<String>,
    pub server_base_url: Option<String>,
    pub path: Option<String>,
}

impl InstallerSource {
    pub fn new(
        url: Option<String>,
        server_base_url: Option<String>,
        path: Option<String>,
    ) -> Self {
        Self {
            url,
            server_base_url,
            path,
        }
    }

    /// The configured URL, trimmed, if it is absolute.
    pub fn absolute_url(&self) -> Option<&str> {
        non_blank(self.url.as_deref()).filter(|u| is_absolute_url(u))
    }

    pub fn installer_path(&self) -> Option<&str> {
        non_blank(self.path.as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        non_blank(self.server_base_url.as_deref())
    }

    /// Short label for startup logging.
    pub fn mode(&self) -> &'static str {
        match (self.absolute_url(), self.installer_path(), self.base_url()) {
            (Some(_), _, _) => "absolute-url",
            (None, Some(_), Some(_)) => "base-url+path",
            (None, Some(_), None) => "request-host+path",
            (None, None, _) => "unresolvable",
        }
    }
}

/// Per-request inputs, taken from the request head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub forwarded_proto: Option<String>,
    pub forwarded_host: Option<String>,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub api_key: Option<String>,
}

impl RequestContext {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            forwarded_proto: header_str(FORWARDED_PROTO_HEADER),
            forwarded_host: header_str(FORWARDED_HOST_HEADER),
            scheme: uri.scheme_str().map(str::to_string),
            host: header_str(header::HOST.as_str())
                .or_else(|| uri.authority().map(|a| a.to_string())),
            api_key: auth::api_key_from_headers(headers).map(str::to_string),
        }
    }
}

/// Compute the installer URL for one request.
pub fn resolve_installer_url(source: &InstallerSource, ctx: &RequestContext) -> String {
    if let Some(url) = source.absolute_url() {
        return url.to_string();
    }

    let Some(path) = source.installer_path() else {
        return String::new();
    };

    match source.base_url() {
        Some(base) => join_url(base, path),
        None => join_url(&guess_base_url(ctx), path),
    }
}

/// `http://` or `https://` prefix, ignoring case and surrounding whitespace.
pub fn is_absolute_url(url: &str) -> bool {
    let url = url.trim().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

/// Join with exactly one `/`. An empty base yields a root-relative path.
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if base.is_empty() {
        return format!("/{path}");
    }
    format!("{base}/{path}")
}

/// Left-most entry of a comma-separated header value, trimmed.
pub fn first_token(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Public base URL as seen by the client, or empty if the host is unknown.
pub fn guess_base_url(ctx: &RequestContext) -> String {
    let proto = header_token(&ctx.forwarded_proto)
        .or_else(|| header_token(&ctx.scheme))
        .unwrap_or(DEFAULT_SCHEME);

    match header_token(&ctx.forwarded_host).or_else(|| header_token(&ctx.host)) {
        Some(host) => format!("{proto}://{host}"),
        None => String::new(),
    }
}

fn header_token(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(first_token)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
