//! Transport failure taxonomy.
//!
//! Everything that can go wrong between "target URL computed" and "response
//! body fully buffered" ends up as a [`TransportFailure`]. Application-level
//! errors returned by the backend (any status code) are not failures.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ConnectionRefused,
    Timeout,
    ResolutionFailure,
    MalformedResponse,
    /// The target could not be turned into a request URI. No connection is
    /// attempted.
    InvalidTarget,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ConnectionRefused => "connection_refused",
            FailureKind::Timeout => "timeout",
            FailureKind::ResolutionFailure => "resolution_failure",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::InvalidTarget => "invalid_target",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed outbound call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} calling {url}: {detail}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    /// Human-readable cause, including the underlying error chain.
    pub detail: String,
    /// Target URL that was attempted, without the query string.
    pub url: String,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            url: url.into(),
        }
    }

    pub fn timeout(after: Duration, url: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Timeout,
            format!("request timed out after {}ms", after.as_millis()),
            url,
        )
    }

    /// Failure from the HTTP client while sending or awaiting response headers.
    pub fn from_client(err: &hyper_util::client::legacy::Error, url: impl Into<String>) -> Self {
        Self::new(classify(err, err.is_connect()), describe(err), url)
    }

    /// Failure while buffering the response body.
    pub fn from_body(err: &hyper::Error, url: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, describe(err), url)
    }
}

/// Classify an error by its source chain.
pub fn classify(err: &(dyn StdError + 'static), is_connect: bool) -> FailureKind {
    let mut dns = false;
    for cause in chain(err) {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return FailureKind::ConnectionRefused,
                io::ErrorKind::TimedOut => return FailureKind::Timeout,
                _ => {}
            }
        }
        // hyper-util 0.1 wraps resolver failures in a `ConnectError` whose
        // message is exactly "dns error"; the type itself is not exported.
        if cause.to_string().starts_with("dns error") {
            dns = true;
        }
    }

    if dns {
        FailureKind::ResolutionFailure
    } else if is_connect {
        FailureKind::ConnectionRefused
    } else {
        FailureKind::MalformedResponse
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    for cause in chain(err) {
        let text = cause.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
    }
    parts.join(": ")
}

fn chain<'a>(err: &'a (dyn StdError + 'static)) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}
