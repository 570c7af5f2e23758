//! Header propagation rules.
//!
//! Headers live in [`HeaderMap`], an ordered multimap with case-insensitive
//! names. A [`HeaderFilter`] is a deny-list over it: everything passes
//! except the listed names, and every value of a listed name is dropped.

use axum::http::header::{self, HeaderMap, HeaderName};

#[derive(Debug, Clone)]
pub struct HeaderFilter {
    deny: Vec<HeaderName>,
}

impl HeaderFilter {
    pub fn deny<I>(names: I) -> Self
    where
        I: IntoIterator<Item = HeaderName>,
    {
        Self {
            deny: names.into_iter().collect(),
        }
    }

    /// Inbound headers to copy onto the outbound request. `Host` is left for
    /// the client to recompute from the target authority.
    pub fn outbound_request() -> Self {
        Self::deny([header::HOST])
    }

    /// Backend headers to relay to the caller. The transport recomputes
    /// framing, so a stale `Content-Length` must not survive.
    pub fn relayed_response() -> Self {
        Self::deny([header::CONTENT_LENGTH])
    }

    pub fn is_denied(&self, name: &HeaderName) -> bool {
        self.deny.contains(name)
    }

    /// Copy `headers`, keeping order and repeated values, minus denied names.
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        let mut out = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            if !self.is_denied(name) {
                out.append(name.clone(), value.clone());
            }
        }
        out
    }

    /// Remove denied names from `headers` in place.
    pub fn strip(&self, headers: &mut HeaderMap) {
        for name in &self.deny {
            headers.remove(name);
        }
    }
}
