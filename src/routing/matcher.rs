//! Route matching logic.
//!
//! # Responsibilities
//! - Strip the routing prefix from the request path
//! - Split the remainder into service name and sub-path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - The service segment is percent-decoded before lookup; the sub-path is
//!   left raw so encoding reaches the backend untouched
//! - No regex; a single pass over the path

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Result of matching a request path under the routing prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// Logical service name, the first segment after the prefix, decoded.
    pub service: Cow<'a, str>,
    /// Everything after the service segment, without the leading `/`.
    /// May be empty and may contain further `/`.
    pub sub_path: &'a str,
}

/// Match `path` against `/<prefix>/<service>[/<sub_path>]`.
///
/// Returns `None` when the path is outside the prefix, names no service, or
/// the service segment does not decode to UTF-8.
pub fn match_route<'a>(path: &'a str, prefix: &str) -> Option<RouteMatch<'a>> {
    let rest = path.strip_prefix('/')?.strip_prefix(prefix)?.strip_prefix('/')?;

    let (service, sub_path) = match rest.split_once('/') {
        Some((service, sub_path)) => (service, sub_path),
        None => (rest, ""),
    };

    if service.is_empty() {
        return None;
    }
    let service = percent_decode_str(service).decode_utf8().ok()?;

    Some(RouteMatch { service, sub_path })
}
