//! Post-login redirect targets.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Everything but unreserved characters and `/` is escaped in `next`.
const NEXT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The login page, asking to come back to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!("/login?next={}", utf8_percent_encode(next, NEXT))
}

/// `next` if it points back into this site, otherwise `/`.
pub fn safe_next(next: Option<&str>) -> String {
    next.filter(|n| is_local(n))
        .map(str::to_string)
        .unwrap_or_else(|| "/".to_string())
}

fn is_local(next: &str) -> bool {
    if !next.starts_with('/') || next.starts_with("//") || next.starts_with("/\\") {
        return false;
    }
    if next.chars().any(|c| c.is_control()) {
        return false;
    }
    // Absolute URLs parse on their own; relative ones must stay on the base host.
    if Url::parse(next).is_ok() {
        return false;
    }
    match Url::parse("http://quill.invalid/").and_then(|base| base.join(next)) {
        Ok(joined) => joined.host_str() == Some("quill.invalid"),
        Err(_) => false,
    }
}
