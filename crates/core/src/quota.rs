//! Trial-quota arithmetic and client identification.
//!
//! The usage counter itself lives in the database; this module holds
//! the pure check against the configured limit and the derivation of a
//! client identifier from request metadata. The check-then-increment
//! sequence is not atomic across concurrent requests from one client;
//! slight over-quota under races is accepted.

use crate::error::CoreError;

/// Reject the request when `used` has reached the configured `limit`.
pub fn check_quota(used: i64, limit: i64) -> Result<(), CoreError> {
    if used >= limit {
        Err(CoreError::QuotaExceeded { used, limit })
    } else {
        Ok(())
    }
}

/// Derive the quota key for a request.
///
/// The first comma-separated entry of a forwarded-for header wins when
/// present and non-blank; otherwise the direct peer address. Never
/// panics and never returns a missing value, falling back to an empty
/// string sentinel.
pub fn client_identifier(forwarded_for: Option<&str>, peer_addr: Option<&str>) -> String {
    if let Some(header) = forwarded_for {
        let first = header.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    peer_addr.unwrap_or("").to_string()
}
