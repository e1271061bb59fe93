//! Header and key constants for request correlation.

/// Response header carrying the control-plane's request-correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Key under which normalization merges the correlation id into
/// produced mappings.
pub const REQUEST_ID_KEY: &str = "request_id";
