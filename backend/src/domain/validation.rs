//! Mapping from aggregate validation failures to request errors.

use serde_json::json;

use super::Error;

/// A validation failure tied to a single request field.
pub trait FieldViolation: std::fmt::Display {
    /// Wire name of the offending field.
    fn field(&self) -> &'static str;

    /// Machine-readable reason, e.g. `too_long`.
    fn reason(&self) -> &'static str;
}

/// Convert a field violation into an `invalid_request` error whose details
/// name the field and the reason.
pub fn invalid_field<V: FieldViolation>(violation: &V) -> Error {
    Error::invalid_request(violation.to_string()).with_details(json!({
        "field": violation.field(),
        "code": violation.reason(),
    }))
}
