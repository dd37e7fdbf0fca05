//! Shared validation helpers for inbound HTTP adapters.

use chrono::NaiveDate;
use pagination::{Cursor, PageParams, PageParamsError};
use serde::de::DeserializeOwned;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidDate,
    InvalidCursor,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::InvalidCursor => "invalid_cursor",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn invalid_date_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a YYYY-MM-DD date"))
        .with_value(ErrorCode::InvalidDate, value)
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid_date_error(field, value))
}

pub(crate) fn parse_optional_date(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

/// Decode the optional opaque cursor into a keyset position.
pub(crate) fn decode_cursor<K: DeserializeOwned>(params: &PageParams) -> Result<Option<K>, Error> {
    params
        .cursor
        .as_deref()
        .map(|raw| {
            Cursor::<K>::decode(raw).map(Cursor::into_key).map_err(|err| {
                ValidationError::new("cursor", format!("cursor is invalid: {err}"))
                    .with_value(ErrorCode::InvalidCursor, raw)
            })
        })
        .transpose()
}

/// Resolve the effective page size.
pub(crate) fn page_limit(params: &PageParams) -> Result<usize, Error> {
    params.limit().map_err(|err| match err {
        PageParamsError::LimitOutOfRange { requested, .. } => {
            ValidationError::new("limit", err.to_string())
                .with_value(ErrorCode::OutOfRange, requested.to_string())
        }
    })
}

/// Encode the next keyset position, if any, as an opaque cursor.
pub(crate) fn encode_cursor<K: serde::Serialize>(key: Option<K>) -> Result<Option<String>, Error> {
    key.map(|key| {
        Cursor::new(key)
            .encode()
            .map_err(|err| Error::internal(format!("failed to encode cursor: {err}")))
    })
    .transpose()
}
