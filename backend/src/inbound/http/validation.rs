//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose `details` carry the
//! offending `field` and a stable `code`, so clients can highlight the input.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, UnknownLabelError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidDate,
    UnknownValue,
    OutOfRange,
    TooLong,
    Empty,
    InvalidFormat,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidTimestamp => "invalid_timestamp",
            Self::InvalidDate => "invalid_date",
            Self::UnknownValue => "unknown_value",
            Self::OutOfRange => "out_of_range",
            Self::TooLong => "too_long",
            Self::Empty => "empty",
            Self::InvalidFormat => "invalid_format",
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

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Invalid-request error naming the field and failure code.
pub(crate) fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn field_value_error(field: FieldName, code: ErrorCode, message: String, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidUuid,
            format!("{} must be a valid UUID", field.as_str()),
            value,
        )
    })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|timestamp| timestamp.with_timezone(&Utc))
                .map_err(|_| {
                    field_value_error(
                        field,
                        ErrorCode::InvalidTimestamp,
                        format!("{} must be an RFC 3339 timestamp", field.as_str()),
                        raw,
                    )
                })
        })
        .transpose()
}

pub(crate) fn parse_date(value: &str, field: FieldName) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        field_value_error(
            field,
            ErrorCode::InvalidDate,
            format!("{} must be a YYYY-MM-DD date", field.as_str()),
            value,
        )
    })
}

/// Parse a closed vocabulary value such as a goal category.
pub(crate) fn parse_label<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownLabelError>,
{
    value.parse::<T>().map_err(|err| {
        field_value_error(field, ErrorCode::UnknownValue, err.to_string(), err.value())
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::GoalCategory;

    const FIELD: FieldName = FieldName::new("category");

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    fn unknown_label_reports_field_and_value() {
        let err = parse_label::<GoalCategory>("hobby", FIELD).expect_err("unknown label");
        assert_eq!(detail(&err, "field"), Some("category"));
        assert_eq!(detail(&err, "value"), Some("hobby"));
        assert_eq!(detail(&err, "code"), Some("unknown_value"));
    }

    #[rstest]
    #[case("2024-02-30")]
    #[case("30/01/2024")]
    fn invalid_dates_are_rejected(#[case] raw: &str) {
        let err = parse_date(raw, FieldName::new("targetDate")).expect_err("bad date");
        assert_eq!(detail(&err, "code"), Some("invalid_date"));
    }

    #[rstest]
    fn absent_timestamp_is_none() {
        let parsed = parse_optional_rfc3339_timestamp(None, FieldName::new("recordedAt"))
            .expect("absent is fine");
        assert!(parsed.is_none());
    }

    #[rstest]
    fn offset_timestamps_are_normalised_to_utc() {
        let parsed = parse_optional_rfc3339_timestamp(
            Some("2024-03-01T10:00:00+02:00"),
            FieldName::new("recordedAt"),
        )
        .expect("valid timestamp")
        .expect("present");
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }

    #[rstest]
    fn bad_uuid_is_rejected() {
        let err = parse_uuid("nope", FieldName::new("id")).expect_err("bad uuid");
        assert_eq!(detail(&err, "code"), Some("invalid_uuid"));
    }
}
