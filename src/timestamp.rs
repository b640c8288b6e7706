//! Conversion between RFC3339 text and UTC epoch seconds.
//!
//! Input must be RFC3339; offsets are folded into UTC and sub-second
//! precision is dropped. Output is always `YYYY-MM-DDTHH:MM:SSZ`.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::CodecError;

/// Parses `value` into epoch seconds. `field` names the location for errors.
pub fn to_epoch(value: &str, field: &str) -> Result<i64, CodecError> {
    if value.is_empty() {
        return Err(CodecError::missing(field));
    }

    OffsetDateTime::parse(value, &Rfc3339)
        .map(OffsetDateTime::unix_timestamp)
        .map_err(|_| CodecError::malformed_timestamp(field, value))
}

/// `None` passes through; used for the open end of a session.
pub fn to_epoch_opt(value: Option<&str>, field: &str) -> Result<Option<i64>, CodecError> {
    value.map(|value| to_epoch(value, field)).transpose()
}

/// Formats `epoch` in canonical form. Epochs outside the representable
/// calendar range are reported as malformed.
pub fn to_text(epoch: i64, field: &str) -> Result<String, CodecError> {
    let canonical = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    OffsetDateTime::from_unix_timestamp(epoch)
        .ok()
        .and_then(|instant| instant.to_offset(UtcOffset::UTC).format(&canonical).ok())
        .ok_or_else(|| CodecError::malformed_timestamp(field, epoch.to_string()))
}

pub fn to_text_opt(epoch: Option<i64>, field: &str) -> Result<Option<String>, CodecError> {
    epoch.map(|epoch| to_text(epoch, field)).transpose()
}

/// Re-renders `value` in canonical form.
pub fn canonicalize(value: &str, field: &str) -> Result<String, CodecError> {
    to_text(to_epoch(value, field)?, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_text_round_trips() {
        let epoch = to_epoch("2025-01-15T10:30:00Z", "created").expect("valid timestamp");
        assert_eq!(epoch, 1_736_937_000);
        assert_eq!(
            to_text(epoch, "created").expect("in range"),
            "2025-01-15T10:30:00Z"
        );
    }

    #[test]
    fn offsets_fold_into_utc() {
        let epoch = to_epoch("2025-01-15T12:30:00+02:00", "start").expect("valid timestamp");
        assert_eq!(
            to_text(epoch, "start").expect("in range"),
            "2025-01-15T10:30:00Z"
        );
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(
            canonicalize("2025-01-15T10:30:00.987654Z", "start").expect("valid timestamp"),
            "2025-01-15T10:30:00Z"
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("1999-12-31T23:59:59-05:00", "start").expect("valid");
        let twice = canonicalize(&once, "start").expect("canonical form parses");
        assert_eq!(once, twice);
    }

    #[test]
    fn other_formats_are_rejected() {
        for value in ["2025-01-15 10:30:00", "2025-01-15", "1736937000", "yesterday"] {
            let error = to_epoch(value, "sessions[0].start").expect_err("not RFC3339");
            assert!(matches!(error, CodecError::MalformedTimestamp { .. }), "{value}");
        }
    }

    #[test]
    fn empty_text_is_missing() {
        assert_eq!(to_epoch("", "created"), Err(CodecError::missing("created")));
    }

    #[test]
    fn absent_values_pass_through() {
        assert_eq!(to_epoch_opt(None, "end"), Ok(None));
        assert_eq!(to_text_opt(None, "end"), Ok(None));
    }

    #[test]
    fn out_of_range_epoch_is_rejected() {
        assert!(matches!(
            to_text(i64::MAX, "meta.c"),
            Err(CodecError::MalformedTimestamp { .. })
        ));
    }
}
