//! Schema-driven parsing of tab-separated conn.log lines.

use crate::error::RecordError;
use crate::schema::{DataKind, FieldDescriptor, CONN_FIELDS, CONN_FIELD_COUNT, UNSET_PLACEHOLDER};

use super::FieldValue;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Split `line` on tabs, validate it against [`CONN_FIELDS`] and push one
/// value per retained column into `out`.
///
/// `out` is cleared first so a single buffer can be reused for every line of
/// a partition. The field count is checked before any value is coerced, so a
/// short or long row is always reported as a schema mismatch rather than as
/// whatever misaligned value happens to fail first.
pub fn parse_record<'a>(
    line: &'a str,
    line_number: u64,
    out: &mut Vec<FieldValue<'a>>,
) -> Result<(), RecordError> {
    out.clear();

    let mut raw = [""; CONN_FIELD_COUNT];
    let mut actual = 0usize;
    for field in line.split('\t') {
        if actual < CONN_FIELD_COUNT {
            raw[actual] = field;
        }
        actual += 1;
    }

    if actual != CONN_FIELD_COUNT {
        return Err(RecordError::SchemaMismatch {
            line: line_number,
            expected: CONN_FIELD_COUNT,
            actual,
        });
    }

    for (descriptor, text) in CONN_FIELDS.iter().zip(raw) {
        if descriptor.dropped {
            continue;
        }
        out.push(coerce_field(descriptor, text, line_number)?);
    }

    Ok(())
}

/// Coerce the raw text of one field to its declared kind.
pub fn coerce_field<'a>(
    descriptor: &FieldDescriptor,
    text: &'a str,
    line_number: u64,
) -> Result<FieldValue<'a>, RecordError> {
    if text == UNSET_PLACEHOLDER && descriptor.nullable {
        return Ok(FieldValue::Null);
    }

    let value = match descriptor.kind {
        DataKind::String if text != UNSET_PLACEHOLDER => Some(FieldValue::Str(text)),
        DataKind::String => None,
        DataKind::UInt16 => text.parse::<u16>().ok().map(FieldValue::UInt16),
        DataKind::UInt64 => text.parse::<u64>().ok().map(FieldValue::UInt64),
        DataKind::Float64 => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(FieldValue::Float64),
        DataKind::TimestampMicros => parse_epoch_micros(text).map(FieldValue::TimestampMicros),
    };

    value.ok_or_else(|| RecordError::InvalidValue {
        line: line_number,
        field: descriptor.name,
        kind: descriptor.kind,
        value: text.to_string(),
    })
}

/// Convert decimal epoch seconds (`1331901000.123456`) to microseconds.
///
/// Parsing is exact: the integer and fractional parts are handled as digit
/// strings, never through `f64`. Fractional digits beyond microsecond
/// precision are truncated toward zero. Returns `None` for anything that is
/// not an optionally signed decimal number, or on overflow.
pub fn parse_epoch_micros(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let seconds: i64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };

    let mut micros = 0i64;
    let mut scale = MICROS_PER_SECOND / 10;
    for digit in frac_part.bytes().take(6) {
        micros += i64::from(digit - b'0') * scale;
        scale /= 10;
    }

    let total = seconds.checked_mul(MICROS_PER_SECOND)?.checked_add(micros)?;
    Some(if negative { -total } else { total })
}
