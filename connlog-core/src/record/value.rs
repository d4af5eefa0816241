//! Typed field values for parsed log records.
//!
//! Values borrow string data from the mapped log file wherever possible;
//! only the consumer that builds columns copies it.

/// Possible field value types (maps to Arrow types).
///
/// The lifetime parameter `'data` ties the value to the log buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'data> {
    /// Unsigned 16-bit integer
    UInt16(u16),
    /// Unsigned 64-bit integer
    UInt64(u64),
    /// 64-bit floating point
    Float64(f64),
    /// Microseconds since the Unix epoch (UTC)
    TimestampMicros(i64),
    /// Zero-copy string reference into the log buffer
    Str(&'data str),
    /// The `-` placeholder on a nullable field
    Null,
}

impl<'data> FieldValue<'data> {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::UInt16(v) => Some(*v as u64),
            FieldValue::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&'data str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as epoch microseconds.
    pub fn as_timestamp_micros(&self) -> Option<i64> {
        match self {
            FieldValue::TimestampMicros(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::UInt16(80).as_u64(), Some(80));
        assert_eq!(FieldValue::UInt64(1 << 40).as_u64(), Some(1 << 40));
        assert_eq!(FieldValue::Str("tcp").as_str(), Some("tcp"));
        assert_eq!(FieldValue::TimestampMicros(5).as_timestamp_micros(), Some(5));
        assert_eq!(FieldValue::Str("tcp").as_u64(), None);
        assert!(FieldValue::Null.is_null());
        assert!(!FieldValue::Float64(0.5).is_null());
    }
}
