//! Engine-agnostic data type definitions.

/// Data types a conn.log field can be coerced to.
///
/// These map to:
/// - Arrow: `DataType::*`
/// - Rust: the matching [`FieldValue`](crate::record::FieldValue) variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// Unsigned 16-bit integer (ports, ICMP type/code)
    UInt16,

    /// Unsigned 64-bit integer (byte and packet counters)
    UInt64,

    /// 64-bit floating point (durations in seconds)
    Float64,

    /// UTF-8 string
    String,

    /// Timestamp with microsecond precision (UTC), parsed from epoch seconds
    TimestampMicros,
}

impl DataKind {
    /// Human-readable type name for display.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataKind::UInt16 => "u16",
            DataKind::UInt64 => "u64",
            DataKind::Float64 => "f64",
            DataKind::String => "string",
            DataKind::TimestampMicros => "timestamp",
        }
    }

    /// Size in bytes for fixed-width types, None for variable-width.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            DataKind::UInt16 => Some(2),
            DataKind::UInt64 => Some(8),
            DataKind::Float64 => Some(8),
            DataKind::TimestampMicros => Some(8),
            DataKind::String => None,
        }
    }

    /// Whether values of this kind are numeric on the wire.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataKind::String)
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}
