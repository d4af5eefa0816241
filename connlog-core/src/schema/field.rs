//! Field descriptor for the conn.log schema.

use super::DataKind;

/// Engine-agnostic field definition.
///
/// Describes one positional column of the log: its name, the kind its raw
/// text is coerced to, whether the `-` placeholder is allowed, and whether
/// the loader keeps the column at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as Zeek writes it (e.g., "id.orig_h")
    pub name: &'static str,

    /// Data type
    pub kind: DataKind,

    /// Whether the field can be NULL (the `-` placeholder)
    pub nullable: bool,

    /// Whether the column is projected away during loading
    pub dropped: bool,

    /// Optional description for documentation
    pub description: Option<&'static str>,
}

impl FieldDescriptor {
    /// Create a new non-nullable field.
    pub const fn new(name: &'static str, kind: DataKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            dropped: false,
            description: None,
        }
    }

    /// Create a new nullable field.
    pub const fn nullable(name: &'static str, kind: DataKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
            dropped: false,
            description: None,
        }
    }

    /// Add a description to the field.
    pub const fn with_description(mut self, desc: &'static str) -> Self {
        self.description = Some(desc);
        self
    }

    /// Builder: mark the column as not needed for analysis.
    pub const fn drop_on_load(mut self) -> Self {
        self.dropped = true;
        self
    }

    /// Whether the column survives loading.
    pub const fn is_retained(&self) -> bool {
        !self.dropped
    }
}

/// Helpers for common field patterns.
impl FieldDescriptor {
    /// Connection start time, epoch seconds on the wire.
    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, DataKind::TimestampMicros)
            .with_description("Connection start time (UTC)")
    }

    /// Host address field (kept as its textual form).
    pub const fn host(name: &'static str) -> Self {
        Self::new(name, DataKind::String)
    }

    /// Port field.
    pub const fn port(name: &'static str) -> Self {
        Self::new(name, DataKind::UInt16)
    }

    /// Optional byte or packet counter.
    pub const fn counter(name: &'static str) -> Self {
        Self::nullable(name, DataKind::UInt64)
    }
}
