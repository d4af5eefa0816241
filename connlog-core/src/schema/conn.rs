//! The fixed Zeek `conn.log` column layout.

use super::{DataKind, FieldDescriptor};

/// Name of the connection start time column.
pub const TS_COLUMN: &str = "ts";

/// Placeholder Zeek writes for an unset field.
pub const UNSET_PLACEHOLDER: &str = "-";

/// Number of tab-separated fields in every record.
pub const CONN_FIELD_COUNT: usize = 21;

/// All 21 conn.log columns in positional order.
pub const CONN_FIELDS: [FieldDescriptor; CONN_FIELD_COUNT] = [
    FieldDescriptor::timestamp(TS_COLUMN),
    FieldDescriptor::new("uid", DataKind::String)
        .drop_on_load()
        .with_description("Unique connection identifier"),
    FieldDescriptor::host("id.orig_h").with_description("Originator address"),
    FieldDescriptor::port("id.orig_p").with_description("Originator port"),
    FieldDescriptor::host("id.resp_h").with_description("Responder address"),
    FieldDescriptor::port("id.resp_p").with_description("Responder port"),
    FieldDescriptor::new("proto", DataKind::String).with_description("Transport protocol"),
    FieldDescriptor::nullable("service", DataKind::String)
        .with_description("Detected application protocol"),
    FieldDescriptor::nullable("duration", DataKind::Float64)
        .with_description("Connection duration in seconds"),
    FieldDescriptor::counter("orig_bytes"),
    FieldDescriptor::counter("resp_bytes"),
    FieldDescriptor::nullable("conn_state", DataKind::String)
        .with_description("Connection state code (S0, SF, REJ, ...)"),
    FieldDescriptor::counter("missed_bytes").drop_on_load(),
    FieldDescriptor::nullable("history", DataKind::String).drop_on_load(),
    FieldDescriptor::counter("orig_pkts"),
    FieldDescriptor::counter("orig_ip_bytes"),
    FieldDescriptor::counter("resp_pkts"),
    FieldDescriptor::counter("resp_ip_bytes"),
    FieldDescriptor::nullable("unknown1", DataKind::String).drop_on_load(),
    FieldDescriptor::nullable("unknown2", DataKind::String).drop_on_load(),
    FieldDescriptor::nullable("unknown3", DataKind::String).drop_on_load(),
];

/// Accessors over [`CONN_FIELDS`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnLogSchema;

impl ConnLogSchema {
    /// Every declared column, dropped ones included.
    pub fn fields(&self) -> &'static [FieldDescriptor] {
        &CONN_FIELDS
    }

    /// Columns kept after loading, in declared order.
    pub fn retained(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        CONN_FIELDS.iter().filter(|f| f.is_retained())
    }

    /// Columns projected away during loading.
    pub fn dropped(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        CONN_FIELDS.iter().filter(|f| f.dropped)
    }

    /// Names of the retained columns.
    pub fn retained_names(&self) -> Vec<&'static str> {
        self.retained().map(|f| f.name).collect()
    }

    /// Look up a declared column by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        CONN_FIELDS.iter().find(|f| f.name == name)
    }

    /// Whether `name` survives loading.
    pub fn is_retained(&self, name: &str) -> bool {
        self.field(name).is_some_and(|f| f.is_retained())
    }
}
