//! Convert connlog-core schema types to Arrow types.
//!
//! This module provides the bridge between connlog-core's engine-agnostic
//! schema types and Arrow's type system used by DataFusion.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use connlog_core::schema::{ConnLogSchema, DataKind, FieldDescriptor};

/// Loader-assigned column holding each record's byte offset in the file.
///
/// Not a conn.log column. It is never null, so it doubles as the count
/// witness, and it orders records in file order.
pub const RECORD_OFFSET_COLUMN: &str = "record_offset";

/// Timezone attached to every timestamp column.
pub const TIMESTAMP_TZ: &str = "UTC";

/// Convert a FieldDescriptor to an Arrow Field.
pub fn to_arrow_field(fd: &FieldDescriptor) -> Field {
    let data_type = to_arrow_type(&fd.kind);
    Field::new(fd.name, data_type, fd.nullable)
}

/// Convert a DataKind to an Arrow DataType.
pub fn to_arrow_type(kind: &DataKind) -> DataType {
    match kind {
        DataKind::UInt16 => DataType::UInt16,
        DataKind::UInt64 => DataType::UInt64,
        DataKind::Float64 => DataType::Float64,
        DataKind::String => DataType::Utf8,
        DataKind::TimestampMicros => {
            DataType::Timestamp(TimeUnit::Microsecond, Some(TIMESTAMP_TZ.into()))
        }
    }
}

/// Convert a slice of FieldDescriptors to Arrow Schema.
pub fn descriptors_to_arrow_schema(descriptors: &[FieldDescriptor]) -> Schema {
    let fields: Vec<Field> = descriptors.iter().map(to_arrow_field).collect();
    Schema::new(fields)
}

/// Schema of a loaded dataset: the retained conn.log columns in declared
/// order, followed by [`RECORD_OFFSET_COLUMN`].
pub fn dataset_schema() -> SchemaRef {
    let mut fields: Vec<Field> = ConnLogSchema.retained().map(to_arrow_field).collect();
    fields.push(Field::new(RECORD_OFFSET_COLUMN, DataType::UInt64, false));
    Arc::new(Schema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_types() {
        assert_eq!(to_arrow_type(&DataKind::UInt16), DataType::UInt16);
        assert_eq!(to_arrow_type(&DataKind::UInt64), DataType::UInt64);
        assert_eq!(to_arrow_type(&DataKind::Float64), DataType::Float64);
        assert_eq!(to_arrow_type(&DataKind::String), DataType::Utf8);
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(
            to_arrow_type(&DataKind::TimestampMicros),
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );
    }

    #[test]
    fn test_field_conversion() {
        let fd = FieldDescriptor::nullable("service", DataKind::String);
        let arrow_field = to_arrow_field(&fd);

        assert_eq!(arrow_field.name(), "service");
        assert_eq!(arrow_field.data_type(), &DataType::Utf8);
        assert!(arrow_field.is_nullable());
    }

    #[test]
    fn test_descriptors_to_schema() {
        let descriptors = vec![
            FieldDescriptor::timestamp("ts"),
            FieldDescriptor::port("id.resp_p"),
            FieldDescriptor::nullable("service", DataKind::String),
        ];

        let schema = descriptors_to_arrow_schema(&descriptors);

        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).name(), "ts");
        assert_eq!(schema.field(1).name(), "id.resp_p");
        assert!(!schema.field(1).is_nullable());
        assert_eq!(schema.field(2).name(), "service");
    }

    #[test]
    fn test_dataset_schema() {
        let schema = dataset_schema();

        assert_eq!(schema.fields().len(), 16);
        assert_eq!(schema.field(0).name(), "ts");
        assert!(matches!(
            schema.field(0).data_type(),
            DataType::Timestamp(TimeUnit::Microsecond, Some(_))
        ));
        assert!(schema.field_with_name("uid").is_err());
        assert!(schema.field_with_name("history").is_err());

        let offset = schema.field(15);
        assert_eq!(offset.name(), RECORD_OFFSET_COLUMN);
        assert_eq!(offset.data_type(), &DataType::UInt64);
        assert!(!offset.is_nullable());
    }
}
