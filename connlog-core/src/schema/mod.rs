//! Engine-agnostic schema types.
//!
//! This module describes the conn.log layout without depending on any
//! specific columnar engine (Arrow, DataFusion, etc.).
//!
//! # Example
//!
//! ```rust
//! use connlog_core::schema::{ConnLogSchema, DataKind};
//!
//! let schema = ConnLogSchema;
//! assert_eq!(schema.fields().len(), 21);
//! assert_eq!(schema.field("id.resp_p").unwrap().kind, DataKind::UInt16);
//! assert!(!schema.is_retained("uid"));
//! ```

mod conn;
mod field;
mod kind;

pub use conn::{ConnLogSchema, CONN_FIELDS, CONN_FIELD_COUNT, TS_COLUMN, UNSET_PLACEHOLDER};
pub use field::FieldDescriptor;
pub use kind::DataKind;
