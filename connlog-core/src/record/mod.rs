//! Record parsing.
//!
//! A conn.log record is one line of exactly 21 tab-separated fields. Parsing
//! validates the field count, coerces every retained field to its declared
//! [`DataKind`](crate::schema::DataKind) and skips the content of dropped
//! fields entirely.

mod parse;
mod value;

pub use parse::{coerce_field, parse_epoch_micros, parse_record};
pub use value::FieldValue;
