//! Data models for the dictionary aggregation service

pub mod aggregate;
pub mod record;
pub mod source;

pub use aggregate::AggregateResult;
pub use record::CanonicalRecord;
pub use source::{parse_source_list, SourceId, UnknownSource};
