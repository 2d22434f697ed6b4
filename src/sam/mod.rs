//! Plain-text SAM encoding (spec.md §4.8, component C8): one alignment
//! record per tab-delimited line, resolved against a header [`Collection`]
//! for reference-sequence name lookups.

pub mod format;
pub mod parse;

pub use format::format_record;
pub use parse::{parse_fields, parse_record};
