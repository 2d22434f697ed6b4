//! Header model: tagged-field records, the reference/read-group-indexed
//! collection, and cross-record identity (spec.md §3, §4.5 — component C5).

pub mod collection;
pub mod readgroup;
pub mod record;
pub mod refseq;
pub mod registry;

pub use collection::{Collection, ADD_ALL, ADD_HEADER, ADD_REFNAME, ADD_REFSEQ};
pub use readgroup::ReadGroup;
pub use record::{FieldValue, Header};
pub use refseq::RefSequence;
