//! Binary BAM encoding (spec.md §4.9, component C9): BGZF-framed binary
//! records whose block layout is byte-identical to each alignment's
//! in-memory block.

pub mod decode;
pub mod encode;
pub mod headerblock;

pub use decode::decode_record;
pub use encode::encode_record;
pub use headerblock::{decode_header, encode_header};
