//! Augmented interval tree (component C6, spec.md §4.6) and the
//! per-sequence-name multimap built on top of it.

mod multimap;
mod node;
mod region;
mod tree;

pub use multimap::IntervalMultimap;
pub use node::Interval;
pub use region::SeqRegion;
pub use tree::{IntersectingIter, IntervalTree};
