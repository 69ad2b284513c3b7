//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// Most naming variants resolve to a single column; a few to two or three.
pub type SmallVec2<T> = SmallVec<[T; 2]>;

/// Per-line candidate lists.
pub type SmallVec4<T> = SmallVec<[T; 4]>;
