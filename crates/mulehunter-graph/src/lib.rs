//! MuleHunter Graph — account graph snapshot, id map, inductive augmentation.
//!
//! The snapshot is immutable once loaded. Every transaction is scored against
//! an `AugmentedGraph`, a private copy produced by `GraphSnapshot::augment`.

pub mod augment;
pub mod id_map;
pub mod snapshot;
pub mod types;

pub use augment::AugmentedGraph;
pub use id_map::IdMap;
pub use snapshot::{EdgeIndex, GraphSnapshot};
pub use types::*;
