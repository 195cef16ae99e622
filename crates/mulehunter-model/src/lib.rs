//! MuleHunter Model — the trained neighbour-aggregation classifier.
//!
//! `MuleSage` is a two-layer GraphSAGE network (mean aggregation, ReLU
//! between layers, log-softmax output) loaded from a flat state dictionary.
//! Scoring code talks to it through the `NodeClassifier` trait.

pub mod classifier;
pub mod sage;
pub mod weights;

pub use classifier::{log_softmax_rows, NodeClassifier};
pub use sage::{MuleSage, SageConv};
pub use weights::StateDict;
