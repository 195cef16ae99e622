//! MuleHunter Runtime — asset lifecycle, scoring engine, verdict policy.
//!
//! `RiskService` is the single context object the HTTP layer holds. It owns
//! the `LifecycleManager` (which publishes immutable `LoadedAssets`) and
//! turns a validated transaction into a `RiskResponse`.

pub mod lifecycle;
pub mod producer;
pub mod scoring;
pub mod service;
pub mod types;
pub mod verdict;

pub use lifecycle::{LifecycleManager, LoadedAssets};
pub use producer::{AssetProducer, CommandProducer, UnconfiguredProducer};
pub use scoring::ScoringEngine;
pub use service::RiskService;
pub use types::*;
pub use verdict::VerdictPolicy;
