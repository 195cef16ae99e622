//! MuleHunter Core — configuration, artifact paths, error type.

pub mod config;
pub mod error;

pub use config::{AssetPaths, InductivePolicy, MuleHunterConfig, NotifyConfig, VerdictThresholds};
pub use error::{Error, Result};

/// Model version tag reported in every risk response.
pub const MODEL_VERSION: &str = "MuleSAGE-5Feat";

/// Number of per-account features the classifier was trained on.
pub const FEATURE_WIDTH: usize = 5;
