//! Runtime types.

use serde::{Deserialize, Serialize};

/// Asset lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "UNINITIALIZED"),
            Self::Loading => write!(f, "LOADING"),
            Self::Ready => write!(f, "READY"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Discrete risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "SUSPICIOUS")]
    Suspicious,
    #[serde(rename = "CRITICAL (MULE)")]
    Critical,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Suspicious => write!(f, "SUSPICIOUS"),
            Self::Critical => write!(f, "CRITICAL (MULE)"),
        }
    }
}

/// Scoring result for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResponse {
    pub node_id: String,
    /// Fraud-class probability of the source, rounded to 4 decimals.
    pub risk_score: f64,
    pub verdict: Verdict,
    pub model_version: String,
    pub out_degree: usize,
    pub linked_accounts: Vec<String>,
    pub population_size: usize,
    /// Source in/out ratio after the transaction's effect, 2 decimals.
    pub risk_ratio: f64,
    pub ja3_detected: bool,
    pub unsupervised_score: f64,
    pub source_cold_start: bool,
    pub target_cold_start: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Unavailable,
}

/// Service health derived from lifecycle state and snapshot size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub model_loaded: bool,
    pub nodes_count: usize,
    pub version: String,
    pub state: LifecycleState,
    /// Number of successful asset publishes since process start.
    pub generation: u64,
}
