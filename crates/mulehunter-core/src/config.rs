//! Configuration and artifact path management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::FEATURE_WIDTH;

/// Paths to the persisted artifacts consumed by the scoring core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Shared data directory (e.g., `shared-data/`).
    pub root: PathBuf,
    /// Graph snapshot: feature matrix, edge index, labels.
    pub graph_file: PathBuf,
    /// Trained classifier state dictionary.
    pub model_file: PathBuf,
    /// Optional account table (`node_id` column in row order).
    pub accounts_file: PathBuf,
}

impl AssetPaths {
    /// Create asset paths from a root directory. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            graph_file: root.join("processed_graph.json"),
            model_file: root.join("mule_model.json"),
            accounts_file: root.join("nodes.csv"),
            root,
        })
    }

    /// Whether the snapshot and weights both exist. The account table is optional.
    pub fn required_present(&self) -> bool {
        self.graph_file.exists() && self.model_file.exists()
    }
}

/// Probability boundaries for the verdict policy.
///
/// `p > critical` is CRITICAL, `suspicious <= p <= critical` is SUSPICIOUS,
/// anything below `suspicious` is SAFE. `flag` drives the auxiliary
/// `ja3_detected` field (`p > flag`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictThresholds {
    pub critical: f64,
    pub suspicious: f64,
    pub flag: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            critical: 0.85,
            suspicious: 0.5,
            flag: 0.75,
        }
    }
}

impl VerdictThresholds {
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !in_unit(self.critical) || !in_unit(self.suspicious) || !in_unit(self.flag) {
            return Err(Error::Config(format!(
                "verdict thresholds must lie in [0, 1]: {:?}",
                self
            )));
        }
        if self.suspicious > self.critical {
            return Err(Error::Config(format!(
                "suspicious threshold {} exceeds critical threshold {}",
                self.suspicious, self.critical
            )));
        }
        Ok(())
    }
}

/// Constants governing how a transaction reshapes the graph for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InductivePolicy {
    /// Feature row used for accounts absent from the snapshot.
    pub cold_start: [f32; FEATURE_WIDTH],
    /// Amounts strictly above this boost the source's in/out ratio.
    pub large_amount: f64,
    /// Added to the in/out ratio for large transfers.
    pub ratio_boost: f32,
    /// Added to the transaction velocity of a known source.
    pub velocity_increment: f32,
}

impl Default for InductivePolicy {
    fn default() -> Self {
        Self {
            // age, balance, in/out ratio, pagerank, velocity
            cold_start: [30.0, 5000.0, 1.0, 0.0001, 1.0],
            large_amount: 10_000.0,
            ratio_boost: 0.5,
            velocity_increment: 1.0,
        }
    }
}

/// Downstream score notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Backend base URL; notification is disabled when unset.
    pub backend_url: Option<String>,
    pub timeout: Duration,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Top-level MuleHunter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuleHunterConfig {
    /// HTTP server port.
    pub port: u16,
    pub asset_paths: AssetPaths,
    pub thresholds: VerdictThresholds,
    pub inductive: InductivePolicy,
    /// External generator command line (whitespace separated).
    pub generator_cmd: Option<Vec<String>>,
    /// External trainer command line (whitespace separated).
    pub trainer_cmd: Option<Vec<String>>,
    pub notify: NotifyConfig,
}

impl MuleHunterConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_var(&lookup, "PORT")?.unwrap_or(8001);

        let defaults = VerdictThresholds::default();
        let thresholds = VerdictThresholds {
            critical: parse_var(&lookup, "MULEHUNTER_CRITICAL_THRESHOLD")?
                .unwrap_or(defaults.critical),
            suspicious: parse_var(&lookup, "MULEHUNTER_SUSPICIOUS_THRESHOLD")?
                .unwrap_or(defaults.suspicious),
            flag: parse_var(&lookup, "MULEHUNTER_FLAG_THRESHOLD")?.unwrap_or(defaults.flag),
        };
        thresholds.validate()?;

        let timeout_secs: u64 = parse_var(&lookup, "MULEHUNTER_NOTIFY_TIMEOUT_SECS")?.unwrap_or(5);
        let notify = NotifyConfig {
            backend_url: lookup("MULEHUNTER_BACKEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            port,
            asset_paths: AssetPaths::new(data_dir)?,
            thresholds,
            inductive: InductivePolicy::default(),
            generator_cmd: command_line(lookup("MULEHUNTER_GENERATOR_CMD")),
            trainer_cmd: command_line(lookup("MULEHUNTER_TRAINER_CMD")),
            notify,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw))),
        None => Ok(None),
    }
}

fn command_line(raw: Option<String>) -> Option<Vec<String>> {
    let parts: Vec<String> = raw?.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}
