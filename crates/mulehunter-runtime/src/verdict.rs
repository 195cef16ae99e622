//! Verdict policy: probability → label, plus auxiliary UI fields.

use crate::lifecycle::LoadedAssets;
use crate::types::{RiskResponse, Verdict};
use mulehunter_core::VerdictThresholds;
use mulehunter_graph::{AugmentedGraph, Transaction};

/// Linked accounts shown per response.
const MAX_LINKED: usize = 3;

/// Baseline subtracted from the risk score for the unsupervised indicator.
const UNSUPERVISED_BASELINE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct VerdictPolicy {
    thresholds: VerdictThresholds,
}

impl VerdictPolicy {
    pub fn new(thresholds: VerdictThresholds) -> Self {
        Self { thresholds }
    }

    pub fn verdict(&self, p: f64) -> Verdict {
        if p > self.thresholds.critical {
            Verdict::Critical
        } else if p >= self.thresholds.suspicious {
            Verdict::Suspicious
        } else {
            Verdict::Safe
        }
    }

    pub fn flagged(&self, p: f64) -> bool {
        p > self.thresholds.flag
    }

    /// Up to three accounts the source already sends to, per the snapshot.
    /// The transaction's own edge is not consulted.
    pub fn linked_accounts(&self, assets: &LoadedAssets, source: usize) -> Vec<String> {
        assets
            .snapshot
            .edges()
            .successors(source)
            .take(MAX_LINKED)
            .map(|t| format!("Acct_{}", assets.ids.external_id(t).unwrap_or("?")))
            .collect()
    }

    pub fn respond(
        &self,
        tx: &Transaction,
        assets: &LoadedAssets,
        view: &AugmentedGraph,
        p: f64,
    ) -> RiskResponse {
        // Label the reported score, so a response never shows 0.85 next to CRITICAL.
        let risk_score = round_to(p, 4);
        RiskResponse {
            node_id: tx.source_id.clone(),
            risk_score,
            verdict: self.verdict(risk_score),
            model_version: assets.model.version().to_string(),
            out_degree: view.source_out_degree(),
            linked_accounts: self.linked_accounts(assets, view.source_index()),
            population_size: view.node_count(),
            risk_ratio: round_to(f64::from(view.source_features().in_out_ratio), 2),
            ja3_detected: self.flagged(risk_score),
            unsupervised_score: round_to((p - UNSUPERVISED_BASELINE).abs(), 4),
            source_cold_start: view.source_cold_start(),
            target_cold_start: view.target_cold_start(),
        }
    }
}

impl Default for VerdictPolicy {
    fn default() -> Self {
        Self::new(VerdictThresholds::default())
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
