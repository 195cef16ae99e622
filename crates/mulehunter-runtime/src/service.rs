//! Risk service: the one context object request handlers talk to.

use std::sync::Arc;

use tracing::info;

use crate::lifecycle::{LifecycleManager, LoadedAssets};
use crate::producer::{self, AssetProducer};
use crate::scoring::ScoringEngine;
use crate::types::{HealthReport, HealthStatus, LifecycleState, RiskResponse};
use crate::verdict::VerdictPolicy;
use mulehunter_core::{Error, InductivePolicy, MuleHunterConfig, Result, MODEL_VERSION};
use mulehunter_graph::Transaction;

pub struct RiskService {
    lifecycle: LifecycleManager,
    policy: VerdictPolicy,
    inductive: InductivePolicy,
}

impl RiskService {
    pub fn new(config: &MuleHunterConfig, producer: Arc<dyn AssetProducer>) -> Self {
        Self {
            lifecycle: LifecycleManager::new(config.asset_paths.clone(), producer),
            policy: VerdictPolicy::new(config.thresholds),
            inductive: config.inductive.clone(),
        }
    }

    /// Build with the producer named by the configuration.
    pub fn from_config(config: &MuleHunterConfig) -> Self {
        Self::new(config, Arc::from(producer::from_config(config)))
    }

    pub fn lifecycle(&self) -> &LifecycleManager {
        &self.lifecycle
    }

    pub fn ensure_ready(&self) -> Result<()> {
        self.lifecycle.ensure_ready().map(|_| ())
    }

    /// Regenerate and reload; returns the new population size.
    pub fn force_reinitialize(&self) -> Result<usize> {
        self.lifecycle
            .force_reinitialize()
            .map(|assets| assets.snapshot.node_count())
    }

    /// Score one validated transaction.
    pub fn score(&self, tx: &Transaction) -> Result<RiskResponse> {
        let assets = self.assets_for_scoring()?;

        let view = assets.snapshot.augment(&assets.ids, tx, &self.inductive);
        let p = ScoringEngine::fraud_probability(assets.model.as_ref(), &view)?;
        let response = self.policy.respond(tx, &assets, &view, p);

        info!(
            source = %tx.source_id,
            target = %tx.target_id,
            amount = tx.amount,
            timestamp = tx.timestamp.as_deref().unwrap_or("-"),
            risk_score = response.risk_score,
            verdict = %response.verdict,
            cold_start = response.source_cold_start,
            "Transaction scored"
        );
        Ok(response)
    }

    fn assets_for_scoring(&self) -> Result<Arc<LoadedAssets>> {
        match self.lifecycle.current() {
            (_, Some(assets)) => Ok(assets),
            (LifecycleState::Uninitialized, None) => self
                .lifecycle
                .ensure_ready()
                .map_err(|e| Error::NotReady(e.to_string())),
            (LifecycleState::Loading, None) => {
                Err(Error::NotReady("assets are still loading".into()))
            }
            (state, None) => Err(Error::NotReady(format!(
                "model is not initialized (state {}): {}",
                state,
                self.lifecycle
                    .last_error()
                    .unwrap_or_else(|| "no assets published".into())
            ))),
        }
    }

    pub fn health(&self) -> HealthReport {
        let (state, assets) = self.lifecycle.current();
        let (status, nodes_count) = match assets {
            Some(ref a) => (HealthStatus::Healthy, a.snapshot.node_count()),
            None => (HealthStatus::Unavailable, 0),
        };
        HealthReport {
            status,
            model_loaded: assets.is_some(),
            nodes_count,
            version: MODEL_VERSION.to_string(),
            state,
            generation: self.lifecycle.generation(),
        }
    }
}
