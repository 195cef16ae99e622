//! Scoring engine: one forward pass over the augmented graph.

use mulehunter_core::{Error, Result};
use mulehunter_graph::AugmentedGraph;
use mulehunter_model::NodeClassifier;

/// Column of the fraud class in the classifier output.
pub const FRAUD_CLASS: usize = 1;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Fraud probability of the transaction's source node.
    ///
    /// Every node is scored by the batched forward pass; only the source row
    /// is kept.
    pub fn fraud_probability(model: &dyn NodeClassifier, view: &AugmentedGraph) -> Result<f64> {
        let features = view.features();
        if features.ncols() != model.in_features() {
            return Err(Error::Inference(format!(
                "graph has {} features per node, model expects {}",
                features.ncols(),
                model.in_features()
            )));
        }

        let log_probs = model.forward(features, view.edges().sources(), view.edges().targets())?;
        let log_p = log_probs
            .get([view.source_index(), FRAUD_CLASS])
            .copied()
            .ok_or_else(|| {
                Error::Inference(format!(
                    "no output for node {} (shape {:?})",
                    view.source_index(),
                    log_probs.dim()
                ))
            })?;

        let p = f64::from(log_p).exp();
        if !p.is_finite() {
            return Err(Error::Inference(format!("non-finite probability {}", p)));
        }
        Ok(p.clamp(0.0, 1.0))
    }
}
