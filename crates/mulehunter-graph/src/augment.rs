//! Request-scoped inductive augmentation.
//!
//! A transaction may reference accounts the snapshot has never seen. Those
//! get cold-start rows appended to a private copy of the feature matrix; the
//! transaction edge is appended to a private copy of the edge index. The
//! snapshot and id map are only ever read.

use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::id_map::IdMap;
use crate::snapshot::{row_array, EdgeIndex, GraphSnapshot};
use crate::types::{NodeFeatures, Transaction};
use mulehunter_core::{InductivePolicy, FEATURE_WIDTH};

/// Self-contained graph for scoring a single transaction.
#[derive(Debug, Clone)]
pub struct AugmentedGraph {
    features: Array2<f32>,
    edges: EdgeIndex,
    known_nodes: usize,
    source: usize,
    target: usize,
}

impl AugmentedGraph {
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.features.nrows()
    }

    pub fn source_index(&self) -> usize {
        self.source
    }

    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn source_cold_start(&self) -> bool {
        self.source >= self.known_nodes
    }

    pub fn target_cold_start(&self) -> bool {
        self.target >= self.known_nodes
    }

    /// Features of the source as they will be seen by the classifier.
    pub fn source_features(&self) -> NodeFeatures {
        NodeFeatures::from_row(row_array(self.features.row(self.source)))
    }

    /// Out-degree of the source including the transaction edge.
    pub fn source_out_degree(&self) -> usize {
        self.edges.out_degree(self.source)
    }
}

impl GraphSnapshot {
    /// Produce the augmented view for `tx`. Always returns a fresh copy.
    pub fn augment(&self, ids: &IdMap, tx: &Transaction, policy: &InductivePolicy) -> AugmentedGraph {
        let known = self.node_count();
        let mut cold_rows = 0usize;
        let mut resolve = |id: &str| match ids.index_of(id) {
            Some(index) => index,
            None => {
                cold_rows += 1;
                known + cold_rows - 1
            }
        };

        let source = resolve(&tx.source_id);
        // Textually identical ids share one slot, even when both are unknown.
        let target = if tx.target_id == tx.source_id {
            source
        } else {
            resolve(&tx.target_id)
        };

        let mut features = Array2::zeros((known + cold_rows, FEATURE_WIDTH));
        features.slice_mut(s![..known, ..]).assign(&self.features());
        for mut row in features.rows_mut().into_iter().skip(known) {
            row.assign(&ndarray::aview1(&policy.cold_start));
        }

        if source < known {
            let mut profile = NodeFeatures::from_row(row_array(features.row(source)));
            profile.tx_velocity += policy.velocity_increment;
            if tx.amount > policy.large_amount {
                profile.in_out_ratio += policy.ratio_boost;
            }
            features
                .row_mut(source)
                .assign(&ndarray::aview1(&profile.to_row()));
        }

        let mut edges = self.edges().clone();
        edges.push(source, target);

        debug!(
            source = %tx.source_id,
            target = %tx.target_id,
            source_index = source,
            target_index = target,
            cold_rows,
            "Augmented graph built"
        );

        AugmentedGraph {
            features,
            edges,
            known_nodes: known,
            source,
            target,
        }
    }
}
