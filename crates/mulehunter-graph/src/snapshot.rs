//! Persisted account graph: feature matrix, edge index, optional labels.
//!
//! The on-disk layout mirrors the training pipeline's graph object:
//! `{"x": [[f32; 5]], "edge_index": [[src], [dst]], "y": [u8]?}`.

use std::path::Path;

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::NodeFeatures;
use mulehunter_core::{Error, Result, FEATURE_WIDTH};

/// Directed edges stored as parallel source/target arrays. Duplicates allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeIndex {
    sources: Vec<usize>,
    targets: Vec<usize>,
}

impl EdgeIndex {
    pub fn new(sources: Vec<usize>, targets: Vec<usize>) -> Result<Self> {
        if sources.len() != targets.len() {
            return Err(Error::Snapshot(format!(
                "edge_index rows differ in length: {} sources, {} targets",
                sources.len(),
                targets.len()
            )));
        }
        Ok(Self { sources, targets })
    }

    pub fn from_pairs(pairs: &[(usize, usize)]) -> Self {
        Self {
            sources: pairs.iter().map(|&(s, _)| s).collect(),
            targets: pairs.iter().map(|&(_, t)| t).collect(),
        }
    }

    pub(crate) fn push(&mut self, source: usize, target: usize) {
        self.sources.push(source);
        self.targets.push(target);
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Number of edges leaving `node`.
    pub fn out_degree(&self, node: usize) -> usize {
        self.sources.iter().filter(|&&s| s == node).count()
    }

    /// Targets of edges leaving `node`, in edge order.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.sources
            .iter()
            .zip(self.targets.iter())
            .filter(move |(&s, _)| s == node)
            .map(|(_, &t)| t)
    }

    fn max_index(&self) -> Option<usize> {
        self.sources.iter().chain(self.targets.iter()).copied().max()
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    x: Vec<Vec<f32>>,
    edge_index: [Vec<usize>; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<Vec<u8>>,
}

/// Immutable snapshot of the account graph.
///
/// There is no way to mutate a snapshot after construction; request-scoped
/// changes go through [`GraphSnapshot::augment`], which returns a new value.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    features: Array2<f32>,
    edges: EdgeIndex,
    labels: Option<Vec<u8>>,
}

impl GraphSnapshot {
    /// Build a snapshot, checking widths and edge bounds.
    pub fn new(features: Array2<f32>, edges: EdgeIndex, labels: Option<Vec<u8>>) -> Result<Self> {
        if features.ncols() != FEATURE_WIDTH {
            return Err(Error::Snapshot(format!(
                "feature matrix has {} columns, expected {}",
                features.ncols(),
                FEATURE_WIDTH
            )));
        }
        let nodes = features.nrows();
        if let Some(max) = edges.max_index() {
            if max >= nodes {
                return Err(Error::Snapshot(format!(
                    "edge references node {} but only {} nodes exist",
                    max, nodes
                )));
            }
        }
        if let Some(ref y) = labels {
            if y.len() != nodes {
                return Err(Error::Snapshot(format!(
                    "label vector has {} entries for {} nodes",
                    y.len(),
                    nodes
                )));
            }
        }
        Ok(Self {
            features,
            edges,
            labels,
        })
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::AssetMissing(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        let file: SnapshotFile = serde_json::from_slice(&data)?;

        let rows = file.x.len();
        let mut flat = Vec::with_capacity(rows * FEATURE_WIDTH);
        for (i, row) in file.x.into_iter().enumerate() {
            if row.len() != FEATURE_WIDTH {
                return Err(Error::Snapshot(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    FEATURE_WIDTH
                )));
            }
            flat.extend(row);
        }
        let features = Array2::from_shape_vec((rows, FEATURE_WIDTH), flat)
            .map_err(|e| Error::Snapshot(e.to_string()))?;

        let [sources, targets] = file.edge_index;
        let snapshot = Self::new(features, EdgeIndex::new(sources, targets)?, file.y)?;

        info!(
            "Graph snapshot loaded: {} nodes, {} edges, labels={}, path={}",
            snapshot.node_count(),
            snapshot.edge_count(),
            snapshot.labels.is_some(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Write the snapshot in the same layout `load` reads.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = SnapshotFile {
            x: self.features.rows().into_iter().map(|r| r.to_vec()).collect(),
            edge_index: [self.edges.sources.clone(), self.edges.targets.clone()],
            y: self.labels.clone(),
        };
        std::fs::write(path, serde_json::to_vec(&file)?)?;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.features.nrows()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn edges(&self) -> &EdgeIndex {
        &self.edges
    }

    pub fn labels(&self) -> Option<&[u8]> {
        self.labels.as_deref()
    }

    /// Typed feature record for a known node.
    pub fn node_features(&self, node: usize) -> Option<NodeFeatures> {
        (node < self.node_count()).then(|| NodeFeatures::from_row(row_array(self.features.row(node))))
    }
}

pub(crate) fn row_array(row: ArrayView1<'_, f32>) -> [f32; FEATURE_WIDTH] {
    std::array::from_fn(|k| row[k])
}
