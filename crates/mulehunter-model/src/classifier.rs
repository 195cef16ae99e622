//! Node classifier trait and output normalisation.

use ndarray::{Array2, ArrayView2, Axis};

use mulehunter_core::Result;

/// A graph classifier producing per-node class log-probabilities.
///
/// Implementations are immutable after load and safe to share across
/// concurrent requests.
pub trait NodeClassifier: Send + Sync {
    /// Score every node of the graph given by `x` and the parallel edge
    /// arrays. Returns an `(N, classes)` matrix of log-probabilities.
    fn forward(&self, x: ArrayView2<'_, f32>, sources: &[usize], targets: &[usize]) -> Result<Array2<f32>>;

    /// Feature width the classifier was trained on.
    fn in_features(&self) -> usize;

    /// Number of output classes.
    fn num_classes(&self) -> usize;

    /// Version tag reported alongside scores.
    fn version(&self) -> &str;
}

/// Row-wise log-softmax, shifted by the row maximum before exponentiating.
pub fn log_softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
    let mut out = logits.clone();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let sum: f32 = row.iter().map(|&z| (z - max).exp()).sum();
        let log_norm = max + sum.ln();
        row.mapv_inplace(|z| z - log_norm);
    }
    out
}
