//! GraphSAGE layers and the two-layer MuleSAGE network.

use std::path::Path;

use ndarray::{Array1, Array2, ArrayView2};
use tracing::info;

use crate::classifier::{log_softmax_rows, NodeClassifier};
use crate::weights::StateDict;
use mulehunter_core::{Error, Result, MODEL_VERSION};

/// One mean-aggregation SAGE layer:
/// `h_i = W_l · mean_{j→i} x_j + b_l + W_r · x_i`.
#[derive(Debug, Clone)]
pub struct SageConv {
    lin_l_weight: Array2<f32>,
    lin_l_bias: Array1<f32>,
    lin_r_weight: Array2<f32>,
}

impl SageConv {
    pub fn new(
        lin_l_weight: Array2<f32>,
        lin_l_bias: Array1<f32>,
        lin_r_weight: Array2<f32>,
    ) -> Result<Self> {
        if lin_l_weight.dim() != lin_r_weight.dim() {
            return Err(Error::Model(format!(
                "lin_l weight {:?} and lin_r weight {:?} differ in shape",
                lin_l_weight.dim(),
                lin_r_weight.dim()
            )));
        }
        if lin_l_bias.len() != lin_l_weight.nrows() {
            return Err(Error::Model(format!(
                "bias has {} entries for {} outputs",
                lin_l_bias.len(),
                lin_l_weight.nrows()
            )));
        }
        Ok(Self {
            lin_l_weight,
            lin_l_bias,
            lin_r_weight,
        })
    }

    fn from_state(dict: &StateDict, prefix: &str) -> Result<Self> {
        Self::new(
            dict.matrix(&format!("{}.lin_l.weight", prefix))?,
            dict.vector(&format!("{}.lin_l.bias", prefix))?,
            dict.matrix(&format!("{}.lin_r.weight", prefix))?,
        )
        .map_err(|e| Error::Model(format!("{}: {}", prefix, e)))
    }

    fn write_state(&self, dict: &mut StateDict, prefix: &str) {
        dict.insert_matrix(&format!("{}.lin_l.weight", prefix), &self.lin_l_weight);
        dict.insert_vector(&format!("{}.lin_l.bias", prefix), &self.lin_l_bias);
        dict.insert_matrix(&format!("{}.lin_r.weight", prefix), &self.lin_r_weight);
    }

    pub fn in_features(&self) -> usize {
        self.lin_l_weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.lin_l_weight.nrows()
    }

    /// Messages flow along edges, so node `i` aggregates over `j` with `j→i`.
    pub fn forward(
        &self,
        x: ArrayView2<'_, f32>,
        sources: &[usize],
        targets: &[usize],
    ) -> Result<Array2<f32>> {
        let n = x.nrows();
        if x.ncols() != self.in_features() {
            return Err(Error::Inference(format!(
                "layer expects {} features, got {}",
                self.in_features(),
                x.ncols()
            )));
        }

        let mut agg = Array2::<f32>::zeros((n, self.in_features()));
        let mut counts = vec![0u32; n];
        for (&s, &t) in sources.iter().zip(targets) {
            if s >= n || t >= n {
                return Err(Error::Inference(format!(
                    "edge ({}, {}) out of range for {} nodes",
                    s, t, n
                )));
            }
            let mut row = agg.row_mut(t);
            row += &x.row(s);
            counts[t] += 1;
        }
        for (mut row, &c) in agg.rows_mut().into_iter().zip(&counts) {
            if c > 0 {
                row /= c as f32;
            }
        }

        Ok(agg.dot(&self.lin_l_weight.t()) + &self.lin_l_bias + x.dot(&self.lin_r_weight.t()))
    }
}

/// Two-hop classifier: SAGE → ReLU → SAGE → log-softmax.
#[derive(Debug, Clone)]
pub struct MuleSage {
    conv1: SageConv,
    conv2: SageConv,
    version: String,
}

impl MuleSage {
    pub fn new(conv1: SageConv, conv2: SageConv) -> Result<Self> {
        if conv1.out_features() != conv2.in_features() {
            return Err(Error::Model(format!(
                "conv1 produces {} channels but conv2 expects {}",
                conv1.out_features(),
                conv2.in_features()
            )));
        }
        if conv2.out_features() != 2 {
            return Err(Error::Model(format!(
                "expected 2 output classes, found {}",
                conv2.out_features()
            )));
        }
        Ok(Self {
            conv1,
            conv2,
            version: MODEL_VERSION.to_string(),
        })
    }

    pub fn from_state_dict(dict: &StateDict) -> Result<Self> {
        Self::new(
            SageConv::from_state(dict, "conv1")?,
            SageConv::from_state(dict, "conv2")?,
        )
    }

    /// Load trained weights from a state dictionary file.
    pub fn load(path: &Path) -> Result<Self> {
        let model = Self::from_state_dict(&StateDict::load(path)?)?;
        info!(
            "MuleSAGE loaded: in={}, hidden={}, out={}, path={}",
            model.conv1.in_features(),
            model.conv1.out_features(),
            model.conv2.out_features(),
            path.display()
        );
        Ok(model)
    }

    pub fn to_state_dict(&self) -> StateDict {
        let mut dict = StateDict::default();
        self.conv1.write_state(&mut dict, "conv1");
        self.conv2.write_state(&mut dict, "conv2");
        dict
    }

    pub fn hidden_features(&self) -> usize {
        self.conv1.out_features()
    }
}

impl NodeClassifier for MuleSage {
    fn forward(&self, x: ArrayView2<'_, f32>, sources: &[usize], targets: &[usize]) -> Result<Array2<f32>> {
        let mut h = self.conv1.forward(x, sources, targets)?;
        h.mapv_inplace(|v| v.max(0.0));
        let logits = self.conv2.forward(h.view(), sources, targets)?;
        if logits.iter().any(|v| !v.is_finite()) {
            return Err(Error::Inference("classifier produced non-finite logits".into()));
        }
        Ok(log_softmax_rows(&logits))
    }

    fn in_features(&self) -> usize {
        self.conv1.in_features()
    }

    fn num_classes(&self) -> usize {
        self.conv2.out_features()
    }

    fn version(&self) -> &str {
        &self.version
    }
}
