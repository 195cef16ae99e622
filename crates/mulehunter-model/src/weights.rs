//! Flat state dictionary: parameter name → tensor.
//!
//! Keys follow the trained module's parameter names, e.g.
//! `conv1.lin_l.weight`. Matrices are row-major `[out][in]`.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use mulehunter_core::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Tensor {
    Matrix(Vec<Vec<f32>>),
    Vector(Vec<f32>),
}

/// Parameter tensors as persisted by the offline trainer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDict {
    tensors: BTreeMap<String, Tensor>,
}

impl StateDict {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::AssetMissing(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn insert_matrix(&mut self, key: &str, m: &Array2<f32>) {
        let rows = m.rows().into_iter().map(|r| r.to_vec()).collect();
        self.tensors.insert(key.to_string(), Tensor::Matrix(rows));
    }

    pub fn insert_vector(&mut self, key: &str, v: &Array1<f32>) {
        self.tensors.insert(key.to_string(), Tensor::Vector(v.to_vec()));
    }

    pub fn matrix(&self, key: &str) -> Result<Array2<f32>> {
        match self.tensors.get(key) {
            Some(Tensor::Matrix(rows)) => {
                let cols = rows.first().map(Vec::len).unwrap_or(0);
                if rows.iter().any(|r| r.len() != cols) {
                    return Err(Error::Model(format!("{} has ragged rows", key)));
                }
                let flat: Vec<f32> = rows.iter().flatten().copied().collect();
                Array2::from_shape_vec((rows.len(), cols), flat)
                    .map_err(|e| Error::Model(format!("{}: {}", key, e)))
            }
            Some(Tensor::Vector(_)) => Err(Error::Model(format!("{} is not a matrix", key))),
            None => Err(Error::Model(format!("missing parameter {}", key))),
        }
    }

    pub fn vector(&self, key: &str) -> Result<Array1<f32>> {
        match self.tensors.get(key) {
            Some(Tensor::Vector(v)) => Ok(Array1::from(v.clone())),
            Some(Tensor::Matrix(_)) => Err(Error::Model(format!("{} is not a vector", key))),
            None => Err(Error::Model(format!("missing parameter {}", key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_parses_trainer_layout() {
        let dict: StateDict = serde_json::from_str(
            r#"{"conv1.lin_l.weight": [[1.0, 2.0], [3.0, 4.0]], "conv1.lin_l.bias": [0.5, -0.5]}"#,
        )
        .unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.matrix("conv1.lin_l.weight").unwrap(), array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(dict.vector("conv1.lin_l.bias").unwrap(), array![0.5, -0.5]);
    }

    #[test]
    fn test_kind_and_presence_errors() {
        let mut dict = StateDict::default();
        dict.insert_vector("b", &array![1.0]);
        assert!(matches!(dict.matrix("b"), Err(Error::Model(_))));
        assert!(matches!(dict.vector("missing"), Err(Error::Model(_))));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let dict: StateDict =
            serde_json::from_str(r#"{"w": [[1.0, 2.0], [3.0]]}"#).unwrap();
        assert!(matches!(dict.matrix("w"), Err(Error::Model(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = StateDict::load(&dir.path().join("mule_model.json")).unwrap_err();
        assert!(matches!(err, Error::AssetMissing(_)));
    }
}
