//! Shared on-disk fixtures: three accounts A, B, C with edges A→B and A→C,
//! and a classifier whose fraud logit for a node is `2 * in_out_ratio - 2.5`.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::time::Duration;

use ndarray::{array, Array1, Array2};

use mulehunter_core::{AssetPaths, Error, MuleHunterConfig, Result};
use mulehunter_graph::{EdgeIndex, GraphSnapshot};
use mulehunter_model::{MuleSage, SageConv};
use mulehunter_runtime::AssetProducer;

pub fn write_snapshot(paths: &AssetPaths) {
    let snapshot = GraphSnapshot::new(
        array![
            [100.0, 2000.0, 1.0, 0.1, 5.0],
            [200.0, 3000.0, 0.5, 0.2, 7.0],
            [300.0, 4000.0, 2.0, 0.3, 9.0],
        ],
        EdgeIndex::from_pairs(&[(0, 1), (0, 2)]),
        Some(vec![0, 0, 1]),
    )
    .unwrap();
    snapshot.save(&paths.graph_file).unwrap();
    std::fs::write(
        &paths.accounts_file,
        "node_id,account_age_days,balance,in_out_ratio,pagerank,tx_velocity,is_fraud\n\
         A,100,2000.0,1.0,0.1,5,0\n\
         B,200,3000.0,0.5,0.2,7,0\n\
         C,300,4000.0,2.0,0.3,9,1\n",
    )
    .unwrap();
}

pub fn ratio_model() -> MuleSage {
    let mut pick_ratio = Array2::<f32>::zeros((2, 5));
    pick_ratio[[0, 2]] = 1.0;
    let conv1 = SageConv::new(Array2::zeros((2, 5)), Array1::zeros(2), pick_ratio).unwrap();
    let conv2 = SageConv::new(
        Array2::zeros((2, 2)),
        array![0.0, -2.5],
        array![[0.0, 0.0], [2.0, 0.0]],
    )
    .unwrap();
    MuleSage::new(conv1, conv2).unwrap()
}

/// Fraud logit is `2 * mean(in_out_ratio of in-neighbours) - 2.5`; a node's
/// own features are ignored.
pub fn neighbour_model() -> MuleSage {
    let mut pick_ratio = Array2::<f32>::zeros((2, 5));
    pick_ratio[[0, 2]] = 1.0;
    let conv1 = SageConv::new(pick_ratio, Array1::zeros(2), Array2::zeros((2, 5))).unwrap();
    let conv2 = SageConv::new(
        Array2::zeros((2, 2)),
        array![0.0, -2.5],
        array![[0.0, 0.0], [2.0, 0.0]],
    )
    .unwrap();
    MuleSage::new(conv1, conv2).unwrap()
}

pub fn write_model(paths: &AssetPaths) {
    ratio_model().to_state_dict().save(&paths.model_file).unwrap();
}

pub fn write_all(paths: &AssetPaths) {
    write_snapshot(paths);
    write_model(paths);
}

pub fn config(dir: &Path) -> MuleHunterConfig {
    MuleHunterConfig::from_lookup(dir, |_| None).unwrap()
}

/// Writes the fixtures and counts how often each stage ran.
#[derive(Default)]
pub struct CountingProducer {
    pub generated: AtomicUsize,
    pub trained: AtomicUsize,
}

impl CountingProducer {
    pub fn generated(&self) -> usize {
        self.generated.load(Ordering::SeqCst)
    }

    pub fn trained(&self) -> usize {
        self.trained.load(Ordering::SeqCst)
    }
}

impl AssetProducer for CountingProducer {
    fn generate(&self, paths: &AssetPaths) -> Result<()> {
        self.generated.fetch_add(1, Ordering::SeqCst);
        // Widen the window in which concurrent callers pile up on the lock.
        std::thread::sleep(Duration::from_millis(50));
        write_snapshot(paths);
        Ok(())
    }

    fn train(&self, paths: &AssetPaths) -> Result<()> {
        self.trained.fetch_add(1, Ordering::SeqCst);
        write_model(paths);
        Ok(())
    }
}

/// Fails every generation attempt and counts them.
#[derive(Default)]
pub struct FailingProducer {
    pub attempts: AtomicUsize,
}

impl AssetProducer for FailingProducer {
    fn generate(&self, _paths: &AssetPaths) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(Error::Producer("generator crashed".into()))
    }

    fn train(&self, _paths: &AssetPaths) -> Result<()> {
        Err(Error::Producer("trainer should not run".into()))
    }
}

/// Holds generation open until the test lets it finish.
pub struct GatedProducer {
    pub entered: Barrier,
    pub release: Barrier,
}

impl Default for GatedProducer {
    fn default() -> Self {
        Self {
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }
}

impl AssetProducer for GatedProducer {
    fn generate(&self, paths: &AssetPaths) -> Result<()> {
        self.entered.wait();
        self.release.wait();
        write_snapshot(paths);
        Ok(())
    }

    fn train(&self, paths: &AssetPaths) -> Result<()> {
        write_model(paths);
        Ok(())
    }
}
