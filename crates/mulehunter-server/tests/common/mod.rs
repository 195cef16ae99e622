#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use ndarray::{array, Array1, Array2};

use mulehunter_core::{AssetPaths, MuleHunterConfig};
use mulehunter_graph::{EdgeIndex, GraphSnapshot};
use mulehunter_model::{MuleSage, SageConv};
use mulehunter_runtime::{RiskService, UnconfiguredProducer};
use mulehunter_server::AppState;

/// Accounts 1, 2, 3 with edges 1→2 and 1→3; fraud logit is `2 * ratio - 2.5`.
pub fn write_assets(paths: &AssetPaths) {
    GraphSnapshot::new(
        array![
            [100.0, 2000.0, 1.0, 0.1, 5.0],
            [200.0, 3000.0, 0.5, 0.2, 7.0],
            [300.0, 4000.0, 2.0, 0.3, 9.0],
        ],
        EdgeIndex::from_pairs(&[(0, 1), (0, 2)]),
        None,
    )
    .unwrap()
    .save(&paths.graph_file)
    .unwrap();
    std::fs::write(&paths.accounts_file, "node_id\n1\n2\n3\n").unwrap();

    let mut pick_ratio = Array2::<f32>::zeros((2, 5));
    pick_ratio[[0, 2]] = 1.0;
    let model = MuleSage::new(
        SageConv::new(Array2::zeros((2, 5)), Array1::zeros(2), pick_ratio).unwrap(),
        SageConv::new(
            Array2::zeros((2, 2)),
            array![0.0, -2.5],
            array![[0.0, 0.0], [2.0, 0.0]],
        )
        .unwrap(),
    )
    .unwrap();
    model.to_state_dict().save(&paths.model_file).unwrap();
}

pub fn state(dir: &Path, with_assets: bool) -> Arc<AppState> {
    let config = MuleHunterConfig::from_lookup(dir, |_| None).unwrap();
    if with_assets {
        write_assets(&config.asset_paths);
    }
    let service = RiskService::new(&config, Arc::new(UnconfiguredProducer));
    Arc::new(AppState::new(config, service))
}
