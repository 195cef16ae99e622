//! Asset lifecycle: UNINITIALIZED → LOADING → READY, with FAILED on error.
//! A failed reinitialization of a READY service keeps it READY.
//!
//! Loads are serialized by `init_lock`. A load builds a complete
//! `LoadedAssets` off to the side and only then publishes it, so readers see
//! either the previous assets or the new ones, never a partial snapshot.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::producer::AssetProducer;
use crate::types::LifecycleState;
use mulehunter_core::{AssetPaths, Error, Result, FEATURE_WIDTH};
use mulehunter_graph::{GraphSnapshot, IdMap};
use mulehunter_model::{MuleSage, NodeClassifier};

/// Everything a scoring call reads. Immutable once published.
pub struct LoadedAssets {
    pub snapshot: GraphSnapshot,
    pub ids: IdMap,
    pub model: Box<dyn NodeClassifier>,
}

impl LoadedAssets {
    pub fn new(snapshot: GraphSnapshot, ids: IdMap, model: impl NodeClassifier + 'static) -> Self {
        Self {
            snapshot,
            ids,
            model: Box::new(model),
        }
    }
}

struct Published {
    state: LifecycleState,
    assets: Option<Arc<LoadedAssets>>,
    generation: u64,
    last_error: Option<String>,
}

/// Owns the published assets and the single initialization critical section.
pub struct LifecycleManager {
    paths: AssetPaths,
    producer: Arc<dyn AssetProducer>,
    published: RwLock<Published>,
    init_lock: Mutex<()>,
}

impl LifecycleManager {
    pub fn new(paths: AssetPaths, producer: Arc<dyn AssetProducer>) -> Self {
        Self {
            paths,
            producer,
            published: RwLock::new(Published {
                state: LifecycleState::Uninitialized,
                assets: None,
                generation: 0,
                last_error: None,
            }),
            init_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.published.read().state
    }

    /// Number of successful publishes.
    pub fn generation(&self) -> u64 {
        self.published.read().generation
    }

    pub fn last_error(&self) -> Option<String> {
        self.published.read().last_error.clone()
    }

    /// State and published assets, read together.
    pub fn current(&self) -> (LifecycleState, Option<Arc<LoadedAssets>>) {
        let published = self.published.read();
        (published.state, published.assets.clone())
    }

    /// Load assets unless already READY. Concurrent callers share one load.
    pub fn ensure_ready(&self) -> Result<Arc<LoadedAssets>> {
        if let Some(assets) = self.ready_assets() {
            return Ok(assets);
        }

        let _guard = self.init_lock.lock();
        if let Some(assets) = self.ready_assets() {
            return Ok(assets);
        }

        self.published.write().state = LifecycleState::Loading;
        self.bootstrap(false)
    }

    /// Regenerate and reload unconditionally.
    ///
    /// While this runs, previously published assets stay visible. If the
    /// service was READY and the reload fails, those assets stay published.
    pub fn force_reinitialize(&self) -> Result<Arc<LoadedAssets>> {
        let _guard = self.init_lock.lock();
        {
            let mut published = self.published.write();
            if published.state != LifecycleState::Ready {
                published.state = LifecycleState::Loading;
            }
        }
        info!("Forced reinitialization requested");
        self.bootstrap(true)
    }

    fn ready_assets(&self) -> Option<Arc<LoadedAssets>> {
        let published = self.published.read();
        match published.state {
            LifecycleState::Ready => published.assets.clone(),
            _ => None,
        }
    }

    /// Caller must hold `init_lock`.
    fn bootstrap(&self, regenerate: bool) -> Result<Arc<LoadedAssets>> {
        match self.build(regenerate) {
            Ok(assets) => {
                let assets = Arc::new(assets);
                let mut published = self.published.write();
                published.state = LifecycleState::Ready;
                published.assets = Some(assets.clone());
                published.generation += 1;
                published.last_error = None;
                info!(
                    "System ready: {} nodes, {} edges, {} mapped accounts (generation {})",
                    assets.snapshot.node_count(),
                    assets.snapshot.edge_count(),
                    assets.ids.len(),
                    published.generation
                );
                Ok(assets)
            }
            Err(e) => {
                let mut published = self.published.write();
                published.last_error = Some(e.to_string());
                if regenerate
                    && published.state == LifecycleState::Ready
                    && published.assets.is_some()
                {
                    warn!(
                        "Reinitialization failed, still serving generation {}: {}",
                        published.generation, e
                    );
                } else {
                    error!("Asset bootstrap failed: {}", e);
                    published.state = LifecycleState::Failed;
                    published.assets = None;
                }
                Err(e)
            }
        }
    }

    fn build(&self, regenerate: bool) -> Result<LoadedAssets> {
        if regenerate || !self.paths.required_present() {
            if !regenerate {
                warn!(
                    "Artifacts missing under {}; running first-time setup",
                    self.paths.root.display()
                );
            }
            self.producer.generate(&self.paths)?;
            self.producer.train(&self.paths)?;
        }

        if !self.paths.model_file.exists() {
            return Err(Error::AssetMissing(self.paths.model_file.display().to_string()));
        }
        let snapshot = GraphSnapshot::load(&self.paths.graph_file)?;
        let model = MuleSage::load(&self.paths.model_file)?;
        if model.in_features() != FEATURE_WIDTH {
            return Err(Error::Model(format!(
                "model expects {} features, snapshot has {}",
                model.in_features(),
                FEATURE_WIDTH
            )));
        }
        let ids = IdMap::load(&self.paths.accounts_file, snapshot.node_count())?;

        Ok(LoadedAssets::new(snapshot, ids, model))
    }
}
