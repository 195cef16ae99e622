//! Shared application state.

use mulehunter_core::MuleHunterConfig;
use mulehunter_runtime::RiskService;

use crate::notify::ScoreNotifier;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: MuleHunterConfig,
    pub service: RiskService,
    pub notifier: Option<ScoreNotifier>,
}

impl AppState {
    pub fn new(config: MuleHunterConfig, service: RiskService) -> Self {
        let notifier = ScoreNotifier::from_config(&config.notify);
        Self {
            config,
            service,
            notifier,
        }
    }
}
