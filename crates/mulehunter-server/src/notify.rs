//! Downstream score notification.
//!
//! One POST per scored transaction, on a detached task, bounded by the
//! configured timeout. Failures are logged and dropped.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use mulehunter_core::NotifyConfig;
use mulehunter_runtime::RiskResponse;

const SCORES_PATH: &str = "/backend/api/visual/anomaly-scores/batch";

pub struct ScoreNotifier {
    client: Client,
    endpoint: String,
}

impl ScoreNotifier {
    /// `None` when no backend URL is configured.
    pub fn from_config(config: &NotifyConfig) -> Option<Self> {
        let base = config.backend_url.as_ref()?;
        match Client::builder().timeout(config.timeout).build() {
            Ok(client) => Some(Self {
                client,
                endpoint: format!("{}{}", base, SCORES_PATH),
            }),
            Err(e) => {
                warn!("Score notifier disabled: {}", e);
                None
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fire and forget. Must be called from within a Tokio runtime.
    pub fn notify(&self, response: &RiskResponse) {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let payload = payload(response);
        let node_id = response.node_id.clone();

        tokio::spawn(async move {
            match client.post(&endpoint).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(node_id = %node_id, "Risk score posted to backend");
                }
                Ok(resp) => {
                    warn!(node_id = %node_id, status = %resp.status(), "Backend rejected risk score");
                }
                Err(e) => {
                    warn!(node_id = %node_id, error = %e, "Risk score post failed");
                }
            }
        });
    }
}

/// Body accepted by the backend's batch score endpoint.
pub fn payload(response: &RiskResponse) -> Value {
    let node_id = response
        .node_id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(response.node_id.clone()));

    serde_json::json!([{
        "nodeId": node_id,
        "anomalyScore": response.risk_score,
        "verdict": response.verdict,
        "model": response.model_version,
        "source": "ai-engine",
        "scoredAt": chrono::Utc::now().to_rfc3339(),
    }])
}
