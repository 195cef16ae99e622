//! Transaction and feature record types.

use serde::{Deserialize, Deserializer, Serialize};

use mulehunter_core::{Error, Result, FEATURE_WIDTH};

/// Transaction as it arrives at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(deserialize_with = "account_id")]
    pub source_id: String,
    #[serde(deserialize_with = "account_id")]
    pub target_id: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TransactionRequest {
    /// Validate once at the boundary; the core only ever sees `Transaction`.
    pub fn validate(self) -> Result<Transaction> {
        let source_id = self.source_id.trim().to_string();
        let target_id = self.target_id.trim().to_string();
        if source_id.is_empty() {
            return Err(Error::Validation("source_id must not be empty".into()));
        }
        if target_id.is_empty() {
            return Err(Error::Validation("target_id must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::Validation(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(Transaction {
            source_id,
            target_id,
            amount: self.amount,
            timestamp: self.timestamp,
        })
    }
}

/// A validated transaction. Consumed once per scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub source_id: String,
    pub target_id: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Transaction {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, amount: f64) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            amount,
            timestamp: None,
        }
    }
}

/// Accepts both `"42"` and `42` for account ids.
fn account_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Typed view of one feature row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    pub account_age_days: f32,
    pub balance: f32,
    pub in_out_ratio: f32,
    pub pagerank: f32,
    pub tx_velocity: f32,
}

impl NodeFeatures {
    pub fn from_row(row: [f32; FEATURE_WIDTH]) -> Self {
        let [account_age_days, balance, in_out_ratio, pagerank, tx_velocity] = row;
        Self {
            account_age_days,
            balance,
            in_out_ratio,
            pagerank,
            tx_velocity,
        }
    }

    pub fn to_row(self) -> [f32; FEATURE_WIDTH] {
        [
            self.account_age_days,
            self.balance,
            self.in_out_ratio,
            self.pagerank,
            self.tx_velocity,
        ]
    }
}
