//! Structured record of a single classification decision

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Decision, Metadata, ReasonCode};

/// One entry in the decision trace. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Rule that produced the decision
    pub tag: ReasonCode,
    pub decision: Decision,
    /// Normalized transcript text
    pub text: String,
    pub confidence: f32,
    pub is_final: bool,
    pub metadata: Metadata,
    /// Rule-specific detail such as the matched stop word
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl TraceRecord {
    pub fn new(
        tag: ReasonCode,
        text: impl Into<String>,
        confidence: f32,
        is_final: bool,
        metadata: Metadata,
        extra: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            tag,
            decision: tag.decision(),
            text: text.into(),
            confidence,
            is_final,
            metadata,
            extra,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_follows_tag() {
        let record = TraceRecord::new(
            ReasonCode::InterruptStopWord,
            "umm ok stop",
            0.95,
            true,
            Metadata::new(),
            HashMap::from([("matched".to_string(), serde_json::json!("stop"))]),
        );
        assert_eq!(record.decision, Decision::Interrupt);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tag"], "INTERRUPT_STOP_WORD");
        assert_eq!(json["extra"]["matched"], "stop");
    }
}
