use serde::{Deserialize, Serialize};

use crate::model::TabId;

/// Wire request sent from the page overlay to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum MatchRequest {
    #[serde(rename = "activateTabByIndex")]
    ByIndex { index: i64 },
    #[serde(rename = "activateTabByTitle")]
    ByTitle { query: String },
}

impl MatchRequest {
    pub fn action(&self) -> &'static str {
        match self {
            Self::ByIndex { .. } => "activateTabByIndex",
            Self::ByTitle { .. } => "activateTabByTitle",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    TabQuery,
    Activation,
}

/// Acknowledgment returned for every request. Senders may ignore it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Ack {
    Activated { tab_id: TabId },
    NoMatch,
    Failed { code: ErrorCode, message: String },
}
