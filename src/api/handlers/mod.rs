pub mod catalog;
pub mod contracts;
pub mod health;
pub mod markets;
pub mod metrics;
pub mod nfts;
pub mod predictions;
pub mod wallet;
pub mod ws;

use serde::Serialize;

use crate::models::{Source, Sourced};

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Set on generated data: whether it came from the live providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            source: None,
        }
    }

    pub fn sourced(data: Sourced<T>) -> Self {
        Self {
            source: Some(data.source()),
            ..Self::ok(data.into_inner())
        }
    }
}
