//! Consumed surface of the external fraud-verification service.
//!
//! The controller only talks to the service through these traits. Sessions
//! are stateful: fields are pushed with setters, then `submit_analysis`
//! starts an analysis whose outcome arrives later on the event channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{domain::SessionField, event::RawEvent};
use thiserror::Error;
use tokio::sync::broadcast;

mod scripted;

pub use scripted::{Scenario, ScriptedSession, ScriptedSessionFactory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub api_base_url: String,
    pub auth_token: String,
    pub action: String,
    pub origin: String,
    pub enable_geolocation: bool,
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("verification sdk is unavailable")]
    Unavailable,
    #[error("invalid api url '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("session is not mounted")]
    NotMounted,
}

pub trait VerificationSession: Send + Sync {
    fn mount(&self) -> anyhow::Result<()>;
    fn set_field(&self, field: SessionField, value: &str) -> anyhow::Result<()>;
    fn submit_analysis(&self, ref_id: Option<&str>) -> anyhow::Result<()>;
    fn subscribe_events(&self) -> broadcast::Receiver<RawEvent>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> anyhow::Result<Arc<dyn VerificationSession>>;
}

pub struct MissingSessionFactory;

#[async_trait]
impl SessionFactory for MissingSessionFactory {
    async fn create_session(
        &self,
        _config: SessionConfig,
    ) -> anyhow::Result<Arc<dyn VerificationSession>> {
        Err(SdkError::Unavailable.into())
    }
}
