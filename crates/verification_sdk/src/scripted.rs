//! In-process stand-in for the verification service that replays a fixed
//! event script after each submission.

use std::{
    collections::HashMap,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::SessionField,
    event::{
        RawEvent, ANALYSIS_SUCCESS, API_ERROR, GEOLOCATION_DENIED, SDK_INTERNAL_ERROR,
        VALIDATION_ERROR,
    },
};
use tokio::sync::broadcast;
use tracing::{debug, info};
use url::Url;

use crate::{SdkError, SessionConfig, SessionFactory, VerificationSession};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Canned outcome sequences for demos and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Success,
    ApiError,
    SdkError,
    ValidationError,
    GeolocationDenied,
    Unknown,
    Silent,
}

impl Scenario {
    pub fn events(self) -> Vec<RawEvent> {
        match self {
            Scenario::Success => vec![RawEvent::new(ANALYSIS_SUCCESS)],
            Scenario::ApiError => vec![RawEvent::with_message(API_ERROR, "upstream rejected request")],
            Scenario::SdkError => vec![RawEvent::new(SDK_INTERNAL_ERROR)],
            Scenario::ValidationError => {
                vec![RawEvent::with_message(VALIDATION_ERROR, "CPF inválido")]
            }
            Scenario::GeolocationDenied => vec![
                RawEvent::new(GEOLOCATION_DENIED),
                RawEvent::new(ANALYSIS_SUCCESS),
            ],
            Scenario::Unknown => vec![RawEvent::new("device-fingerprint-collected")],
            Scenario::Silent => Vec::new(),
        }
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Scenario::Success),
            "api-error" => Ok(Scenario::ApiError),
            "sdk-error" => Ok(Scenario::SdkError),
            "validation-error" => Ok(Scenario::ValidationError),
            "geolocation-denied" => Ok(Scenario::GeolocationDenied),
            "unknown" => Ok(Scenario::Unknown),
            "silent" => Ok(Scenario::Silent),
            other => Err(anyhow!("unknown scenario '{other}'")),
        }
    }
}

#[derive(Default)]
struct ScriptedState {
    mounted: bool,
    fields: HashMap<SessionField, String>,
    submissions: Vec<Option<String>>,
}

pub struct ScriptedSession {
    config: SessionConfig,
    script: Vec<RawEvent>,
    mount_events: Vec<RawEvent>,
    latency: Duration,
    events: broadcast::Sender<RawEvent>,
    state: Mutex<ScriptedState>,
}

impl ScriptedSession {
    fn state(&self) -> MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    pub fn field(&self, field: SessionField) -> Option<String> {
        self.state().fields.get(&field).cloned()
    }

    /// Reference ids of every submission so far, in order.
    pub fn submissions(&self) -> Vec<Option<String>> {
        self.state().submissions.clone()
    }

    /// Pushes an event to subscribers immediately. Returns the receiver count.
    pub fn emit(&self, event: RawEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}

impl VerificationSession for ScriptedSession {
    fn mount(&self) -> anyhow::Result<()> {
        self.state().mounted = true;
        info!(
            action = %self.config.action,
            geolocation = self.config.enable_geolocation,
            "scripted session mounted"
        );
        for event in &self.mount_events {
            let _ = self.events.send(event.clone());
        }
        Ok(())
    }

    fn set_field(&self, field: SessionField, value: &str) -> anyhow::Result<()> {
        self.state().fields.insert(field, value.to_string());
        Ok(())
    }

    fn submit_analysis(&self, ref_id: Option<&str>) -> anyhow::Result<()> {
        {
            let mut state = self.state();
            if !state.mounted {
                return Err(SdkError::NotMounted.into());
            }
            state.submissions.push(ref_id.map(str::to_string));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| anyhow!("no async runtime to deliver events: {err}"))?;
        let events = self.events.clone();
        let script = self.script.clone();
        let latency = self.latency;
        runtime.spawn(async move {
            tokio::time::sleep(latency).await;
            for event in script {
                debug!(event_id = %event.event_id, "scripted session emitting event");
                let _ = events.send(event);
            }
        });
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<RawEvent> {
        self.events.subscribe()
    }
}

pub struct ScriptedSessionFactory {
    script: Vec<RawEvent>,
    mount_events: Vec<RawEvent>,
    latency: Duration,
    created: Mutex<Vec<Arc<ScriptedSession>>>,
}

impl ScriptedSessionFactory {
    pub fn new(script: Vec<RawEvent>) -> Self {
        Self {
            script,
            mount_events: Vec::new(),
            latency: Duration::ZERO,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn from_scenario(scenario: Scenario) -> Self {
        Self::new(scenario.events())
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_mount_events(mut self, mount_events: Vec<RawEvent>) -> Self {
        self.mount_events = mount_events;
        self
    }

    /// Every session created so far, oldest first.
    pub fn sessions(&self) -> Vec<Arc<ScriptedSession>> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_session(&self) -> Option<Arc<ScriptedSession>> {
        self.sessions().pop()
    }
}

#[async_trait]
impl SessionFactory for ScriptedSessionFactory {
    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> anyhow::Result<Arc<dyn VerificationSession>> {
        Url::parse(&config.api_base_url).map_err(|err| SdkError::InvalidApiUrl {
            url: config.api_base_url.clone(),
            reason: err.to_string(),
        })?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session = Arc::new(ScriptedSession {
            config,
            script: self.script.clone(),
            mount_events: self.mount_events.clone(),
            latency: self.latency,
            events,
            state: Mutex::new(ScriptedState::default()),
        });
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&session));
        Ok(session)
    }
}

#[cfg(test)]
#[path = "tests/scripted_tests.rs"]
mod tests;
