//! Outcome events emitted by the verification service.
//!
//! Events arrive loosely typed as [`RawEvent`] (an id plus a JSON object) and
//! are narrowed into [`SdkEvent`] before anything acts on them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AdvisoryCondition, AnalysisError};

pub const ANALYSIS_SUCCESS: &str = "analysis-success";
pub const API_ERROR: &str = "api-error";
pub const GEOLOCATION_DENIED: &str = "geolocation-denied";
pub const GEOLOCATION_NOT_AVAILABLE: &str = "geolocation-not-available";
pub const SDK_INTERNAL_ERROR: &str = "sdk-internal-error";
pub const VALIDATION_ERROR: &str = "validation-error";

pub const ANALYSIS_SUCCESS_MESSAGE: &str = "Analysis completed successfully!";
const UNKNOWN_API_ERROR: &str = "Unknown API error";
const UNKNOWN_SDK_ERROR: &str = "Unknown SDK error";
const UNKNOWN_VALIDATION_ERROR: &str = "Validation error";

const MESSAGE_KEY: &str = "message";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawEvent {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            data: Map::new(),
        }
    }

    pub fn with_message(event_id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut event = Self::new(event_id);
        event
            .data
            .insert(MESSAGE_KEY.to_string(), Value::String(message.into()));
        event
    }

    /// `None` when the key is missing or holds anything but a string.
    fn message(&self) -> Option<String> {
        self.data
            .get(MESSAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    AnalysisSuccess,
    ApiError { message: Option<String> },
    GeolocationDenied,
    GeolocationNotAvailable,
    SdkInternalError { message: Option<String> },
    ValidationError { message: Option<String> },
    Unknown { event_id: String },
}

impl From<RawEvent> for SdkEvent {
    fn from(raw: RawEvent) -> Self {
        match raw.event_id.as_str() {
            ANALYSIS_SUCCESS => SdkEvent::AnalysisSuccess,
            API_ERROR => SdkEvent::ApiError {
                message: raw.message(),
            },
            GEOLOCATION_DENIED => SdkEvent::GeolocationDenied,
            GEOLOCATION_NOT_AVAILABLE => SdkEvent::GeolocationNotAvailable,
            SDK_INTERNAL_ERROR => SdkEvent::SdkInternalError {
                message: raw.message(),
            },
            VALIDATION_ERROR => SdkEvent::ValidationError {
                message: raw.message(),
            },
            _ => SdkEvent::Unknown {
                event_id: raw.event_id,
            },
        }
    }
}

impl SdkEvent {
    pub fn event_id(&self) -> &str {
        match self {
            SdkEvent::AnalysisSuccess => ANALYSIS_SUCCESS,
            SdkEvent::ApiError { .. } => API_ERROR,
            SdkEvent::GeolocationDenied => GEOLOCATION_DENIED,
            SdkEvent::GeolocationNotAvailable => GEOLOCATION_NOT_AVAILABLE,
            SdkEvent::SdkInternalError { .. } => SDK_INTERNAL_ERROR,
            SdkEvent::ValidationError { .. } => VALIDATION_ERROR,
            SdkEvent::Unknown { event_id } => event_id,
        }
    }

    pub fn outcome(&self) -> EventOutcome {
        match self {
            SdkEvent::AnalysisSuccess => EventOutcome::Succeeded,
            SdkEvent::ApiError { message } => EventOutcome::Failed(AnalysisError::Api(
                message.clone().unwrap_or_else(|| UNKNOWN_API_ERROR.to_string()),
            )),
            SdkEvent::SdkInternalError { message } => {
                EventOutcome::Failed(AnalysisError::Internal(
                    message.clone().unwrap_or_else(|| UNKNOWN_SDK_ERROR.to_string()),
                ))
            }
            SdkEvent::ValidationError { message } => {
                EventOutcome::Failed(AnalysisError::Validation(
                    message
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_VALIDATION_ERROR.to_string()),
                ))
            }
            SdkEvent::GeolocationDenied => {
                EventOutcome::Advisory(AdvisoryCondition::GeolocationDenied)
            }
            SdkEvent::GeolocationNotAvailable => {
                EventOutcome::Advisory(AdvisoryCondition::GeolocationUnavailable)
            }
            SdkEvent::Unknown { .. } => EventOutcome::Ignored,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Succeeded,
    Failed(AnalysisError),
    Advisory(AdvisoryCondition),
    Ignored,
}

impl EventOutcome {
    /// Terminal outcomes end the submitting phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventOutcome::Succeeded | EventOutcome::Failed(_))
    }

    pub fn alert_message(&self) -> Option<String> {
        match self {
            EventOutcome::Succeeded => Some(ANALYSIS_SUCCESS_MESSAGE.to_string()),
            EventOutcome::Failed(err) => Some(err.to_string()),
            EventOutcome::Advisory(condition) => Some(condition.to_string()),
            EventOutcome::Ignored => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/event_tests.rs"]
mod tests;
