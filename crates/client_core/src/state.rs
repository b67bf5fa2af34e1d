use std::str::FromStr;

use anyhow::anyhow;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Ready,
    Submitting,
}

/// How submissions race the fallback timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerMode {
    /// Fallback timers are never cancelled and every one resets the phase;
    /// overlapping raw submissions are accepted.
    #[default]
    Compat,
    /// A terminal event cancels the pending fallback, a fallback only ends
    /// the submission that armed it, and overlapping submissions are refused.
    Guarded,
}

impl ControllerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerMode::Compat => "compat",
            ControllerMode::Guarded => "guarded",
        }
    }
}

impl FromStr for ControllerMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compat" => Ok(ControllerMode::Compat),
            "guarded" => Ok(ControllerMode::Guarded),
            other => Err(anyhow!("unknown controller mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started,
    NotInitialized,
    MissingCpf,
    AlreadyInFlight,
    SendFailed,
}

/// Everything the presentation layer reads, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub cpf: String,
    pub email: String,
    pub ref_id_geoloc: String,
    pub phase: Phase,
    pub can_submit: bool,
    pub alert_visible: bool,
    pub alert_message: String,
}

impl ControllerSnapshot {
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            "Analyzing..."
        } else {
            "Send Analysis"
        }
    }
}
