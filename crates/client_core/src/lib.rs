//! Fraud-analysis controller: form state, alert slot, and the session
//! controller that races outcome events against a fallback timer.

pub mod alert;
pub mod config;
pub mod controller;
pub mod form;
mod inbox;
pub mod state;

pub use alert::{AlertPresenter, ALERT_TITLE};
pub use config::{load_settings, Settings};
pub use controller::{AnalysisController, ControllerSettings, DEFAULT_FALLBACK_DELAY};
pub use form::FormState;
pub use state::{ControllerMode, ControllerSnapshot, Phase, SubmitOutcome};
