//! Plumbing from asynchronous producers into the controller's inbox.
//!
//! Both the event forwarder and the fallback timer only ever post messages;
//! the controller is the sole consumer and the sole mutator of its state.

use std::time::Duration;

use shared::{
    domain::{SessionGeneration, SubmissionId},
    event::RawEvent,
};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, warn};

#[derive(Debug)]
pub(crate) enum ControllerMessage {
    Event {
        generation: SessionGeneration,
        event: RawEvent,
    },
    FallbackElapsed {
        submission: SubmissionId,
    },
}

pub(crate) fn spawn_event_forwarder(
    generation: SessionGeneration,
    mut events: broadcast::Receiver<RawEvent>,
    inbox: mpsc::UnboundedSender<ControllerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if inbox
                        .send(ControllerMessage::Event { generation, event })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "verification events dropped before delivery");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(generation = generation.0, "verification event stream closed");
                    break;
                }
            }
        }
    })
}

pub(crate) fn spawn_fallback_timer(
    submission: SubmissionId,
    delay: Duration,
    inbox: mpsc::UnboundedSender<ControllerMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let _ = inbox.send(ControllerMessage::FallbackElapsed { submission });
    })
}
