use super::*;
use serde_json::json;

fn parse(value: serde_json::Value) -> SdkEvent {
    let raw: RawEvent = serde_json::from_value(value).expect("raw event");
    SdkEvent::from(raw)
}

#[test]
fn success_is_terminal_with_fixed_message() {
    let outcome = parse(json!({ "eventId": "analysis-success" })).outcome();
    assert!(outcome.is_terminal());
    assert_eq!(
        outcome.alert_message().as_deref(),
        Some("Analysis completed successfully!")
    );
}

#[test]
fn api_error_uses_payload_message() {
    let outcome = parse(json!({ "eventId": "api-error", "data": { "message": "X" } })).outcome();
    assert!(outcome.is_terminal());
    assert_eq!(outcome.alert_message().as_deref(), Some("API Error: X"));
}

#[test]
fn api_error_without_message_falls_back() {
    let outcome = parse(json!({ "eventId": "api-error", "data": {} })).outcome();
    assert_eq!(
        outcome.alert_message().as_deref(),
        Some("API Error: Unknown API error")
    );
}

#[test]
fn non_string_message_falls_back() {
    let event = parse(json!({ "eventId": "sdk-internal-error", "data": { "message": 42 } }));
    assert_eq!(event, SdkEvent::SdkInternalError { message: None });
    assert_eq!(
        event.outcome().alert_message().as_deref(),
        Some("SDK Error: Unknown SDK error")
    );
}

#[test]
fn validation_error_has_no_prefix() {
    let with_message =
        parse(json!({ "eventId": "validation-error", "data": { "message": "CPF inválido" } }));
    assert_eq!(
        with_message.outcome().alert_message().as_deref(),
        Some("CPF inválido")
    );

    let without = parse(json!({ "eventId": "validation-error", "data": null }));
    assert_eq!(
        without.outcome().alert_message().as_deref(),
        Some("Validation error")
    );
}

#[test]
fn geolocation_events_are_advisory() {
    let denied = parse(json!({ "eventId": "geolocation-denied" })).outcome();
    assert!(!denied.is_terminal());
    assert_eq!(
        denied.alert_message().as_deref(),
        Some("Geolocation permission denied")
    );

    let unavailable = parse(json!({ "eventId": "geolocation-not-available" })).outcome();
    assert!(!unavailable.is_terminal());
    assert_eq!(
        unavailable.alert_message().as_deref(),
        Some("Geolocation not available")
    );
}

#[test]
fn unknown_event_is_ignored_and_keeps_its_id() {
    let event = parse(json!({ "eventId": "unknown-xyz", "data": { "message": "hi" } }));
    assert_eq!(event.event_id(), "unknown-xyz");
    let outcome = event.outcome();
    assert_eq!(outcome, EventOutcome::Ignored);
    assert!(!outcome.is_terminal());
    assert_eq!(outcome.alert_message(), None);
}

#[test]
fn with_message_serializes_to_wire_shape() {
    let raw = RawEvent::with_message(API_ERROR, "X");
    assert_eq!(
        serde_json::to_value(&raw).expect("json"),
        json!({ "eventId": "api-error", "data": { "message": "X" } })
    );
}
