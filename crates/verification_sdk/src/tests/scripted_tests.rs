use super::*;
use crate::MissingSessionFactory;

fn config(api_base_url: &str) -> SessionConfig {
    SessionConfig {
        api_base_url: api_base_url.into(),
        auth_token: "token".into(),
        action: "signin".into(),
        origin: "http://app.demo.antifraude.teste.com".into(),
        enable_geolocation: true,
    }
}

#[tokio::test]
async fn rejects_unparseable_api_url() {
    let factory = ScriptedSessionFactory::from_scenario(Scenario::Success);
    let err = factory
        .create_session(config("not a url"))
        .await
        .err()
        .expect("should fail");
    assert!(err.to_string().contains("invalid api url"));
    assert!(factory.sessions().is_empty());
}

#[tokio::test]
async fn missing_factory_is_unavailable() {
    let err = MissingSessionFactory
        .create_session(config("https://api.legitimuz.com"))
        .await
        .err()
        .expect("should fail");
    assert!(matches!(
        err.downcast_ref::<SdkError>(),
        Some(SdkError::Unavailable)
    ));
}

#[tokio::test]
async fn submit_requires_mount() {
    let factory = ScriptedSessionFactory::from_scenario(Scenario::Success);
    let session = factory
        .create_session(config("https://api.legitimuz.com"))
        .await
        .expect("session");
    assert!(session.submit_analysis(None).is_err());
}

#[tokio::test(start_paused = true)]
async fn replays_script_after_latency() {
    let factory = ScriptedSessionFactory::from_scenario(Scenario::GeolocationDenied)
        .with_latency(Duration::from_millis(300));
    let session = factory
        .create_session(config("https://api.legitimuz.com"))
        .await
        .expect("session");
    let mut events = session.subscribe_events();

    session.mount().expect("mount");
    session.set_field(SessionField::Cpf, "12345678900").expect("cpf");
    session.submit_analysis(Some("geoloc-ref-123")).expect("submit");

    let first = events.recv().await.expect("first event");
    let second = events.recv().await.expect("second event");
    assert_eq!(first.event_id, GEOLOCATION_DENIED);
    assert_eq!(second.event_id, ANALYSIS_SUCCESS);

    let recorded = factory.last_session().expect("recorded session");
    assert_eq!(
        recorded.field(SessionField::Cpf).as_deref(),
        Some("12345678900")
    );
    assert_eq!(
        recorded.submissions(),
        vec![Some("geoloc-ref-123".to_string())]
    );
}

#[tokio::test]
async fn mount_emits_configured_events() {
    let factory = ScriptedSessionFactory::from_scenario(Scenario::Silent)
        .with_mount_events(vec![RawEvent::new("geolocation-not-available")]);
    let session = factory
        .create_session(config("https://api.legitimuz.com"))
        .await
        .expect("session");
    let mut events = session.subscribe_events();
    session.mount().expect("mount");

    let event = events.recv().await.expect("mount event");
    assert_eq!(event.event_id, "geolocation-not-available");
    assert!(factory.last_session().expect("session").is_mounted());
}

#[test]
fn parses_scenario_names() {
    assert_eq!("API-Error".parse::<Scenario>().expect("parse"), Scenario::ApiError);
    assert_eq!(" silent ".parse::<Scenario>().expect("parse"), Scenario::Silent);
    assert!("nope".parse::<Scenario>().is_err());
}
