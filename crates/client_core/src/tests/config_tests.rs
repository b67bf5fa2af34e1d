use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("antifraud_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings = load_settings_with(Path::new("/nonexistent/antifraud.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.session.action, "signin");
    assert!(settings.session.enable_geolocation);
    assert_eq!(
        settings.controller_settings().fallback_delay,
        Duration::from_millis(2000)
    );
    assert_eq!(settings.mode, ControllerMode::Compat);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        r#"
api_url = "https://staging.example.com"
token = "file-token"
enable_geolocation = false
fallback_delay_ms = 500
mode = "guarded"
"#,
    );

    let settings = load_settings_with(&path, no_env);
    assert_eq!(settings.session.api_base_url, "https://staging.example.com");
    assert_eq!(settings.session.auth_token, "file-token");
    assert!(!settings.session.enable_geolocation);
    assert_eq!(settings.fallback_delay_ms, 500);
    assert_eq!(settings.mode, ControllerMode::Guarded);
    assert_eq!(settings.session.origin, Settings::default().session.origin);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let path = temp_settings_file("token = \"file-token\"\n");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ANTIFRAUD_TOKEN", "env-token"),
        ("ANTIFRAUD_ACTION", "signup"),
        ("APP__ACTION", "checkout"),
        ("ANTIFRAUD_ENABLE_GEOLOCATION", "off"),
    ]);

    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings.session.auth_token, "env-token");
    assert_eq!(settings.session.action, "checkout");
    assert!(!settings.session.enable_geolocation);

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}

#[test]
fn invalid_values_are_ignored() {
    let path = temp_settings_file("this is = = not toml");
    let vars: HashMap<&str, &str> = HashMap::from([
        ("ANTIFRAUD_FALLBACK_DELAY_MS", "soon"),
        ("ANTIFRAUD_MODE", "chaotic"),
        ("ANTIFRAUD_ENABLE_GEOLOCATION", "maybe"),
    ]);

    let settings = load_settings_with(&path, |key| vars.get(key).map(|v| v.to_string()));
    assert_eq!(settings, Settings::default());

    fs::remove_dir_all(path.parent().expect("parent")).expect("cleanup");
}
