use super::*;

use std::{
    env,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_settings_file(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("user_list_settings_{suffix}.toml"));
    fs::write(&path, contents).expect("write settings");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_point_at_local_users_endpoint() {
    let settings = load_settings_from(Path::new("/nonexistent/user_list.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.users_url, "http://localhost:8000/users");
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn file_values_override_defaults() {
    let path = temp_settings_file(
        r#"
users_url = "http://127.0.0.1:9000/users"
log_filter = "debug"
decode_mode = "strict"
apply_policy = "latest-issued-only"
"#,
    );

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.users_url, "http://127.0.0.1:9000/users");
    assert_eq!(settings.log_filter, "debug");
    assert_eq!(settings.decode_mode, DecodeMode::Strict);
    assert_eq!(settings.apply_policy, ApplyPolicy::LatestIssuedOnly);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_and_prefixed_name_wins() {
    let path = temp_settings_file("users_url = \"http://from-file/users\"\n");

    let settings = load_settings_from(&path, |key| match key {
        "USERS_URL" => Some("http://plain-env/users".to_string()),
        "APP__USERS_URL" => Some("http://prefixed-env/users".to_string()),
        "APP__DECODE_MODE" => Some("strict".to_string()),
        _ => None,
    });
    assert_eq!(settings.users_url, "http://prefixed-env/users");
    assert_eq!(settings.decode_mode, DecodeMode::Strict);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_values_are_ignored() {
    let path = temp_settings_file("decode_mode = \"loose\"\n");

    let settings = load_settings_from(&path, |key| {
        (key == "APP__APPLY_POLICY").then(|| "first-wins".to_string())
    });
    assert_eq!(settings.decode_mode, DecodeMode::Opaque);
    assert_eq!(settings.apply_policy, ApplyPolicy::LastArrivalWins);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn controller_options_follow_settings() {
    let settings = Settings {
        decode_mode: DecodeMode::Strict,
        apply_policy: ApplyPolicy::LatestIssuedOnly,
        ..Settings::default()
    };
    let options = settings.controller_options();
    assert_eq!(options.decode_mode, DecodeMode::Strict);
    assert_eq!(options.apply_policy, ApplyPolicy::LatestIssuedOnly);
}

#[test]
fn users_url_must_be_http() {
    assert_eq!(
        parse_users_url(" http://localhost:8000/users ")
            .expect("url")
            .as_str(),
        "http://localhost:8000/users"
    );
    assert!(parse_users_url("ftp://localhost/users").is_err());
    assert!(parse_users_url("not a url").is_err());
}
