use super::*;
use serde_json::json;

#[test]
fn display_name_joins_first_and_last_name() {
    let record = UserRecord::new(json!({
        "id_no": "1001",
        "first_name": "Alice",
        "last_name": "Reyes",
    }));
    assert_eq!(record.id_no(), Some("1001"));
    assert_eq!(record.display_name().as_deref(), Some("Alice Reyes"));
}

#[test]
fn display_name_falls_back_to_name_field() {
    let record = UserRecord::new(json!({ "id": 1, "name": "Alice" }));
    assert_eq!(record.id_no(), None);
    assert_eq!(record.display_name().as_deref(), Some("Alice"));

    let nameless = UserRecord::new(json!({ "id": 2, "first_name": "  " }));
    assert_eq!(nameless.display_name(), None);
}

#[test]
fn record_serializes_transparently() {
    let raw = json!({ "id": 1, "name": "Alice", "tags": ["a", "b"] });
    let record = UserRecord::from(raw.clone());
    assert_eq!(serde_json::to_value(&record).expect("serialize"), raw);
}

#[test]
fn profile_decodes_backend_user_fields() {
    let record = UserRecord::new(json!({
        "id_no": "1001",
        "department": "IT",
        "first_name": "Alice",
        "last_name": "Reyes",
        "suffix": "Jr.",
        "email": "alice@example.com",
        "email_status": "active",
        "status": "active",
        "ticket_no": "T-1",
        "date_created": "2024-01-01",
        "unknown_field": true,
    }));
    let profile = record.profile().expect("profile");
    assert_eq!(profile.department, "IT");
    assert_eq!(profile.full_name(), "Alice Reyes Jr.");
    assert_eq!(profile.date_created.as_deref(), Some("2024-01-01"));
    assert_eq!(profile.profile_picture, None);
}

#[test]
fn profile_requires_id_no() {
    let record = UserRecord::new(json!({ "id": 1, "name": "Alice" }));
    assert!(record.profile().is_err());
}

#[test]
fn decode_mode_parses_case_insensitively() {
    assert_eq!("Strict".parse::<DecodeMode>(), Ok(DecodeMode::Strict));
    assert_eq!(" opaque ".parse::<DecodeMode>(), Ok(DecodeMode::Opaque));
    assert!("loose".parse::<DecodeMode>().is_err());
}

#[test]
fn text_renders_scalars_only() {
    let record = UserRecord::new(json!({
        "id": 7,
        "email": "bob@example.com",
        "active": true,
        "roles": ["admin"],
        "manager": null,
    }));
    assert_eq!(record.text("id").as_deref(), Some("7"));
    assert_eq!(record.text("email").as_deref(), Some("bob@example.com"));
    assert_eq!(record.text("active").as_deref(), Some("true"));
    assert_eq!(record.text("roles"), None);
    assert_eq!(record.text("manager"), None);
    assert_eq!(record.text("missing"), None);
}

#[test]
fn list_state_starts_as_empty_array() {
    let state = UserListState::default();
    assert_eq!(state.payload(), &json!([]));
    assert!(state.is_empty());
    assert_eq!(state.records(), Some(Vec::new()));
}

#[test]
fn list_state_has_no_list_view_for_objects() {
    let body = json!({ "code": 404, "message": "users not found" });
    let state = UserListState::new(body.clone());
    assert_eq!(state.records(), None);
    assert_eq!(state.record_count(), None);
    assert!(!state.is_empty());
    assert_eq!(serde_json::to_value(&state).expect("serialize"), body);
}

#[test]
fn list_state_reads_null_as_no_users() {
    let state = UserListState::new(Value::Null);
    assert_eq!(state.record_count(), Some(0));
    assert!(state.is_empty());
}
