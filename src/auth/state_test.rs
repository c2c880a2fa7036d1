use super::*;
use serde_json::json;

fn profile(nickname: &str) -> UserProfile {
    serde_json::from_value(json!({
        "nickname": nickname,
        "email": format!("{nickname}@campus.test"),
        "role": "STUDENT",
        "department": "Computer Science",
    }))
    .unwrap()
}

#[test]
fn starts_logged_out() {
    let (store, _writer) = auth_store();
    assert_eq!(store.snapshot(), AuthState::logged_out());
    assert!(!store.is_logged_in());
    assert!(store.user().is_none());
}

#[test]
fn set_user_logs_in_with_profile() {
    let (store, writer) = auth_store();
    writer.set_user(profile("mina"));

    let state = store.snapshot();
    assert!(state.is_logged_in());
    assert_eq!(state.user().and_then(UserProfile::nickname), Some("mina"));
    assert_eq!(store.user().unwrap().department(), Some("Computer Science"));
}

#[test]
fn set_logged_in_without_user_is_refused() {
    let (store, writer) = auth_store();
    assert!(!writer.set_logged_in(true));
    assert!(!store.is_logged_in());
}

#[test]
fn set_logged_in_false_drops_user() {
    let (store, writer) = auth_store();
    writer.set_user(profile("mina"));
    assert!(writer.set_logged_in(false));
    assert_eq!(store.snapshot(), AuthState::logged_out());
}

#[test]
fn reset_user_returns_to_logged_out() {
    let (store, writer) = auth_store();
    writer.set_user(profile("jun"));
    writer.reset_user();
    assert!(!store.is_logged_in());
    assert!(store.user().is_none());
}

#[tokio::test]
async fn subscribers_observe_changes() {
    let (store, writer) = auth_store();
    let mut rx = store.subscribe();

    writer.set_user(profile("jun"));
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_logged_in());

    writer.reset_user();
    rx.changed().await.unwrap();
    assert!(!rx.borrow_and_update().is_logged_in());
}

#[test]
fn redundant_reset_does_not_notify() {
    let (store, writer) = auth_store();
    let rx = store.subscribe();
    writer.reset_user();
    assert!(!rx.has_changed().unwrap());
}

#[test]
fn writer_store_shares_state() {
    let (_, writer) = auth_store();
    let store = writer.store();
    writer.set_user(profile("ara"));
    assert!(store.is_logged_in());
}

#[test]
fn profile_accessors_read_known_fields() {
    let p = profile("ara");
    assert_eq!(p.email(), Some("ara@campus.test"));
    assert_eq!(p.role(), Some("STUDENT"));
    assert_eq!(p.get("missing"), None);
    assert_eq!(p.fields().len(), 4);
}
