//! On-disk shape of the session file

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use test_log::test;

use cleanly::models::Role;
use cleanly::session::{Identity, Principal, Session, SessionStore};

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_file_holds_user_id_and_role() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut session = Session::open(SessionStore::new(&path)).unwrap();

    session.set_identity(Identity::new("u-3", Role::Admin)).unwrap();
    assert_eq!(read_json(&path), json!({"user_id": "u-3", "role": "admin"}));

    session.set_role(Role::Cleaner).unwrap();
    assert_eq!(read_json(&path), json!({"user_id": "u-3", "role": "cleaner"}));
}

#[test]
fn test_guest_role_switch_writes_role_only() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mut session = Session::open(SessionStore::new(&path)).unwrap();

    session.set_role(Role::Cleaner).unwrap();
    assert_eq!(read_json(&path), json!({"role": "cleaner"}));
    assert_eq!(session.user_id(), "guest");
}

#[test]
fn test_unknown_role_reads_as_customer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, r#"{"user_id":"u-8","role":"superuser"}"#).unwrap();

    let session = Session::open(SessionStore::new(&path)).unwrap();
    assert_eq!(session.identity().principal, Principal::User("u-8".to_string()));
    assert_eq!(session.role(), Role::Customer);
}

#[test]
fn test_ephemeral_session_never_writes() {
    let dir = tempdir().unwrap();
    let mut session = Session::ephemeral(Identity::default());
    session.set_identity(Identity::new("u-1", Role::Customer)).unwrap();

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(session.user_id(), "u-1");
}
