// SPDX-License-Identifier: Apache-2.0

use crate::unit_tests::testlib::{
    new_test_session, with_message_id, FAILED_REPLY, OK_REPLY,
};
use crate::{
    CommitOptions, DefaultOperation, EditConfigOptions, Element, ErrorKind,
    ErrorOption, FilterSpec, NetconfSession,
};

fn last_sent(session: &NetconfSession) -> Element {
    Element::parse(session.send_history().last().unwrap()).unwrap()
}

#[test]
fn test_get_config_without_filter() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    session.get_config("running", None).unwrap();

    let rpc = last_sent(&session);
    let get_config = rpc.child("get-config").unwrap();
    assert!(get_config
        .child("source")
        .unwrap()
        .has_child("running"));
    assert!(!get_config.has_child("filter"));
}

#[test]
fn test_get_config_with_filter() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    let mut filter = FilterSpec::subtree();
    filter.add_path("interfaces", Vec::new());
    session.get_config("candidate", Some(&filter)).unwrap();

    let rpc = last_sent(&session);
    let get_config = rpc.child("get-config").unwrap();
    assert!(get_config
        .child("source")
        .unwrap()
        .has_child("candidate"));
    let filter = get_config.child("filter").unwrap();
    assert_eq!(filter.attribute("type"), Some("subtree"));
    assert!(filter.has_child("interfaces"));
}

#[test]
fn test_get_config_empty_filter_spec_omits_filter_node() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    session
        .get_config("running", Some(&FilterSpec::new()))
        .unwrap();
    assert!(!last_sent(&session)
        .child("get-config")
        .unwrap()
        .has_child("filter"));
}

#[test]
fn test_edit_config_locks_then_edits() {
    let lock_reply = with_message_id(OK_REPLY, 1);
    let edit_reply = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&lock_reply, &edit_reply]);
    let reply = session
        .edit_config(
            "<interfaces><interface><name>ge-0/0/0</name></interface>\
             </interfaces>",
            "candidate",
            &EditConfigOptions::default(),
            true,
        )
        .unwrap();
    assert!(reply.is_ok());
    assert_eq!(reply.message_id(), 2);

    // History: hello, lock, edit-config.
    assert_eq!(session.send_history().len(), 3);
    let lock = Element::parse(&session.send_history()[1]).unwrap();
    assert!(lock
        .child("lock")
        .unwrap()
        .child("target")
        .unwrap()
        .has_child("candidate"));

    let edit = last_sent(&session);
    let edit_config = edit.child("edit-config").unwrap();
    assert!(edit_config.child("target").unwrap().has_child("candidate"));
    let config = edit_config.child("config").unwrap();
    assert!(config
        .child("interfaces")
        .unwrap()
        .child("interface")
        .unwrap()
        .has_child("name"));
}

#[test]
fn test_edit_config_denied_lock_short_circuits() {
    let lock_reply = with_message_id(FAILED_REPLY, 1);
    let mut session = new_test_session(&[&lock_reply]);
    let reply = session
        .edit_config(
            "<system/>",
            "candidate",
            &EditConfigOptions::default(),
            true,
        )
        .unwrap();

    // The lock failure comes back unchanged and the edit is never sent:
    // only hello and lock are in the history.
    assert!(!reply.is_ok());
    assert_eq!(reply.errors()[0].error_tag.as_deref(), Some("lock-denied"));
    assert_eq!(session.send_history().len(), 2);
    assert_eq!(session.message_id(), 1);
}

#[test]
fn test_edit_config_without_lock() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    session
        .edit_config(
            "<system/>",
            "running",
            &EditConfigOptions::default(),
            false,
        )
        .unwrap();
    assert_eq!(session.send_history().len(), 2);
    assert!(last_sent(&session).has_child("edit-config"));
}

#[test]
fn test_edit_config_options_rendered_as_children() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    let options = EditConfigOptions {
        default_operation: Some(DefaultOperation::Replace),
        error_option: Some(ErrorOption::RollbackOnError),
        ..Default::default()
    };
    session
        .edit_config("<system/>", "candidate", &options, false)
        .unwrap();

    let edit_config = last_sent(&session);
    let edit_config = edit_config.child("edit-config").unwrap();
    assert_eq!(
        edit_config.child_text("default-operation"),
        Some("replace")
    );
    assert_eq!(
        edit_config.child_text("error-option"),
        Some("rollback-on-error")
    );
    assert_eq!(edit_config.child_text("test-option"), None);
}

#[test]
fn test_edit_config_rejects_malformed_fragment() {
    let mut session = new_test_session(&[]);
    let e = session
        .edit_config(
            "<unclosed>",
            "candidate",
            &EditConfigOptions::default(),
            true,
        )
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    // Rejected before anything was sent, the datastore was never locked.
    assert_eq!(session.send_history().len(), 1);
}

#[test]
fn test_copy_config_url_source() {
    let reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&reply]);
    session
        .copy_config("url:http://x/y", "running")
        .unwrap();

    let copy_config = last_sent(&session);
    let copy_config = copy_config.child("copy-config").unwrap();
    assert_eq!(
        copy_config.child("source").unwrap().child_text("url"),
        Some("http://x/y")
    );
    assert!(copy_config.child("target").unwrap().has_child("running"));
}

#[test]
fn test_delete_config_datastore_and_url() {
    let first = with_message_id(OK_REPLY, 1);
    let second = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&first, &second]);

    session.delete_config("startup").unwrap();
    assert!(last_sent(&session)
        .child("delete-config")
        .unwrap()
        .child("target")
        .unwrap()
        .has_child("startup"));

    session.delete_config("url:ftp://host/old.cfg").unwrap();
    assert_eq!(
        last_sent(&session)
            .child("delete-config")
            .unwrap()
            .child("target")
            .unwrap()
            .child_text("url"),
        Some("ftp://host/old.cfg")
    );
}

#[test]
fn test_commit_unlocks_after_success() {
    let commit_reply = with_message_id(OK_REPLY, 1);
    let unlock_reply = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&commit_reply, &unlock_reply]);
    let reply = session.commit(&CommitOptions::default()).unwrap();

    // The caller always gets the commit reply, not the unlock reply.
    assert!(reply.is_ok());
    assert_eq!(reply.message_id(), 1);
    assert_eq!(session.send_history().len(), 3);
    let unlock = last_sent(&session);
    assert!(unlock
        .child("unlock")
        .unwrap()
        .child("target")
        .unwrap()
        .has_child("candidate"));
}

#[test]
fn test_failed_commit_skips_unlock() {
    let commit_reply = with_message_id(FAILED_REPLY, 1);
    let mut session = new_test_session(&[&commit_reply]);
    let reply = session.commit(&CommitOptions::default()).unwrap();

    assert!(!reply.is_ok());
    // Only hello and commit were sent.
    assert_eq!(session.send_history().len(), 2);
    assert_eq!(session.message_id(), 1);
}

#[test]
fn test_commit_without_unlock() {
    let commit_reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&commit_reply]);
    let options = CommitOptions {
        unlock: false,
        ..Default::default()
    };
    session.commit(&options).unwrap();
    assert_eq!(session.send_history().len(), 2);
    assert_eq!(last_sent(&session).child("commit").unwrap().children().len(), 0);
}

#[test]
fn test_confirmed_commit_shape() {
    let commit_reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&commit_reply]);
    let options = CommitOptions {
        unlock: false,
        confirmed: true,
        confirm_timeout: 120,
        persist_id: Some("abc".to_string()),
        ..Default::default()
    };
    session.commit(&options).unwrap();

    let commit = last_sent(&session);
    let commit = commit.child("commit").unwrap();
    assert!(commit.has_child("confirmed"));
    assert_eq!(commit.child_text("confirm-timeout"), Some("120"));
    assert_eq!(commit.child_text("persist"), Some("abc"));
    assert!(!commit.has_child("persist-id"));
}

#[test]
fn test_persist_id_without_confirmed() {
    let commit_reply = with_message_id(OK_REPLY, 1);
    let mut session = new_test_session(&[&commit_reply]);
    let options = CommitOptions {
        unlock: false,
        persist_id: Some("abc".to_string()),
        ..Default::default()
    };
    session.commit(&options).unwrap();

    let commit = last_sent(&session);
    let commit = commit.child("commit").unwrap();
    assert_eq!(commit.child_text("persist-id"), Some("abc"));
    assert!(!commit.has_child("confirmed"));
    assert!(!commit.has_child("confirm-timeout"));
    assert!(!commit.has_child("persist"));
}

#[test]
fn test_cancel_commit() {
    let first = with_message_id(OK_REPLY, 1);
    let second = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&first, &second]);

    session.cancel_commit(None).unwrap();
    assert!(last_sent(&session).has_child("cancel-commit"));

    session.cancel_commit(Some("abc")).unwrap();
    assert_eq!(
        last_sent(&session)
            .child("cancel-commit")
            .unwrap()
            .child_text("persist-id"),
        Some("abc")
    );
}

#[test]
fn test_lock_unlock_bodies() {
    let first = with_message_id(OK_REPLY, 1);
    let second = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&first, &second]);

    session.lock("running").unwrap();
    assert!(last_sent(&session)
        .child("lock")
        .unwrap()
        .child("target")
        .unwrap()
        .has_child("running"));

    session.unlock("running").unwrap();
    assert!(last_sent(&session)
        .child("unlock")
        .unwrap()
        .child("target")
        .unwrap()
        .has_child("running"));
}

#[test]
fn test_validate_and_discard_changes() {
    let first = with_message_id(OK_REPLY, 1);
    let second = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&first, &second]);

    session.validate("candidate").unwrap();
    assert!(last_sent(&session)
        .child("validate")
        .unwrap()
        .child("source")
        .unwrap()
        .has_child("candidate"));

    session.discard_changes().unwrap();
    assert!(last_sent(&session).has_child("discard-changes"));
}

#[test]
fn test_kill_and_close_session() {
    let first = with_message_id(OK_REPLY, 1);
    let second = with_message_id(OK_REPLY, 2);
    let mut session = new_test_session(&[&first, &second]);

    session.kill_session(99).unwrap();
    assert_eq!(
        last_sent(&session)
            .child("kill-session")
            .unwrap()
            .child_text("session-id"),
        Some("99")
    );

    session.close_session().unwrap();
    assert!(last_sent(&session).has_child("close-session"));
}
