// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::xml::Element;
use crate::{ErrorKind, FilterSpec, NetconfError, NetconfSession, RpcReply};

const DEFAULT_CONFIRM_TIMEOUT: u32 = 600;

/// `<default-operation>` values of `edit-config` (RFC 6241 section 7.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultOperation {
    Merge,
    Replace,
    None,
}

impl DefaultOperation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Replace => "replace",
            Self::None => "none",
        }
    }
}

/// `<test-option>` values of `edit-config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOption {
    TestThenSet,
    Set,
    TestOnly,
}

impl TestOption {
    fn as_str(&self) -> &'static str {
        match self {
            Self::TestThenSet => "test-then-set",
            Self::Set => "set",
            Self::TestOnly => "test-only",
        }
    }
}

/// `<error-option>` values of `edit-config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorOption {
    StopOnError,
    ContinueOnError,
    RollbackOnError,
}

impl ErrorOption {
    fn as_str(&self) -> &'static str {
        match self {
            Self::StopOnError => "stop-on-error",
            Self::ContinueOnError => "continue-on-error",
            Self::RollbackOnError => "rollback-on-error",
        }
    }
}

/// Optional `edit-config` parameters. Every recognized option is an
/// explicit, typed field; there is no free-form parameter bag.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub struct EditConfigOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operation: Option<DefaultOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_option: Option<TestOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_option: Option<ErrorOption>,
}

/// `commit` parameters.
///
/// `confirmed` selects the confirmed-commit shape
/// (`<confirmed/><confirm-timeout>`, plus `<persist>` when `persist_id`
/// is set); a `persist_id` without `confirmed` emits `<persist-id>` to
/// confirm an earlier persistent commit. The two shapes are mutually
/// exclusive by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct CommitOptions {
    /// Datastore unlocked after a successful commit.
    pub datastore: String,
    /// Unlock `datastore` once the commit reply is OK.
    pub unlock: bool,
    pub confirmed: bool,
    /// Seconds before an unconfirmed confirmed-commit rolls back.
    pub confirm_timeout: u32,
    pub persist_id: Option<String>,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            datastore: "candidate".to_string(),
            unlock: true,
            confirmed: false,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
            persist_id: None,
        }
    }
}

impl NetconfSession {
    /// Retrieves configuration from `datastore`, optionally restricted by
    /// a subtree [FilterSpec]. A spec with no paths behaves like no
    /// filter at all.
    pub fn get_config(
        &mut self,
        datastore: &str,
        filter: Option<&FilterSpec>,
    ) -> Result<RpcReply, NetconfError> {
        let mut get_config = Element::new("get-config");
        let source = get_config.add_child(Element::new("source"));
        source.add_child(Element::new(datastore));
        if let Some(filter) = filter {
            if !filter.is_empty() {
                get_config.add_child(filter.to_element());
            }
        }
        self.send_rpc(get_config)
    }

    /// Applies a configuration fragment to `datastore`.
    ///
    /// With `lock` set the datastore is locked first; a refused lock is
    /// returned as-is and the edit is never attempted. The lock is NOT
    /// released here — that is the caller's or [Self::commit]'s job, so a
    /// lock-edit-commit sequence stays covered end to end.
    pub fn edit_config(
        &mut self,
        config: &str,
        datastore: &str,
        options: &EditConfigOptions,
        lock: bool,
    ) -> Result<RpcReply, NetconfError> {
        let config =
            Element::parse(&format!("<config>{config}</config>")).map_err(
                |e| {
                    NetconfError::new(
                        ErrorKind::InvalidArgument,
                        format!(
                            "config is not a well-formed XML fragment: {}",
                            e.msg()
                        ),
                    )
                },
            )?;

        if lock {
            let lock_reply = self.lock(datastore)?;
            if !lock_reply.is_ok() {
                return Ok(lock_reply);
            }
        }

        let mut edit_config = Element::new("edit-config");
        let target = edit_config.add_child(Element::new("target"));
        target.add_child(Element::new(datastore));
        if let Some(op) = options.default_operation {
            edit_config.add_child(Element::new_with_text(
                "default-operation",
                op.as_str(),
            ));
        }
        if let Some(op) = options.test_option {
            edit_config.add_child(Element::new_with_text(
                "test-option",
                op.as_str(),
            ));
        }
        if let Some(op) = options.error_option {
            edit_config.add_child(Element::new_with_text(
                "error-option",
                op.as_str(),
            ));
        }
        edit_config.add_child(config);
        self.send_rpc(edit_config)
    }

    /// Copies one configuration endpoint over another. Endpoints are
    /// datastore names, or URLs given with a `url:` prefix, e.g.
    /// `url:ftp://host/device.cfg`.
    pub fn copy_config(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<RpcReply, NetconfError> {
        let mut copy_config = Element::new("copy-config");
        copy_config
            .add_child(Element::new("source"))
            .add_child(config_endpoint(source));
        copy_config
            .add_child(Element::new("target"))
            .add_child(config_endpoint(target));
        self.send_rpc(copy_config)
    }

    /// Deletes a configuration datastore or URL endpoint. The `url:`
    /// prefix works as in [Self::copy_config].
    pub fn delete_config(
        &mut self,
        target: &str,
    ) -> Result<RpcReply, NetconfError> {
        let mut delete_config = Element::new("delete-config");
        delete_config
            .add_child(Element::new("target"))
            .add_child(config_endpoint(target));
        self.send_rpc(delete_config)
    }

    /// Commits the candidate configuration.
    ///
    /// A non-OK commit reply is returned immediately and no unlock is
    /// attempted. On success with `options.unlock` set, the datastore is
    /// unlocked; the returned reply is always the commit reply, so a
    /// failed auto-unlock is only visible in the log.
    pub fn commit(
        &mut self,
        options: &CommitOptions,
    ) -> Result<RpcReply, NetconfError> {
        let mut commit = Element::new("commit");
        if options.confirmed {
            commit.add_child(Element::new("confirmed"));
            commit.add_child(Element::new_with_text(
                "confirm-timeout",
                &options.confirm_timeout.to_string(),
            ));
            if let Some(persist_id) = &options.persist_id {
                commit
                    .add_child(Element::new_with_text("persist", persist_id));
            }
        } else if let Some(persist_id) = &options.persist_id {
            commit.add_child(Element::new_with_text(
                "persist-id",
                persist_id,
            ));
        }

        let reply = self.send_rpc(commit)?;
        if !reply.is_ok() {
            return Ok(reply);
        }
        if options.unlock {
            let unlock_reply = self.unlock(&options.datastore)?;
            if !unlock_reply.is_ok() {
                log::warn!(
                    "configuration committed but unlocking {} failed: {:?}",
                    options.datastore,
                    unlock_reply.errors()
                );
            }
        }
        Ok(reply)
    }

    /// Cancels an ongoing confirmed commit, addressed by `persist_id`
    /// when it was started with one from another session.
    pub fn cancel_commit(
        &mut self,
        persist_id: Option<&str>,
    ) -> Result<RpcReply, NetconfError> {
        let mut cancel_commit = Element::new("cancel-commit");
        if let Some(persist_id) = persist_id {
            cancel_commit.add_child(Element::new_with_text(
                "persist-id",
                persist_id,
            ));
        }
        self.send_rpc(cancel_commit)
    }

    pub fn lock(
        &mut self,
        datastore: &str,
    ) -> Result<RpcReply, NetconfError> {
        let mut lock = Element::new("lock");
        lock.add_child(Element::new("target"))
            .add_child(Element::new(datastore));
        self.send_rpc(lock)
    }

    pub fn unlock(
        &mut self,
        datastore: &str,
    ) -> Result<RpcReply, NetconfError> {
        let mut unlock = Element::new("unlock");
        unlock
            .add_child(Element::new("target"))
            .add_child(Element::new(datastore));
        self.send_rpc(unlock)
    }

    /// Asks the server to validate the contents of `source`, a datastore
    /// name or `url:`-prefixed endpoint.
    pub fn validate(
        &mut self,
        source: &str,
    ) -> Result<RpcReply, NetconfError> {
        let mut validate = Element::new("validate");
        validate
            .add_child(Element::new("source"))
            .add_child(config_endpoint(source));
        self.send_rpc(validate)
    }

    /// Reverts the candidate datastore to the running configuration.
    pub fn discard_changes(&mut self) -> Result<RpcReply, NetconfError> {
        self.send_rpc(Element::new("discard-changes"))
    }

    /// Forcefully terminates another session on the server.
    pub fn kill_session(
        &mut self,
        session_id: u64,
    ) -> Result<RpcReply, NetconfError> {
        let mut kill_session = Element::new("kill-session");
        kill_session.add_child(Element::new_with_text(
            "session-id",
            &session_id.to_string(),
        ));
        self.send_rpc(kill_session)
    }

    /// Gracefully ends this session. The server closes the transport
    /// afterwards; the session value should be dropped.
    pub fn close_session(&mut self) -> Result<RpcReply, NetconfError> {
        self.send_rpc(Element::new("close-session"))
    }
}

// A bare name selects a datastore (`<candidate/>`); the `url:` prefix
// turns the remainder into a `<url>` node.
fn config_endpoint(endpoint: &str) -> Element {
    match endpoint.strip_prefix("url:") {
        Some(url) => Element::new_with_text("url", url),
        None => Element::new(endpoint),
    }
}
