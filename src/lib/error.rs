// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Caller supplied an invalid option or argument.
    InvalidArgument,
    /// TCP or SSH level failure: connect, read, write, timeout, or a reply
    /// that was not terminated by the end-of-message marker.
    TransportFailure,
    /// The server rejected the supplied credentials.
    AuthenticationFailure,
    /// The hello exchange failed: missing `session-id` or malformed
    /// capability announcement. The session is unusable.
    HandshakeFailure,
    /// The server sent a reply that is not well-formed XML.
    MalformedReply,
    Bug,
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::Bug
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Fatal failure of a NETCONF exchange.
///
/// Protocol-level `<rpc-error>` entries are not represented here: the
/// server answering with an error reply is a completed exchange, reported
/// as data on [crate::RpcReply] for the caller to inspect.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetconfError {
    kind: ErrorKind,
    msg: String,
}

impl std::fmt::Display for NetconfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl Error for NetconfError {}

impl NetconfError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }
}

impl From<std::io::Error> for NetconfError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::TransportFailure, format!("IO failure: {e}"))
    }
}
