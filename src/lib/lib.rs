// SPDX-License-Identifier: Apache-2.0

mod auth;
mod error;
mod filter;
mod framing;
mod ops;
mod rpc;
mod session;
#[cfg(feature = "ssh")]
mod ssh;
mod transport;
mod xml;

pub use crate::auth::Authenticator;
pub use crate::error::{ErrorKind, NetconfError};
pub use crate::filter::{FilterPath, FilterSpec};
pub use crate::ops::{
    CommitOptions, DefaultOperation, EditConfigOptions, ErrorOption,
    TestOption,
};
pub use crate::rpc::{RpcError, RpcReply};
pub use crate::session::{NetconfOptions, NetconfSession};
#[cfg(feature = "ssh")]
pub use crate::ssh::SshTransport;
pub use crate::transport::Transport;
pub use crate::xml::Element;
