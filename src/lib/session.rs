// SPDX-License-Identifier: Apache-2.0

use crate::framing;
use crate::transport::Transport;
use crate::xml::Element;
use crate::{ErrorKind, NetconfError, RpcReply};

const BASE_CAPABILITY: &str = "urn:ietf:params:netconf:base:1.0";
const BASE_NAMESPACE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

const DEFAULT_PORT: u16 = 830;
const DEFAULT_TIMEOUT: u32 = 120;

/// Tunables applied once at session construction. Everything else the
/// engine needs is derived.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetconfOptions {
    /// TCP port of the NETCONF subsystem, 830 by default.
    pub port: u16,
    /// Transport read/write timeout in seconds, 120 by default. Applied
    /// at transport setup; the engine has no per-call timeout.
    pub timeout: u32,
    /// Capability URIs announced in addition to the NETCONF 1.0 base
    /// capability.
    pub capabilities: Vec<String>,
}

impl Default for NetconfOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            capabilities: Vec::new(),
        }
    }
}

impl NetconfOptions {
    pub(crate) fn validate(&self) -> Result<(), NetconfError> {
        if self.timeout == 0 {
            return Err(NetconfError::new(
                ErrorKind::InvalidArgument,
                "timeout cannot be 0 seconds".to_string(),
            ));
        }
        Ok(())
    }
}

/// One NETCONF session over one exclusive transport.
///
/// A session supports a single in-flight RPC: every exchange blocks until
/// the reply's end-of-message marker arrives. The mutable bookkeeping
/// (message-id counter, send history) is not synchronized; a session
/// shared across threads needs external locking.
pub struct NetconfSession {
    transport: Box<dyn Transport>,
    session_id: u64,
    local_capabilities: Vec<String>,
    remote_capabilities: Vec<String>,
    message_id: u64,
    send_history: Vec<String>,
}

impl std::fmt::Debug for NetconfSession {
    // The transport is opaque; everything else is worth dumping.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetconfSession")
            .field("session_id", &self.session_id)
            .field("local_capabilities", &self.local_capabilities)
            .field("remote_capabilities", &self.remote_capabilities)
            .field("message_id", &self.message_id)
            .field("send_history", &self.send_history)
            .finish()
    }
}

impl NetconfSession {
    /// Runs the hello exchange on an already-authenticated transport:
    /// reads the server hello (the server always speaks first), records
    /// session-id and remote capabilities, then announces ours.
    pub fn new(
        transport: Box<dyn Transport>,
        options: &NetconfOptions,
    ) -> Result<Self, NetconfError> {
        options.validate()?;
        let mut local_capabilities = vec![BASE_CAPABILITY.to_string()];
        for capability in &options.capabilities {
            if !local_capabilities.contains(capability) {
                local_capabilities.push(capability.clone());
            }
        }
        let mut session = Self {
            transport,
            session_id: 0,
            local_capabilities,
            remote_capabilities: Vec::new(),
            message_id: 0,
            send_history: Vec::new(),
        };
        session.exchange_hellos()?;
        Ok(session)
    }

    /// Connects to `host` over SSH, authenticates and opens a session on
    /// the `netconf` subsystem.
    #[cfg(feature = "ssh")]
    pub fn connect(
        host: &str,
        auth: &crate::Authenticator,
        options: &NetconfOptions,
    ) -> Result<Self, NetconfError> {
        options.validate()?;
        let transport = crate::SshTransport::connect(host, auth, options)?;
        Self::new(Box::new(transport), options)
    }

    fn exchange_hellos(&mut self) -> Result<(), NetconfError> {
        let server_hello = self.read_reply("</hello>")?;
        let server_hello =
            Element::parse(&server_hello).map_err(parse_hello_error)?;

        self.session_id = match server_hello.child_text("session-id") {
            Some(id) => id.trim().parse().map_err(|_| {
                NetconfError::new(
                    ErrorKind::HandshakeFailure,
                    format!("server hello session-id is not a number: {id}"),
                )
            })?,
            None => {
                return Err(NetconfError::new(
                    ErrorKind::HandshakeFailure,
                    "server hello carries no session-id".to_string(),
                ));
            }
        };

        let capabilities = server_hello.child("capabilities").ok_or_else(
            || {
                NetconfError::new(
                    ErrorKind::HandshakeFailure,
                    "server hello carries no capabilities".to_string(),
                )
            },
        )?;
        self.remote_capabilities = capabilities
            .children_named("capability")
            .map(|c| c.text().trim().to_string())
            .collect();

        self.send_hello()
    }

    // Our hello is the one message that is sent without awaiting a reply.
    fn send_hello(&mut self) -> Result<(), NetconfError> {
        let mut hello = Element::new("hello");
        hello.set_attribute("xmlns", BASE_NAMESPACE);
        let capabilities = hello.add_child(Element::new("capabilities"));
        for capability in &self.local_capabilities {
            capabilities
                .add_child(Element::new_with_text("capability", capability));
        }
        let payload = hello.to_xml()?;
        self.send_raw(&payload)
    }

    /// Wraps `body` in an `<rpc>` envelope with the next message-id,
    /// sends it and blocks for the reply. This is the sole path by which
    /// any operation reaches the wire.
    pub fn send_rpc(
        &mut self,
        body: Element,
    ) -> Result<RpcReply, NetconfError> {
        self.message_id += 1;
        let mut rpc = Element::new("rpc");
        rpc.set_attribute("message-id", &self.message_id.to_string());
        rpc.add_child(body);
        let payload = rpc.to_xml()?;
        self.send_raw(&payload)?;

        let reply = self.read_reply("</rpc-reply>")?;
        let reply = RpcReply::parse(&reply)?;
        if reply.message_id() != 0 && reply.message_id() != self.message_id {
            // With one outstanding request a mismatched echo is server
            // misbehavior, but the reply still belongs to our RPC.
            log::debug!(
                "NETCONF: reply message-id {} does not match sent {}",
                reply.message_id(),
                self.message_id
            );
        }
        Ok(reply)
    }

    fn send_raw(&mut self, payload: &str) -> Result<(), NetconfError> {
        log::debug!("NETCONF: sending {payload}");
        self.send_history.push(payload.to_string());
        self.transport
            .write(framing::frame(payload).as_bytes())
    }

    fn read_reply(
        &mut self,
        delimiter: &str,
    ) -> Result<String, NetconfError> {
        let raw = self.transport.read_until(framing::END_OF_MESSAGE)?;
        log::debug!("NETCONF: received {raw}");
        framing::deframe(&raw, delimiter)
    }

    /// Server-assigned session identifier, 0 until the hello exchange has
    /// completed.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn local_capabilities(&self) -> &[String] {
        self.local_capabilities.as_slice()
    }

    /// Capability URIs announced by the server. Informational only; the
    /// engine does not enforce them.
    pub fn remote_capabilities(&self) -> &[String] {
        self.remote_capabilities.as_slice()
    }

    pub fn has_remote_capability(&self, capability: &str) -> bool {
        self.remote_capabilities
            .iter()
            .any(|c| c == capability)
    }

    /// message-id carried by the most recently sent RPC; 0 before the
    /// first one.
    pub fn message_id(&self) -> u64 {
        self.message_id
    }

    /// Every payload transmitted on this session, hello included, oldest
    /// first. Diagnostic only and unbounded; see [Self::clear_send_history].
    pub fn send_history(&self) -> &[String] {
        self.send_history.as_slice()
    }

    pub fn clear_send_history(&mut self) {
        self.send_history.clear();
    }
}

fn parse_hello_error(e: NetconfError) -> NetconfError {
    NetconfError::new(
        ErrorKind::HandshakeFailure,
        format!("malformed server hello: {}", e.msg()),
    )
}
