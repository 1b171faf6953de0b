// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::rc::Rc;

use crate::transport::Transport;
use crate::{
    ErrorKind, NetconfError, NetconfOptions, NetconfSession,
};

pub(crate) const SERVER_HELLO: &str = "<hello \
     xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
     <capabilities>\
     <capability>urn:ietf:params:netconf:base:1.0</capability>\
     <capability>urn:ietf:params:netconf:capability:candidate:1.0</capability>\
     </capabilities>\
     <session-id>4711</session-id>\
     </hello>";

pub(crate) const OK_REPLY: &str =
    "<rpc-reply message-id=\"0\"><ok/></rpc-reply>";

pub(crate) const FAILED_REPLY: &str = "<rpc-reply message-id=\"0\">\
     <rpc-error>\
     <error-type>protocol</error-type>\
     <error-tag>lock-denied</error-tag>\
     <error-severity>error</error-severity>\
     </rpc-error>\
     </rpc-reply>";

/// Transport fed from a script of canned server messages. Every message
/// is handed out framed, in order, one per `read_until` call; written
/// data is recorded behind a shared handle for assertions.
pub(crate) struct TestTransport {
    replies: Vec<String>,
    written: Rc<RefCell<Vec<String>>>,
}

impl TestTransport {
    pub(crate) fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().rev().map(|r| r.to_string()).collect(),
            written: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Handle to everything written, usable after the transport has been
    /// moved into a session.
    pub(crate) fn written(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.written)
    }
}

impl Transport for TestTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), NetconfError> {
        self.written
            .borrow_mut()
            .push(String::from_utf8_lossy(data).to_string());
        Ok(())
    }

    fn read_until(
        &mut self,
        _delimiter: &str,
    ) -> Result<String, NetconfError> {
        match self.replies.pop() {
            Some(reply) => Ok(format!("{reply}\n]]>]]>")),
            None => Err(NetconfError::new(
                ErrorKind::TransportFailure,
                "test script exhausted".to_string(),
            )),
        }
    }
}

/// Session over a [TestTransport] whose first scripted message is the
/// server hello; `replies` are handed out to subsequent RPCs in order.
pub(crate) fn new_test_session(replies: &[&str]) -> NetconfSession {
    let mut script = vec![SERVER_HELLO];
    script.extend_from_slice(replies);
    NetconfSession::new(
        Box::new(TestTransport::new(&script)),
        &NetconfOptions::default(),
    )
    .unwrap()
}

/// The reply with its patched-in message-id, as servers echo the id of
/// the request they answer.
pub(crate) fn with_message_id(reply: &str, message_id: u64) -> String {
    reply.replace(
        "message-id=\"0\"",
        &format!("message-id=\"{message_id}\""),
    )
}
