// SPDX-License-Identifier: Apache-2.0

use crate::xml::Element;
use crate::NetconfError;

/// Parsed `<rpc-reply>` of a single request/reply exchange.
///
/// Owns its document; no reference back to the session that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcReply {
    message_id: u64,
    document: Element,
    ok: bool,
    errors: Vec<RpcError>,
}

/// One `<rpc-error>` entry of a reply.
///
/// Every field is the text of the correspondingly named child element.
/// `None` means the server omitted the child; a present-but-empty element
/// yields `Some("")`, so the two cases stay distinguishable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct RpcError {
    pub error_type: Option<String>,
    pub error_tag: Option<String>,
    pub error_severity: Option<String>,
    pub error_app_tag: Option<String>,
    pub error_path: Option<String>,
    pub error_info: Option<String>,
}

impl RpcError {
    fn from_element(element: &Element) -> Self {
        Self {
            error_type: owned_child_text(element, "error-type"),
            error_tag: owned_child_text(element, "error-tag"),
            error_severity: owned_child_text(element, "error-severity"),
            error_app_tag: owned_child_text(element, "error-app-tag"),
            error_path: owned_child_text(element, "error-path"),
            error_info: owned_child_text(element, "error-info"),
        }
    }
}

impl RpcReply {
    pub(crate) fn parse(xml: &str) -> Result<Self, NetconfError> {
        let document = Element::parse(xml)?;
        // Servers are not required to echo the message-id on malformed
        // exchanges; absent or unparsable stays 0.
        let message_id = document
            .attribute("message-id")
            .and_then(|id| id.trim().parse().ok())
            .unwrap_or(0);
        let ok = document.has_child("ok");
        let errors = document
            .children_named("rpc-error")
            .map(RpcError::from_element)
            .collect();
        Ok(Self {
            message_id,
            document,
            ok,
            errors,
        })
    }

    /// Correlation id echoed by the server, 0 if it was absent.
    pub fn message_id(&self) -> u64 {
        self.message_id
    }

    /// An exchange is OK when the reply carries an explicit `<ok/>` or no
    /// `<rpc-error>` at all. `<ok/>` wins even when errors are present:
    /// the protocol allows warning-severity errors next to a success
    /// marker.
    pub fn is_ok(&self) -> bool {
        self.ok || self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `<rpc-error>` entries in document order, empty when none.
    pub fn errors(&self) -> &[RpcError] {
        self.errors.as_slice()
    }

    /// The reply document, usable as a success payload only when
    /// [Self::is_ok].
    pub fn reply_body(&self) -> Option<&Element> {
        if self.is_ok() {
            Some(&self.document)
        } else {
            None
        }
    }

    /// The reply document regardless of outcome, for error forensics.
    pub fn document(&self) -> &Element {
        &self.document
    }
}

fn owned_child_text(element: &Element, name: &str) -> Option<String> {
    element.child_text(name).map(str::to_string)
}
