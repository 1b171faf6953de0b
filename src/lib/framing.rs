// SPDX-License-Identifier: Apache-2.0

// NETCONF 1.0 end-of-message framing (RFC 6242 section 4.3). Every
// message on the wire is XML text followed by `]]>]]>`. Framing is purely
// textual; the XML structure is never inspected here.

use crate::{ErrorKind, NetconfError};

pub(crate) const END_OF_MESSAGE: &str = "]]>]]>";

pub(crate) fn frame(payload: &str) -> String {
    format!("{payload}{END_OF_MESSAGE}\n")
}

/// Strips the end-of-message marker from a raw read and verifies the
/// payload ends with the closing tag expected for the awaited message
/// kind (`</hello>`, `</rpc-reply>`).
///
/// Anything else means the transport handed back a truncated or foreign
/// message, which is a transport failure, never silently returned as
/// payload. Servers differ on whitespace between the closing tag and the
/// marker, so both sides of the marker are trimmed before anchoring.
pub(crate) fn deframe(
    raw: &str,
    delimiter: &str,
) -> Result<String, NetconfError> {
    let trimmed = raw.trim_end();
    let payload = match trimmed.strip_suffix(END_OF_MESSAGE) {
        Some(p) => p.trim_end(),
        None => {
            return Err(NetconfError::new(
                ErrorKind::TransportFailure,
                format!(
                    "reply is not terminated by {END_OF_MESSAGE}: {raw:?}"
                ),
            ));
        }
    };
    if !payload.ends_with(delimiter) {
        return Err(NetconfError::new(
            ErrorKind::TransportFailure,
            format!("reply does not end with {delimiter}: {payload:?}"),
        ));
    }
    Ok(payload.to_string())
}
