// SPDX-License-Identifier: Apache-2.0

use crate::NetconfError;

/// Reliable byte transport carrying NETCONF messages.
///
/// The engine only ever writes a complete framed message and then blocks
/// until the end-of-message marker shows up, so this is the whole
/// contract. The transport owns connection setup, authentication and
/// timeouts; a timed-out or interrupted read surfaces as an error and the
/// session on top of it must be re-established.
pub trait Transport {
    fn write(&mut self, data: &[u8]) -> Result<(), NetconfError>;

    /// Blocks until `delimiter` has been observed and returns everything
    /// read up to and including it. Bytes received after the delimiter
    /// must be retained for the next call.
    fn read_until(&mut self, delimiter: &str)
        -> Result<String, NetconfError>;
}
