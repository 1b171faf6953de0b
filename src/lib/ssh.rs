// SPDX-License-Identifier: Apache-2.0

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::transport::Transport;
use crate::{Authenticator, ErrorKind, NetconfError, NetconfOptions};

const BUFFER_SIZE: usize = 4096;

/// Blocking SSH transport: TCP connect, authenticate, open a channel and
/// request the `netconf` subsystem. One transport carries one session.
pub struct SshTransport {
    // Retained so the SSH session outlives the channel explicitly.
    _session: ssh2::Session,
    channel: ssh2::Channel,
    // Bytes received beyond the last delimiter, consumed first on the
    // next read.
    pending: Vec<u8>,
}

impl SshTransport {
    pub fn connect(
        host: &str,
        auth: &Authenticator,
        options: &NetconfOptions,
    ) -> Result<Self, NetconfError> {
        let timeout = Duration::from_secs(u64::from(options.timeout));
        let stream = tcp_connect(host, options.port, timeout)?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(parse_connect_error)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(parse_connect_error)?;

        let mut session = ssh2::Session::new().map_err(parse_ssh_error)?;
        session.set_tcp_stream(stream);
        session.set_timeout(timeout_millis(timeout));
        session.handshake().map_err(parse_ssh_error)?;

        auth.authenticate(&session)?;

        let mut channel =
            session.channel_session().map_err(parse_ssh_error)?;
        channel.subsystem("netconf").map_err(parse_ssh_error)?;

        Ok(Self {
            _session: session,
            channel,
            pending: Vec::new(),
        })
    }
}

impl Transport for SshTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), NetconfError> {
        self.channel.write_all(data)?;
        self.channel.flush()?;
        Ok(())
    }

    fn read_until(
        &mut self,
        delimiter: &str,
    ) -> Result<String, NetconfError> {
        let delimiter = delimiter.as_bytes();
        loop {
            if let Some(pos) = find_subsequence(&self.pending, delimiter) {
                let message: Vec<u8> =
                    self.pending.drain(..pos + delimiter.len()).collect();
                return String::from_utf8(message).map_err(|e| {
                    NetconfError::new(
                        ErrorKind::TransportFailure,
                        format!("reply is not valid UTF-8: {e}"),
                    )
                });
            }
            let mut buffer = [0u8; BUFFER_SIZE];
            let read = self.channel.read(&mut buffer)?;
            if read == 0 {
                return Err(NetconfError::new(
                    ErrorKind::TransportFailure,
                    "connection closed before end-of-message marker"
                        .to_string(),
                ));
            }
            self.pending.extend_from_slice(&buffer[..read]);
        }
    }
}

fn tcp_connect(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, NetconfError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(parse_connect_error)?;
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(match last_error {
        Some(e) => parse_connect_error(e),
        None => NetconfError::new(
            ErrorKind::TransportFailure,
            format!("{host}:{port} did not resolve to any address"),
        ),
    })
}

// `ssh2` takes milliseconds as u32; an over-large timeout saturates
// instead of wrapping.
pub(crate) fn timeout_millis(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_connect_error(e: std::io::Error) -> NetconfError {
    NetconfError::new(
        ErrorKind::TransportFailure,
        format!("failed to connect: {e}"),
    )
}

fn parse_ssh_error(e: ssh2::Error) -> NetconfError {
    NetconfError::new(
        ErrorKind::TransportFailure,
        format!("SSH error: {e}"),
    )
}
