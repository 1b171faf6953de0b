// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use crate::{ErrorKind, NetconfError};

/// Credentials used to authenticate the SSH transport.
///
/// Each variant is validated by its constructor, so a built value is
/// always complete; there is no runtime parameter lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Authenticator {
    Password {
        username: String,
        password: String,
    },
    PrivateKeyFile {
        username: String,
        key_file: PathBuf,
        passphrase: Option<String>,
    },
}

impl Authenticator {
    pub fn password(
        username: &str,
        password: &str,
    ) -> Result<Self, NetconfError> {
        if username.is_empty() {
            return Err(NetconfError::new(
                ErrorKind::InvalidArgument,
                "username cannot be empty".to_string(),
            ));
        }
        Ok(Self::Password {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn private_key_file(
        username: &str,
        key_file: &Path,
        passphrase: Option<&str>,
    ) -> Result<Self, NetconfError> {
        if username.is_empty() {
            return Err(NetconfError::new(
                ErrorKind::InvalidArgument,
                "username cannot be empty".to_string(),
            ));
        }
        if !key_file.is_file() {
            return Err(NetconfError::new(
                ErrorKind::InvalidArgument,
                format!("private key file {} not found", key_file.display()),
            ));
        }
        Ok(Self::PrivateKeyFile {
            username: username.to_string(),
            key_file: key_file.to_path_buf(),
            passphrase: passphrase.map(str::to_string),
        })
    }

    #[cfg(feature = "ssh")]
    pub(crate) fn authenticate(
        &self,
        session: &ssh2::Session,
    ) -> Result<(), NetconfError> {
        match self {
            Self::Password { username, password } => session
                .userauth_password(username, password)
                .map_err(parse_auth_error)?,
            Self::PrivateKeyFile {
                username,
                key_file,
                passphrase,
            } => session
                .userauth_pubkey_file(
                    username,
                    None,
                    key_file,
                    passphrase.as_deref(),
                )
                .map_err(parse_auth_error)?,
        }
        if !session.authenticated() {
            return Err(NetconfError::new(
                ErrorKind::AuthenticationFailure,
                "server did not accept the supplied credentials".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "ssh")]
fn parse_auth_error(e: ssh2::Error) -> NetconfError {
    NetconfError::new(
        ErrorKind::AuthenticationFailure,
        format!("SSH authentication failed: {e}"),
    )
}
