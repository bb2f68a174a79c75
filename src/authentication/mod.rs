pub mod file_based;


use std::borrow::Cow;
use std::io;
use crate::log_utils;


/// Credentials a client submitted through its connection environment
#[derive(Clone, PartialEq)]
pub struct Credentials<'this> {
    pub username: Cow<'this, str>,
    pub password: Cow<'this, str>,
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"__stripped__")
            .finish()
    }
}

/// Authentication procedure status
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Status {
    /// Success
    Pass,
    /// Failure
    Reject,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("credential storage I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error("invalid credential document: {0}")]
    InvalidDocument(#[from] toml_edit::TomlError),
    #[error("authentication backend failure: {0}")]
    Backend(String),
}

/// The authenticator abstract interface
pub trait Authenticator: Send + Sync {
    /// Authenticate client.
    /// An error means the decision could not be made at all.
    fn authenticate(
        &self,
        credentials: &Credentials<'_>,
        log_id: &log_utils::IdChain<u64>,
    ) -> Result<Status, Error>;
}

impl<F> Authenticator for F
where
    F: Fn(&Credentials<'_>) -> Result<Status, Error> + Send + Sync,
{
    fn authenticate(
        &self,
        credentials: &Credentials<'_>,
        _log_id: &log_utils::IdChain<u64>,
    ) -> Result<Status, Error> {
        self(credentials)
    }
}

/// Make the token which is stored in a credential file instead of a plain password
pub fn token_from_credentials(username: &str, password: &str) -> String {
    let data = format!("{username}:{password}");
    let digest = ring::digest::digest(&ring::digest::SHA256, data.as_bytes());
    hex::encode(digest.as_ref())
}

impl<'a> Credentials<'a> {
    pub fn new(username: &'a str, password: &'a str) -> Self {
        Self {
            username: Cow::Borrowed(username),
            password: Cow::Borrowed(password),
        }
    }

    pub fn into_owned(self) -> Credentials<'static> {
        Credentials {
            username: Cow::Owned(self.username.into_owned()),
            password: Cow::Owned(self.password.into_owned()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_scrubs_password() {
        let credentials = Credentials::new("alice", "secret_password");
        let debug_output = format!("{:?}", credentials);
        assert!(debug_output.contains("alice"));
        assert!(!debug_output.contains("secret_password"));
        assert!(debug_output.contains("__stripped__"));
    }

    fn alice_only(credentials: &Credentials<'_>) -> Result<Status, Error> {
        match credentials.username.as_ref() {
            "alice" => Ok(Status::Pass),
            _ => Ok(Status::Reject),
        }
    }

    #[test]
    fn function_is_authenticator() {
        let log_id = log_utils::IdChain::empty();
        assert_eq!(
            alice_only.authenticate(&Credentials::new("alice", ""), &log_id).unwrap(),
            Status::Pass,
        );
        assert_eq!(
            alice_only.authenticate(&Credentials::new("bob", ""), &log_id).unwrap(),
            Status::Reject,
        );
    }

    #[test]
    fn token_is_sha256_hex() {
        let token = token_from_credentials("username", "password");
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, token_from_credentials("username", "password"));
        assert_ne!(token, token_from_credentials("username", "password1"));
    }

    #[test]
    fn owned_credentials_keep_values() {
        let owned = {
            let username = String::from("alice");
            let password = String::from("secret");
            Credentials::new(&username, &password).into_owned()
        };
        assert_eq!(owned.username, "alice");
        assert_eq!(owned.password, "secret");
    }
}
