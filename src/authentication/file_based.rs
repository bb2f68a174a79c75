use crate::authentication::{Authenticator, Credentials, Error, Status};
use crate::{authentication, log_id, log_utils};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use toml_edit::{Document, Item};

/// Checks client credentials against a TOML file of the form
///
/// ```toml
/// [[client]]
/// username = "alice"
/// password = "secret"
///
/// [[client]]
/// username = "bob"
/// password_sha256 = "..."
/// valid_till = 1893456000
/// ```
///
/// The file is read on every request, so the changes are picked up without a restart.
pub struct FileBasedAuthenticator {
    credentials_file_path: PathBuf,
}

impl FileBasedAuthenticator {
    pub fn new<P: Into<PathBuf>>(credentials_file_path: P) -> Self {
        Self {
            credentials_file_path: credentials_file_path.into(),
        }
    }

    pub fn credentials_file_path(&self) -> &Path {
        &self.credentials_file_path
    }

    fn now_unix_ts() -> Option<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs())
    }

    fn is_valid_client(doc: &Document, credentials: &Credentials<'_>, now: Option<u64>) -> bool {
        let clients = match doc.get("client").and_then(Item::as_array_of_tables) {
            Some(x) => x,
            None => return false,
        };

        for client in clients.iter() {
            let Some(username) = client.get("username").and_then(Item::as_str) else {
                continue;
            };
            if username != credentials.username {
                continue;
            }

            if let Some(valid_till) = client
                .get("valid_till")
                .and_then(Item::as_integer)
                .and_then(|x| u64::try_from(x).ok())
            {
                if let Some(now) = now {
                    if now > valid_till {
                        continue;
                    }
                }
            }

            if let Some(password) = client.get("password").and_then(Item::as_str) {
                if password == credentials.password {
                    return true;
                }
            }

            if let Some(token) = client.get("password_sha256").and_then(Item::as_str) {
                let expected =
                    authentication::token_from_credentials(username, &credentials.password);
                if token.eq_ignore_ascii_case(&expected) {
                    return true;
                }
            }
        }

        false
    }
}

impl Authenticator for FileBasedAuthenticator {
    fn authenticate(
        &self,
        credentials: &Credentials<'_>,
        log_id: &log_utils::IdChain<u64>,
    ) -> Result<Status, Error> {
        let content = std::fs::read_to_string(&self.credentials_file_path).map_err(|e| {
            log_id!(
                error, log_id, "Failed to read credentials file {}: {}",
                self.credentials_file_path.display(), e
            );
            Error::Io(e)
        })?;

        let doc: Document = content.parse().map_err(|e| {
            log_id!(
                error, log_id, "Invalid credentials file {}: {}",
                self.credentials_file_path.display(), e
            );
            Error::InvalidDocument(e)
        })?;

        if Self::is_valid_client(&doc, credentials, Self::now_unix_ts()) {
            Ok(Status::Pass)
        } else {
            log_id!(debug, log_id, "No matching client for {:?}", credentials);
            Ok(Status::Reject)
        }
    }
}
