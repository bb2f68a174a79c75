use std::collections::HashMap;
use crate::authentication::{Authenticator, Credentials, Status};
use crate::management::{Error, LineConsumer, LineWriter};
use crate::{log_id, log_utils};


const CLIENT_CONNECT_PREFIX: &str = ">CLIENT:CONNECT,";
const CLIENT_REAUTH_PREFIX: &str = ">CLIENT:REAUTH,";
const CLIENT_ENV_PREFIX: &str = ">CLIENT:ENV,";
const CLIENT_ENV_END: &str = "END";

const USERNAME_KEY: &str = "username";
const PASSWORD_KEY: &str = "password";
const DENY_REASON: &str = "wrong username or password";


/// A recognized management interface line
#[derive(Debug, PartialEq)]
enum ClientLine<'a> {
    /// `>CLIENT:CONNECT,<cid>,<kid>` or `>CLIENT:REAUTH,<cid>,<kid>`
    Begin { client_id: u64, key_id: u64 },
    /// `>CLIENT:ENV,<key>=<value>`
    Env { key: &'a str, value: &'a str },
    /// `>CLIENT:ENV,END`
    End,
}

/// Client authentication attempt which is in flight
struct Session {
    client_id: u64,
    key_id: u64,
    env: HashMap<String, String>,
    log_id: log_utils::IdChain<u64>,
}

/// Handles the client authentication part of the management interface:
/// collects the environment of a connecting client, asks the [`Authenticator`]
/// and tells OpenVPN whether the client should be admitted.
///
/// An instance serves a single management connection.
pub struct AuthMiddleware<A> {
    authenticator: A,
    writer: Option<Box<dyn LineWriter>>,
    session: Option<Session>,
}

fn parse_ids(s: &str) -> Option<(u64, u64)> {
    let (client_id, key_id) = s.split_once(',')?;
    Some((parse_id(client_id)?, parse_id(key_id)?))
}

fn parse_id(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_line(line: &str) -> Option<ClientLine<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(ids) = line.strip_prefix(CLIENT_CONNECT_PREFIX)
        .or_else(|| line.strip_prefix(CLIENT_REAUTH_PREFIX))
    {
        return parse_ids(ids)
            .map(|(client_id, key_id)| ClientLine::Begin { client_id, key_id });
    }

    let env = line.strip_prefix(CLIENT_ENV_PREFIX)?;
    if env == CLIENT_ENV_END {
        return Some(ClientLine::End);
    }

    match env.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some(ClientLine::Env { key, value }),
        _ => None,
    }
}

impl Session {
    fn new(client_id: u64, key_id: u64) -> Self {
        Self {
            client_id,
            key_id,
            env: Default::default(),
            log_id: log_utils::IdChain::from(log_utils::IdItem::new(log_utils::CLIENT_ID_FMT, client_id))
                .extended(log_utils::IdItem::new(log_utils::KEY_ID_FMT, key_id)),
        }
    }

    fn env_value(&self, key: &str) -> &str {
        self.env.get(key).map(String::as_str).unwrap_or_default()
    }
}

impl<A: Authenticator> AuthMiddleware<A> {
    pub fn new(authenticator: A) -> Self {
        Self {
            authenticator,
            writer: None,
            session: None,
        }
    }

    /// Attach the sink for the responses. A subsequent call replaces the previous writer.
    pub fn start<W: LineWriter + 'static>(&mut self, writer: W) {
        if self.writer.is_some() {
            log::debug!("Replacing management interface writer");
        }
        self.writer = Some(Box::new(writer));
    }

    pub fn authenticator(&self) -> &A {
        &self.authenticator
    }

    /// Whether a client authentication attempt is being collected at the moment
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Handle a line received from the management interface.
    /// Returns `false` if the line is not related to client authentication.
    pub fn consume_line(&mut self, line: &str) -> Result<bool, Error> {
        let parsed = match parse_line(line) {
            Some(x) => x,
            None => return Ok(false),
        };

        match parsed {
            ClientLine::Begin { client_id, key_id } => {
                let session = Session::new(client_id, key_id);
                if let Some(stale) = self.session.replace(session) {
                    log_id!(
                        debug, stale.log_id,
                        "Dropping unfinished session in favor of [CID={}][KID={}]", client_id, key_id
                    );
                }
                if let Some(s) = self.session.as_ref() {
                    log_id!(debug, s.log_id, "Client authentication started");
                }
            }
            ClientLine::Env { key, value } => match self.session.as_mut() {
                Some(s) => {
                    s.env.insert(key.to_string(), value.to_string());
                }
                None => log::trace!("Environment entry without client session: {}", key),
            },
            ClientLine::End => match self.session.take() {
                Some(s) => self.finish_session(s)?,
                None => log::debug!("End of client environment without client session, ignoring"),
            },
        }

        Ok(true)
    }

    fn finish_session(&mut self, session: Session) -> Result<(), Error> {
        let log_id = &session.log_id;
        let writer = match self.writer.as_mut() {
            Some(x) => x,
            None => {
                log_id!(error, log_id, "Unable to respond: management interface writer is not attached");
                return Err(Error::NotStarted);
            }
        };

        let credentials = Credentials::new(
            session.env_value(USERNAME_KEY),
            session.env_value(PASSWORD_KEY),
        );
        let status = self.authenticator.authenticate(&credentials, log_id)
            .map_err(|e| {
                log_id!(debug, log_id, "Authenticator failure: {}", e);
                Error::from(e)
            })?;

        log_id!(debug, log_id, "Client {:?}: {:?}", credentials.username, status);
        let result = match status {
            Status::Pass => writer.write_line(format_args!(
                "client-auth-nt {} {}", session.client_id, session.key_id,
            )),
            Status::Reject => writer.write_line(format_args!(
                "client-deny {} {} {}", session.client_id, session.key_id, DENY_REASON,
            )),
        };
        result.map_err(|e| {
            log_id!(debug, log_id, "Failed to send response: {}", e);
            Error::Write(e)
        })
    }
}

impl<A: Authenticator> LineConsumer for AuthMiddleware<A> {
    fn consume_line(&mut self, line: &str) -> Result<bool, Error> {
        AuthMiddleware::consume_line(self, line)
    }
}
