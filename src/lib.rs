//! Client authentication for an OpenVPN server driven through its management interface.
//!
//! OpenVPN started with `--management-client-auth` announces every connecting client
//! with a `>CLIENT:CONNECT` (or `>CLIENT:REAUTH`) notification followed by the client
//! environment. [`management::auth_middleware::AuthMiddleware`] collects the environment,
//! checks the submitted credentials with an [`authentication::Authenticator`] and
//! answers with `client-auth-nt` or `client-deny`.

pub mod authentication;
pub mod config;
pub mod log_utils;
pub mod management;

pub use authentication::{Authenticator, Credentials, Status};
pub use management::auth_middleware::AuthMiddleware;
pub use management::{Dispatcher, LineConsumer, LineWriter};
