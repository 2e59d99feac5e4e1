use std::future::Future;
use std::net::SocketAddr;

use sip::{Request, StatusCode, WwwAuthenticate};

use crate::account::SipAccount;

/// The authenticator's verdict on one REGISTER.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub authenticated: bool,
    /// Status the worker answers with when not authenticated; anything
    /// other than 403 is treated as a challengeable 401.
    pub error_response: StatusCode,
    /// Challenge to attach to the rejection. The worker mints a fresh one
    /// when the authenticator leaves this empty.
    pub challenge: Option<WwwAuthenticate>,
}

impl AuthOutcome {
    /// Credentials verified.
    pub fn granted() -> Self {
        Self {
            authenticated: true,
            error_response: StatusCode::Ok,
            challenge: None,
        }
    }

    /// No or stale credentials: 401 with a fresh challenge.
    pub fn challenge(realm: &str) -> Self {
        Self {
            authenticated: false,
            error_response: StatusCode::Unauthorized,
            challenge: Some(WwwAuthenticate::new(realm)),
        }
    }

    /// Credentials present and definitively wrong.
    pub fn forbidden(realm: &str) -> Self {
        Self {
            authenticated: false,
            error_response: StatusCode::Forbidden,
            challenge: Some(WwwAuthenticate::new(realm)),
        }
    }
}

/// The digest-validation collaborator.
///
/// The worker hands over the endpoints, the parsed request and the
/// account synthesized from the To header; the authenticator owns nonce
/// bookkeeping and credential lookup. Never invoked when the local
/// account has authentication disabled.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        request: &Request,
        account: &SipAccount,
    ) -> impl Future<Output = AuthOutcome> + Send;
}
