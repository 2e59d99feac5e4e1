use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;

use ahash::AHashSet;
use md5::{Digest, Md5};
use parking_lot::Mutex;

use registrar::{AuthOutcome, Authenticator, SipAccount};
use sip::{Request, StatusCode, WwwAuthenticate};

/// RFC 2617 digest validation against a static credential table.
///
/// Nonces are single-use: every challenge mints one, a response is only
/// accepted over a nonce this authenticator issued, and validation
/// consumes it. A replayed Authorization header therefore earns a fresh
/// challenge, not access.
pub struct DigestAuthenticator {
    realm: String,
    credentials: HashMap<String, String>,
    nonces: Mutex<AHashSet<String>>,
}

impl DigestAuthenticator {
    pub fn new(realm: &str, credentials: HashMap<String, String>) -> Self {
        Self {
            realm: realm.to_string(),
            credentials,
            nonces: Mutex::new(AHashSet::new()),
        }
    }

    fn challenge(&self) -> AuthOutcome {
        let challenge = WwwAuthenticate::new(&self.realm);
        self.nonces.lock().insert(challenge.nonce.clone());

        AuthOutcome {
            authenticated: false,
            error_response: StatusCode::Unauthorized,
            challenge: Some(challenge),
        }
    }

    fn check(&self, request: &Request, account: &SipAccount) -> AuthOutcome {
        let Some(authorization) = &request.authorization else {
            return self.challenge();
        };

        // A user we have no password for cannot ever succeed; 403 stops
        // the device from hammering the challenge loop.
        let Some(password) = self.credentials.get(&authorization.username) else {
            log::info!(
                "unknown register user: username={:?}, account={}",
                authorization.username,
                account
            );

            return AuthOutcome::forbidden(&self.realm);
        };

        if authorization.realm != self.realm {
            return self.challenge();
        }

        // The nonce must be one of ours and is consumed by the attempt.
        if !self.nonces.lock().remove(&authorization.nonce) {
            return self.challenge();
        }

        let expected = digest(
            &authorization.username,
            &self.realm,
            password,
            "REGISTER",
            &authorization.uri,
            &authorization.nonce,
        );

        if expected == authorization.response.to_lowercase() {
            AuthOutcome::granted()
        } else {
            self.challenge()
        }
    }
}

impl Authenticator for DigestAuthenticator {
    fn authenticate(
        &self,
        _local: SocketAddr,
        _remote: SocketAddr,
        request: &Request,
        account: &SipAccount,
    ) -> impl Future<Output = AuthOutcome> + Send {
        let outcome = self.check(request, account);
        async move { outcome }
    }
}

/// response = MD5(MD5(username:realm:password):nonce:MD5(method:uri))
fn digest(
    username: &str,
    realm: &str,
    password: &str,
    method: &str,
    uri: &str,
    nonce: &str,
) -> String {
    let ha1 = md5_hex(&format!("{}:{}:{}", username, realm, password));
    let ha2 = md5_hex(&format!("{}:{}", method, uri));
    md5_hex(&format!("{}:{}:{}", ha1, nonce, ha2))
}

fn md5_hex(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}
