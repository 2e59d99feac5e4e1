use std::fmt;

use rand::{Rng, distr::Alphanumeric};

/// Generate a fresh nonce for a digest challenge.
///
/// The nonce is an opaque server value; clients echo it back in the
/// Authorization header. A new one is minted for every challenge so a
/// captured response cannot be replayed against a later challenge.
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// The `WWW-Authenticate` challenge header.
///
/// [rfc3261](https://tools.ietf.org/html/rfc3261#section-22)
///
/// SIP reuses HTTP digest authentication: the server challenges with a
/// realm and nonce, the client answers with a digest computed over its
/// credentials and the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WwwAuthenticate {
    pub realm: String,
    pub nonce: String,
}

impl WwwAuthenticate {
    pub fn new(realm: &str) -> Self {
        Self {
            realm: realm.to_string(),
            nonce: generate_nonce(),
        }
    }
}

impl fmt::Display for WwwAuthenticate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Digest realm=\"{}\", nonce=\"{}\", algorithm=MD5",
            self.realm, self.nonce
        )
    }
}

/// The client's `Authorization` digest response, as handed over by the
/// transport's parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestAuthorization {
    pub username: String,
    pub realm: String,
    pub nonce: String,
    pub uri: String,
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::{WwwAuthenticate, generate_nonce};

    #[test]
    fn test_nonce_is_fresh() {
        let a = generate_nonce();
        let b = generate_nonce();

        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_challenge_display() {
        let challenge = WwwAuthenticate {
            realm: "3402000000".to_string(),
            nonce: "abcd".to_string(),
        };

        assert_eq!(
            challenge.to_string(),
            "Digest realm=\"3402000000\", nonce=\"abcd\", algorithm=MD5"
        );
    }
}
