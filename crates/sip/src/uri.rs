use std::fmt;

/// A `sip:` URI.
///
/// GB28181 addresses-of-record are numeric device identifiers in the user
/// part and the served domain in the host part, e.g.
/// `sip:34020000001320000001@3402000000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SipUri {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl SipUri {
    pub fn new(user: &str, host: &str) -> Self {
        Self {
            user: (!user.is_empty()).then(|| user.to_string()),
            host: host.to_string(),
            port: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// The user part, or the empty string when the URI has none. The
    /// registrar treats an empty user as a missing username.
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or("")
    }
}

impl fmt::Display for SipUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sip:")?;
        if let Some(user) = &self.user {
            write!(f, "{}@", user)?;
        }

        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }

        Ok(())
    }
}
