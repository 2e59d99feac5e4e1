use std::fmt;
use std::net::IpAddr;

use sip::Contact;

/// Transport protocol the local account speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MsgProtocol {
    #[default]
    Udp,
    Tcp,
}

/// The registrar's own SIP identity.
///
/// Fixed for the lifetime of the core; built from configuration at
/// startup. `authentication_enabled = false` turns the worker into an
/// open registrar that accepts without consulting the authenticator.
#[derive(Debug, Clone)]
pub struct LocalSipAccount {
    pub username: String,
    pub domain: String,
    pub local_ip: IpAddr,
    pub local_port: u16,
    pub msg_protocol: MsgProtocol,
    pub authentication_enabled: bool,
}

/// Access to the local account record.
///
/// The deployment keeps it in configuration; a cluster may serve it from
/// shared storage instead.
pub trait AccountStore: Send + Sync {
    fn get_local_sip_account(&self) -> LocalSipAccount;
}

/// The account a REGISTER is authenticated against.
///
/// Synthesized per request from the To header when no persistent account
/// lookup is wired in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipAccount {
    pub username: String,
    pub domain: String,
}

/// One camera entry for the device cache, keyed externally by the
/// request-URI host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub device_id: String,
    pub ip: IpAddr,
    pub port: u16,
}

/// A stored address-of-record binding.
#[derive(Debug, Clone)]
pub struct Binding {
    pub contact: Contact,
    pub expiry: u32,
}

/// Persistent binding storage.
///
/// The registrar survives without one (it then echoes the sent contact);
/// when an update fails the device is still accepted, with a floor expiry
/// so it re-registers promptly.
pub trait BindingStore: Send + Sync {
    /// Refresh the binding for an address-of-record and return the full
    /// current binding list.
    fn update(
        &self,
        account: &SipAccount,
        contact: &Contact,
        expiry: u32,
    ) -> anyhow::Result<Vec<Binding>>;
}

/// Longest expiry across a binding list, `None` when the list is empty.
pub fn binding_expiry(bindings: &[Binding]) -> Option<u32> {
    if bindings.is_empty() {
        return None;
    }

    bindings.iter().map(|binding| binding.expiry).max()
}

impl fmt::Display for SipAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.domain)
    }
}

#[cfg(test)]
mod tests {
    use sip::{Contact, SipUri};

    use super::{Binding, binding_expiry};

    #[test]
    fn test_binding_expiry() {
        assert_eq!(binding_expiry(&[]), None);

        let bindings = vec![
            Binding {
                contact: Contact::new(SipUri::new("a", "192.168.0.2")),
                expiry: 60,
            },
            Binding {
                contact: Contact::new(SipUri::new("a", "192.168.0.3")),
                expiry: 3600,
            },
        ];

        assert_eq!(binding_expiry(&bindings), Some(3600));
    }
}
