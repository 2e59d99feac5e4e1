use std::{collections::HashMap, fs::read_to_string, net::SocketAddr, str::FromStr};

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

use registrar::{AccountStore, LocalSipAccount, MsgProtocol};

#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Udp,
    Tcp,
}

impl Protocol {
    pub fn as_msg_protocol(&self) -> MsgProtocol {
        match self {
            Self::Udp => MsgProtocol::Udp,
            Self::Tcp => MsgProtocol::Tcp,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Sip {
    ///
    /// served realm
    ///
    /// the GB28181 domain the registrar answers for. Devices put this in
    /// the host part of their address-of-record.
    ///
    #[serde(default = "Sip::realm")]
    pub realm: String,
    ///
    /// server device id
    ///
    /// the 20-digit GB28181 identity of the server itself.
    ///
    #[serde(default = "Sip::username")]
    pub username: String,
    ///
    /// advertised signalling address
    ///
    #[serde(default = "Sip::listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub protocol: Protocol,
    ///
    /// Whether REGISTER requests must pass digest authentication. With
    /// this off the registrar accepts any device in the realm.
    ///
    #[serde(default = "Sip::authentication")]
    pub authentication: bool,
}

impl AccountStore for Sip {
    fn get_local_sip_account(&self) -> LocalSipAccount {
        LocalSipAccount {
            username: self.username.clone(),
            domain: self.realm.clone(),
            local_ip: self.listen.ip(),
            local_port: self.listen.port(),
            msg_protocol: self.protocol.as_msg_protocol(),
            authentication_enabled: self.authentication,
        }
    }
}

impl Sip {
    fn realm() -> String {
        "3402000000".to_string()
    }

    fn username() -> String {
        "34020000002000000001".to_string()
    }

    fn listen() -> SocketAddr {
        "0.0.0.0:5060".parse().unwrap()
    }

    fn authentication() -> bool {
        true
    }
}

impl Default for Sip {
    fn default() -> Self {
        Self {
            realm: Self::realm(),
            username: Self::username(),
            listen: Self::listen(),
            protocol: Protocol::default(),
            authentication: Self::authentication(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Registrar {
    ///
    /// registration expiry floor
    ///
    /// REGISTERs asking for a positive expiry below this are rejected
    /// with 423 Interval Too Brief and this value in Min-Expires.
    ///
    #[serde(default = "Registrar::min_expiry")]
    pub min_expiry: u32,
    ///
    /// User-Agent header stamped on every response the server sends.
    ///
    #[serde(default = "Registrar::user_agent")]
    pub user_agent: String,
    ///
    /// path to the user agent quirk table
    ///
    /// XML document of per-user-agent expiry and response-shape
    /// overrides; without it every agent gets the defaults.
    ///
    #[serde(default)]
    pub user_agent_config: Option<String>,
}

impl Registrar {
    fn min_expiry() -> u32 {
        60
    }

    fn user_agent() -> String {
        crate::SOFTWARE.to_string()
    }
}

impl Default for Registrar {
    fn default() -> Self {
        Self {
            min_expiry: Self::min_expiry(),
            user_agent: Self::user_agent(),
            user_agent_config: None,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Auth {
    ///
    /// static device credentials
    ///
    /// device id to password, consumed by the digest authenticator. An
    /// external credential service would replace this table.
    ///
    #[serde(default)]
    pub static_credentials: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Hooks {
    ///
    /// hooks service uri
    ///
    /// base address of the http service accepted registrations and alarm
    /// subscriptions are pushed to.
    ///
    pub bind: String,
    ///
    /// list of events followed by hooks
    ///
    /// event list: "register", "alarm_subscribe". Empty subscribes to
    /// everything.
    ///
    #[serde(default)]
    pub sub_events: Vec<String>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => return Err(format!("unknown log level: {value}")),
        })
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match *self {
            Self::Error => log::Level::Error,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Log {
    ///
    /// log level
    ///
    /// An enum representing the available verbosity levels of the logger.
    ///
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub sip: Sip,
    #[serde(default)]
    pub registrar: Registrar,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub hooks: Option<Hooks>,
    #[serde(default)]
    pub log: Log,
}

#[derive(Parser, Debug)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    ///
    /// Specify the configuration file path
    ///
    /// Example: gb28181-server --config /etc/gb28181/config.toml
    ///
    #[arg(long, short)]
    config: Option<String>,
}

impl Config {
    ///
    /// Load configure from config file and command line parameters.
    ///
    /// Load command line parameters, if the configuration file path is
    /// specified, the configuration is read from the configuration file,
    /// otherwise the default configuration is used.
    ///
    pub fn load() -> Result<Self> {
        Ok(match Cli::parse().config {
            Some(path) => toml::from_str(&read_to_string(path)?)?,
            None => Self::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use registrar::AccountStore;

    use super::Config;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.sip.realm, "3402000000");
        assert_eq!(config.registrar.min_expiry, 60);
        assert!(config.sip.authentication);
        assert!(config.hooks.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            "[sip]\n\
             realm = \"3502000000\"\n\
             authentication = false\n\
             \n\
             [auth.static-credentials]\n\
             \"34020000001320000001\" = \"123456\"\n",
        )
        .unwrap();

        assert_eq!(config.sip.realm, "3502000000");
        assert!(!config.sip.authentication);
        assert_eq!(config.registrar.min_expiry, 60);
        assert_eq!(
            config.auth.static_credentials.get("34020000001320000001"),
            Some(&"123456".to_string())
        );

        let account = config.sip.get_local_sip_account();
        assert_eq!(account.domain, "3502000000");
        assert!(!account.authentication_enabled);
    }
}
