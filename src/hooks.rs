use std::net::SocketAddr;
use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;

/// hooks events kind
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Events<'a> {
    /// accepted registration forwarded to device management
    Register {
        device_id: &'a str,
        host: &'a str,
        realm: &'a str,
    },
    /// alarm subscription follow-up for a registered device
    AlarmSubscribe {
        device_id: &'a str,
        addr: &'a SocketAddr,
    },
}

impl Events<'_> {
    fn to_str(&self) -> &'static str {
        match self {
            Self::Register { .. } => "register",
            Self::AlarmSubscribe { .. } => "alarm_subscribe",
        }
    }
}

/// web hooks
///
/// The web hooks is used for the server to notify the outside of
/// registrar events. Delivery is fire and forget; a hook that is down
/// costs a warning, never a registration.
pub struct Hooks {
    client: reqwest::Client,
    config: Arc<Config>,
}

impl Hooks {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// push event
    ///
    /// Only subscribed events are pushed, other events are ignored. An
    /// empty subscription list subscribes to everything.
    pub fn on_events(&self, body: &Events<'_>) {
        let Some(hooks) = &self.config.hooks else {
            return;
        };

        let kind = body.to_str();
        if !hooks.sub_events.is_empty() && !hooks.sub_events.iter().any(|event| event == kind) {
            return;
        }

        let request = self
            .client
            .put(format!("{}/events?kind={}", hooks.bind, kind))
            .json(body);

        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                log::warn!("hooks event push failed: kind={:?}, error={:?}", kind, e);
            }
        });
    }
}
