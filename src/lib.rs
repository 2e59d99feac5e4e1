pub mod auth;
pub mod config;
pub mod devices;
pub mod hooks;
pub mod observer;
pub mod statistics;

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;

use registrar::{AccountStore, Registrar, RegistrarOptions, SipTransport, UserAgentPolicy};

use self::{
    auth::DigestAuthenticator, config::Config, devices::Devices, observer::Observer,
    statistics::Statistics,
};

#[rustfmt::skip]
pub(crate) static SOFTWARE: &str = concat!(
    "gb28181-rs.",
    env!("CARGO_PKG_VERSION")
);

/// A started server: the registrar front plus its worker and the shared
/// state the observer feeds.
pub struct Server {
    registrar: Registrar<Observer, DigestAuthenticator>,
    devices: Devices,
    statistics: Statistics,
    worker: JoinHandle<()>,
}

impl Server {
    /// The intake the transport delivers parsed REGISTERs to.
    pub fn registrar(&self) -> &Registrar<Observer, DigestAuthenticator> {
        &self.registrar
    }

    pub fn devices(&self) -> &Devices {
        &self.devices
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Stop the worker and wait for it to finish the transaction in
    /// flight.
    pub async fn shutdown(self) -> Result<()> {
        self.registrar.shutdown();
        drop(self.registrar);
        self.worker.await?;
        Ok(())
    }
}

/// Wire the registrar against a transport and start the worker.
///
/// The SIP wire transport is deployment-provided; keeping it a parameter
/// is also what lets integration tests start the server without opening
/// sockets.
pub async fn startup(config: Arc<Config>, transport: Arc<dyn SipTransport>) -> Result<Server> {
    let policy = match &config.registrar.user_agent_config {
        Some(path) => UserAgentPolicy::from_xml(&std::fs::read_to_string(path)?)?,
        None => UserAgentPolicy::default(),
    };

    if !policy.is_empty() {
        log::info!("user agent policy loaded: entries={}", policy.len());
    }

    let devices = Devices::default();
    let statistics = Statistics::default();
    let authenticator = DigestAuthenticator::new(
        &config.sip.realm,
        config.auth.static_credentials.clone(),
    );

    let (registrar, worker) = Registrar::new(RegistrarOptions {
        account: config.sip.get_local_sip_account(),
        policy,
        min_expiry: config.registrar.min_expiry,
        software: config.registrar.user_agent.clone(),
        transport,
        authenticator,
        bindings: None,
        observer: Observer::new(config.clone(), devices.clone(), statistics.clone()),
    });

    log::info!(
        "registrar started: realm={:?}, listen={}, authentication={}",
        config.sip.realm,
        config.sip.listen,
        config.sip.authentication
    );

    Ok(Server {
        registrar,
        devices,
        statistics,
        worker: tokio::spawn(worker.run()),
    })
}
