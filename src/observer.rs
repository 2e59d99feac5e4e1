use std::net::SocketAddr;
use std::sync::Arc;

use registrar::{Camera, LocalSipAccount, RegisterResult};
use sip::Request;

use crate::{
    config::Config,
    devices::Devices,
    hooks::{Events, Hooks},
    statistics::Statistics,
};

/// The deployment's side of the registrar seam: device cache, web hooks
/// and counters.
pub struct Observer {
    devices: Devices,
    hooks: Hooks,
    statistics: Statistics,
}

impl Observer {
    pub fn new(config: Arc<Config>, devices: Devices, statistics: Statistics) -> Self {
        Self {
            hooks: Hooks::new(config),
            devices,
            statistics,
        }
    }
}

fn device_id(request: &Request) -> &str {
    request
        .to
        .as_ref()
        .map(|to| to.uri.user())
        .unwrap_or_default()
}

impl registrar::Observer for Observer {
    fn device_online(&self, host: &str, camera: &Camera) {
        log::info!(
            "device online: host={:?}, device={:?}, addr={}:{}",
            host,
            camera.device_id,
            camera.ip,
            camera.port
        );

        self.devices.place_in(host, camera.clone());
    }

    fn rpc_register(&self, request: &Request, account: &LocalSipAccount) {
        log::info!(
            "rpc register: device={:?}, realm={:?}",
            device_id(request),
            account.domain
        );

        self.hooks.on_events(&Events::Register {
            device_id: device_id(request),
            host: &request.uri.host,
            realm: &account.domain,
        });
    }

    fn alarm_subscribe(&self, request: &Request, remote: SocketAddr) {
        log::info!(
            "alarm subscribe: device={:?}, addr={:?}",
            device_id(request),
            remote
        );

        self.hooks.on_events(&Events::AlarmSubscribe {
            device_id: device_id(request),
            addr: &remote,
        });
    }

    fn register_success(&self, username: &str, remote: &SocketAddr) {
        log::info!("register success: username={:?}, addr={:?}", username, remote);
        self.statistics.add_accepted();
    }

    fn register_failed(&self, result: RegisterResult, remote: &SocketAddr) {
        log::info!("register failed: result={:?}, addr={:?}", result, remote);

        match result {
            RegisterResult::Error => self.statistics.add_error(),
            _ => self.statistics.add_rejected(),
        }
    }
}
