//! ## GB28181 registrar core
//!
//! [rfc3261](https://tools.ietf.org/html/rfc3261#section-10)
//!
//! A registrar is a server that accepts REGISTER requests and places the
//! information it receives in those requests into the location service
//! for the domain it handles. GB28181 devices (cameras, NVRs) register
//! with digest credentials and are then reachable for catalog, alarm and
//! media signalling.
//!
//! The crate is split the way the traffic flows: a synchronous intake
//! validates and enqueues, one worker drains the queue and runs the
//! registration state machine, and everything with a wire, a credential
//! store or a database behind it sits across a collaborator trait.

pub mod account;
pub mod auth;
mod intake;
pub mod policy;
pub mod response;
pub mod subscription;
pub mod transport;
mod worker;

pub use self::{
    account::{
        AccountStore, Binding, BindingStore, Camera, LocalSipAccount, MsgProtocol, SipAccount,
        binding_expiry,
    },
    auth::{AuthOutcome, Authenticator},
    policy::{DEFAULT_MAX_EXPIRY, PolicyError, UserAgentPolicy},
    subscription::{AlarmSubscription, MonitorEvent, Subscription},
    transport::{ServerTransaction, SipTransport},
    worker::{QUEUE_CAPACITY, RegisterResult, RegisterWorker},
};

use std::net::SocketAddr;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::sync::mpsc;

/// Side-effect seam of the registrar.
///
/// The worker reports through this trait instead of owning a device
/// cache, an RPC client or a statistics sink itself. All methods default
/// to no-ops so an embedder only implements what it consumes.
#[allow(unused_variables)]
pub trait Observer: Send + Sync + 'static {
    /// An accepted device, keyed by the request-URI host. Fired on every
    /// successful registration so the cache stays warm across refreshes.
    fn device_online(&self, host: &str, camera: &Camera) {}

    /// A registration was accepted while authentication is disabled and
    /// the downstream device-management service should be told.
    fn rpc_register(&self, request: &sip::Request, account: &LocalSipAccount) {}

    /// Follow-up point for establishing the alarm subscription of a
    /// freshly registered device.
    fn alarm_subscribe(&self, request: &sip::Request, remote: SocketAddr) {}

    fn register_success(&self, username: &str, remote: &SocketAddr) {}

    fn register_failed(&self, result: RegisterResult, remote: &SocketAddr) {}
}

pub struct RegistrarOptions<T, A> {
    /// The registrar's own identity and the authentication switch.
    pub account: LocalSipAccount,
    /// Per-user-agent quirk table.
    pub policy: UserAgentPolicy,
    /// Registrations shorter than this (but positive) are rejected with
    /// 423 and this value in Min-Expires.
    pub min_expiry: u32,
    /// Server User-Agent string stamped on every response.
    pub software: String,
    pub transport: Arc<dyn SipTransport>,
    pub authenticator: A,
    pub bindings: Option<Arc<dyn BindingStore>>,
    pub observer: T,
}

pub(crate) struct Inner<T, A> {
    pub account: LocalSipAccount,
    pub policy: UserAgentPolicy,
    pub min_expiry: u32,
    pub software: String,
    pub transport: Arc<dyn SipTransport>,
    pub authenticator: A,
    pub bindings: Option<Arc<dyn BindingStore>>,
    pub observer: T,
}

/// The registrar front: the transport delivers parsed REGISTERs here.
///
/// Cheap to clone; all clones feed the same queue and worker.
pub struct Registrar<T, A> {
    inner: Arc<Inner<T, A>>,
    queue: mpsc::Sender<ServerTransaction>,
    stop: Arc<AtomicBool>,
}

impl<T, A> Clone for Registrar<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            queue: self.queue.clone(),
            stop: self.stop.clone(),
        }
    }
}

impl<T, A> Registrar<T, A>
where
    T: Observer,
    A: Authenticator,
{
    /// Create the registrar and its worker half.
    ///
    /// The caller spawns [`RegisterWorker::run`] on its runtime; exactly
    /// one worker consumes the queue, which is what makes per-account
    /// locking unnecessary.
    pub fn new(options: RegistrarOptions<T, A>) -> (Self, RegisterWorker<T, A>) {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let inner = Arc::new(Inner {
            account: options.account,
            policy: options.policy,
            min_expiry: options.min_expiry,
            software: options.software,
            transport: options.transport,
            authenticator: options.authenticator,
            bindings: options.bindings,
            observer: options.observer,
        });

        (
            Self {
                inner: inner.clone(),
                queue: sender,
                stop: stop.clone(),
            },
            RegisterWorker::new(inner, receiver, stop),
        )
    }

    /// Synchronous fast path for one inbound request.
    ///
    /// Malformed and over-limit requests are answered on the spot;
    /// everything else becomes a queued transaction for the worker. Safe
    /// to call from any number of transport contexts concurrently.
    pub fn on_request(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        request: sip::Request,
    ) -> RegisterResult {
        intake::process(&self.inner, &self.queue, local, remote, request)
    }

    pub fn local_account(&self) -> &LocalSipAccount {
        &self.inner.account
    }

    /// Ask the worker to exit. The transaction in flight, if any, still
    /// completes; the flag is observed at the top of the next iteration
    /// or at the latest when the bounded wait times out.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
