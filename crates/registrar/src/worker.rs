use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use sip::{Contact, StatusCode, WwwAuthenticate};
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;

use crate::{
    Inner, Observer,
    account::{Camera, SipAccount},
    auth::Authenticator,
    response,
    transport::ServerTransaction,
};

/// Pending registrations held between intake and worker. The 1001st
/// simultaneous REGISTER is answered 480 at intake.
pub const QUEUE_CAPACITY: usize = 1000;

/// Upper bound on one wait for work. A lost wakeup can therefore stall
/// the worker for at most this long, and shutdown is observed at the
/// same cadence even on an idle queue.
const RECV_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Outcome of processing one REGISTER.
///
/// The full historical tag set is kept because downstream consumers log
/// and key on these names; most rejections map to a small subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterResult {
    Unknown,
    Trying,
    Forbidden,
    Authenticated,
    AuthenticationRequired,
    Failed,
    Error,
    RequestWithNoUser,
    RemoveAllRegistrations,
    DuplicateRequest,
    AuthenticatedFromCache,
    RequestWithNoContact,
    NonRegisterMethod,
    DomainNotServiced,
    IntervalTooBrief,
    SwitchboardPaymentRequired,
}

/// The single consumer of the register queue.
///
/// One worker per registrar is the concurrency design, not a deployment
/// suggestion: serial processing is what stands in for per-account
/// locking.
pub struct RegisterWorker<T, A> {
    inner: Arc<Inner<T, A>>,
    queue: Receiver<ServerTransaction>,
    stop: Arc<AtomicBool>,
}

impl<T, A> RegisterWorker<T, A>
where
    T: Observer,
    A: Authenticator,
{
    pub(crate) fn new(
        inner: Arc<Inner<T, A>>,
        queue: Receiver<ServerTransaction>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        Self { inner, queue, stop }
    }

    /// Drain the queue until shutdown.
    ///
    /// The loop survives every per-transaction failure; a transaction
    /// that blows up is answered 500 and the next one is picked up.
    pub async fn run(mut self) {
        loop {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }

            let transaction = match timeout(RECV_TIMEOUT, self.queue.recv()).await {
                // Bounded wait elapsed: re-check the stop flag and sleep
                // again. Spurious wakeups land here too.
                Err(_) => continue,
                // Every producer handle dropped.
                Ok(None) => break,
                Ok(Some(transaction)) => transaction,
            };

            let remote = transaction.remote();
            let result = match register(&self.inner, &transaction).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("register processing failed: addr={:?}, error={:?}", remote, e);

                    let response = response::reply(
                        transaction.request(),
                        StatusCode::ServerInternalError,
                        None,
                        &self.inner.software,
                    );

                    transaction.send_final_response(&response);
                    self.inner
                        .observer
                        .register_failed(RegisterResult::Error, &remote);
                    RegisterResult::Error
                }
            };

            log::debug!("register processed: addr={:?}, result={:?}", remote, result);
        }

        log::info!("register worker stopped");
    }
}

/// The per-transaction registration state machine.
async fn register<T, A>(
    inner: &Inner<T, A>,
    transaction: &ServerTransaction,
) -> anyhow::Result<RegisterResult>
where
    T: Observer,
    A: Authenticator,
{
    let request = transaction.request();
    let remote = transaction.remote();

    // The served domain is taken verbatim from the To host; strict realm
    // checking would hook in here.
    let domain = match request.to.as_ref() {
        Some(to) if !to.uri.host.is_empty() => to.uri.host.clone(),
        _ => {
            let response = response::reply(
                request,
                StatusCode::Forbidden,
                Some("Domain not serviced"),
                &inner.software,
            );

            transaction.send_final_response(&response);
            inner
                .observer
                .register_failed(RegisterResult::DomainNotServiced, &remote);
            return Ok(RegisterResult::DomainNotServiced);
        }
    };

    // No persistent account lookup is wired in; an account record is
    // synthesized from the address-of-record for the authenticator.
    let account = SipAccount {
        username: request
            .to
            .as_ref()
            .map(|to| to.uri.user().to_string())
            .unwrap_or_default(),
        domain,
    };

    // Open-registrar mode: accept before ever consulting the
    // authenticator, then tell device management about the binding.
    if !inner.account.authentication_enabled {
        let result = accept(inner, transaction, &account)?;
        inner.observer.rpc_register(request, &inner.account);
        return Ok(result);
    }

    let outcome = inner
        .authenticator
        .authenticate(transaction.local(), remote, request, &account)
        .await;

    if !outcome.authenticated {
        let status = outcome.error_response;
        let mut response = response::reply(request, status, None, &inner.software);
        response.www_authenticate = outcome
            .challenge
            .or_else(|| Some(WwwAuthenticate::new(&account.domain)));

        transaction.send_final_response(&response);

        let result = if status == StatusCode::Forbidden {
            RegisterResult::Forbidden
        } else {
            RegisterResult::AuthenticationRequired
        };

        inner.observer.register_failed(result, &remote);
        return Ok(result);
    }

    accept(inner, transaction, &account)
}

/// Accept a registration: update bindings, answer 200 OK, cache the
/// device and fire the alarm-subscription follow-up.
fn accept<T, A>(
    inner: &Inner<T, A>,
    transaction: &ServerTransaction,
    account: &SipAccount,
) -> anyhow::Result<RegisterResult>
where
    T: Observer,
    A: Authenticator,
{
    let request = transaction.request();
    let remote = transaction.remote();

    // Intake guarantees a Contact; this path defends it anyway and
    // answers a bare 200 with no bindings echoed.
    let Some(contact) = request.contact() else {
        let response = response::ok(request, &inner.software);
        transaction.send_final_response(&response);
        return Ok(finish(inner, transaction, account));
    };

    // Wildcard contact with expiry zero clears every binding for the
    // address-of-record.
    let requested = contact.expires.or(request.expires);
    if requested == Some(0) && contact.uri.user.is_none() && contact.uri.host == "*" {
        let response = response::ok(request, &inner.software);
        transaction.send_final_response(&response);

        log::info!("register removed all bindings: account={}, addr={:?}", account, remote);
        return Ok(RegisterResult::RemoveAllRegistrations);
    }

    let user_agent = request.user_agent();
    let max_expiry = inner.policy.max_expiry_for(user_agent);
    let resolved = match requested {
        Some(0) => 0,
        Some(n) => n.min(max_expiry),
        None => max_expiry,
    };

    let mut response = response::ok(request, &inner.software);
    match inner
        .bindings
        .as_ref()
        .map(|store| store.update(account, contact, resolved))
    {
        // No binding store configured: echo the contact the device sent
        // with the expiry it was granted.
        None => {
            response
                .contacts
                .push(Contact::new(contact.uri.clone()).with_expires(resolved));
        }
        Some(Ok(bindings)) => {
            if inner.policy.contact_list_supported_for(user_agent) {
                response.contacts = bindings
                    .iter()
                    .map(|binding| {
                        Contact::new(binding.contact.uri.clone()).with_expires(binding.expiry)
                    })
                    .collect();
            } else {
                response
                    .contacts
                    .push(Contact::new(contact.uri.clone()).with_expires(resolved));
            }
        }
        // Binding store down. Still 200: the device stays reachable, and
        // the floored expiry makes it come back soon.
        Some(Err(e)) => {
            log::warn!(
                "binding update failed: account={}, error={:?}",
                account,
                e
            );

            response
                .contacts
                .push(Contact::new(contact.uri.clone()).with_expires(inner.min_expiry));
        }
    }

    transaction.send_final_response(&response);
    Ok(finish(inner, transaction, account))
}

/// Post-accept side effects shared by every success path.
fn finish<T, A>(
    inner: &Inner<T, A>,
    transaction: &ServerTransaction,
    account: &SipAccount,
) -> RegisterResult
where
    T: Observer,
    A: Authenticator,
{
    let request = transaction.request();
    let remote = transaction.remote();

    inner.observer.device_online(
        &request.uri.host,
        &Camera {
            device_id: account.username.clone(),
            ip: remote.ip(),
            port: remote.port(),
        },
    );

    log::info!("register success: account={}, addr={:?}", account, remote);
    inner.observer.register_success(&account.username, &remote);
    inner.observer.alarm_subscribe(request, remote);

    RegisterResult::Authenticated
}
