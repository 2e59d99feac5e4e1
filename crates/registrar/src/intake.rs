use std::net::SocketAddr;

use sip::{Method, Request, StatusCode};
use tokio::sync::mpsc::{Sender, error::TrySendError};

use crate::{
    Inner,
    response,
    transport::ServerTransaction,
    worker::RegisterResult,
};

/// Requested expiry of a REGISTER: the first Contact's `expires`
/// parameter wins, then the top-level Expires header, else -1 for
/// unspecified.
fn requested_expiry(request: &Request) -> i64 {
    request
        .contact()
        .and_then(|contact| contact.expires)
        .or(request.expires)
        .map(i64::from)
        .unwrap_or(-1)
}

/// The synchronous fast path.
///
/// Runs on the transport's delivery context, so it never waits: header
/// checks, the expiry floor and the capacity check all answer
/// immediately, and acceptance is a lock-free channel push that doubles
/// as the worker wakeup.
pub(crate) fn process<T, A>(
    inner: &Inner<T, A>,
    queue: &Sender<ServerTransaction>,
    local: SocketAddr,
    remote: SocketAddr,
    request: Request,
) -> RegisterResult
where
    T: crate::Observer,
{
    // Routing precondition, not an error: other methods belong to other
    // handlers.
    if request.method != Method::Register {
        return RegisterResult::NonRegisterMethod;
    }

    let expiry = requested_expiry(&request);

    let Some(to) = request.to.as_ref() else {
        let response = response::reply(
            &request,
            StatusCode::BadRequest,
            Some("Missing To header"),
            &inner.software,
        );

        inner.transport.send_response(&response, remote);
        inner.observer.register_failed(RegisterResult::Failed, &remote);
        return RegisterResult::Failed;
    };

    if to.uri.user().is_empty() {
        let response = response::reply(
            &request,
            StatusCode::BadRequest,
            Some("Missing username on To header"),
            &inner.software,
        );

        inner.transport.send_response(&response, remote);
        inner
            .observer
            .register_failed(RegisterResult::RequestWithNoUser, &remote);
        return RegisterResult::RequestWithNoUser;
    }

    if request.contacts.is_empty() {
        let response = response::reply(
            &request,
            StatusCode::BadRequest,
            Some("Missing Contact header"),
            &inner.software,
        );

        inner.transport.send_response(&response, remote);
        inner
            .observer
            .register_failed(RegisterResult::RequestWithNoContact, &remote);
        return RegisterResult::RequestWithNoContact;
    }

    // Zero means un-register and unspecified means server's choice; only
    // a positive request below the floor is too brief.
    if expiry > 0 && expiry < i64::from(inner.min_expiry) {
        let mut response = response::reply(
            &request,
            StatusCode::IntervalTooBrief,
            None,
            &inner.software,
        );

        response.min_expires = Some(inner.min_expiry);
        inner.transport.send_response(&response, remote);
        inner
            .observer
            .register_failed(RegisterResult::IntervalTooBrief, &remote);
        return RegisterResult::IntervalTooBrief;
    }

    let transaction =
        ServerTransaction::new(inner.transport.clone(), request, remote, local);

    match queue.try_send(transaction) {
        Ok(()) => RegisterResult::Trying,
        Err(TrySendError::Full(transaction)) | Err(TrySendError::Closed(transaction)) => {
            log::warn!("register queue full, rejecting: addr={:?}", remote);

            let response = response::reply(
                transaction.request(),
                StatusCode::TemporarilyUnavailable,
                Some("Registrar overloaded, please try again shortly"),
                &inner.software,
            );

            inner.transport.send_response(&response, remote);
            inner.observer.register_failed(RegisterResult::Failed, &remote);
            RegisterResult::Failed
        }
    }
}
