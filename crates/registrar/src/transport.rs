use std::net::SocketAddr;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use sip::{Request, Response};

/// The wire-side collaborator.
///
/// Parsing, retransmission and socket I/O live behind this seam; the
/// registrar only ever asks it to put a finished response on the wire.
/// The call must not block: the worker sends responses while holding no
/// locks but also while other transactions wait in the queue.
pub trait SipTransport: Send + Sync {
    fn send_response(&self, response: &Response, destination: SocketAddr);
}

/// A non-INVITE server transaction for one inbound REGISTER.
///
/// Wraps the request together with the endpoints it arrived on and the
/// transport that can answer it. The core sends at most one final
/// response per transaction; retransmission of that response on a
/// retransmitted request is the transport's concern.
pub struct ServerTransaction {
    transport: Arc<dyn SipTransport>,
    request: Request,
    local: SocketAddr,
    remote: SocketAddr,
    responded: AtomicBool,
}

impl ServerTransaction {
    pub fn new(
        transport: Arc<dyn SipTransport>,
        request: Request,
        remote: SocketAddr,
        local: SocketAddr,
    ) -> Self {
        Self {
            transport,
            request,
            local,
            remote,
            responded: AtomicBool::new(false),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn local(&self) -> SocketAddr {
        self.local
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Whether a final response has been sent.
    pub fn is_completed(&self) -> bool {
        self.responded.load(Ordering::Acquire)
    }

    /// Send the final response, once. A second attempt is dropped and
    /// logged; the first response stands.
    pub fn send_final_response(&self, response: &Response) -> bool {
        if self.responded.swap(true, Ordering::AcqRel) {
            log::warn!(
                "duplicate final response dropped: call_id={:?}, addr={:?}",
                self.request.call_id,
                self.remote
            );

            return false;
        }

        self.transport.send_response(response, self.remote);
        true
    }
}
