//! ## SIP: Session Initiation Protocol
//!
//! This crate holds the in-memory model of SIP messages as the registrar
//! consumes them: requests already parsed by the transport layer, and
//! responses the server constructs and hands back for serialization.
//! Parsing the wire format is the transport's job and lives outside this
//! workspace.

pub mod auth;
pub mod message;
pub mod uri;

pub use self::{
    auth::{DigestAuthorization, WwwAuthenticate, generate_nonce},
    message::{CSeq, Contact, NameAddr, Request, Response},
    uri::SipUri,
};

use std::fmt;

/// SIP request methods.
///
/// Only the methods a GB28181 signalling server routes are modelled. The
/// registrar itself reacts to REGISTER; the rest exist so the transport can
/// classify traffic without falling back to strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Register,
    Invite,
    Ack,
    Bye,
    Cancel,
    Options,
    Message,
    Notify,
    Subscribe,
    Info,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Register => "REGISTER",
            Self::Invite => "INVITE",
            Self::Ack => "ACK",
            Self::Bye => "BYE",
            Self::Cancel => "CANCEL",
            Self::Options => "OPTIONS",
            Self::Message => "MESSAGE",
            Self::Notify => "NOTIFY",
            Self::Subscribe => "SUBSCRIBE",
            Self::Info => "INFO",
        })
    }
}

/// SIP response status codes.
///
/// [rfc3261](https://tools.ietf.org/html/rfc3261#section-21)
///
/// The status code is a 3-digit integer result code that indicates the
/// outcome of an attempt to understand and satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusCode {
    Trying = 100,
    Ok = 200,
    BadRequest = 400,
    Unauthorized = 401,
    PaymentRequired = 402,
    Forbidden = 403,
    IntervalTooBrief = 423,
    TemporarilyUnavailable = 480,
    ServerInternalError = 500,
}

impl StatusCode {
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// The reason phrase paired with the code on the status line. A caller
    /// may override it per response, so this is only the default.
    pub const fn canonical_reason(self) -> &'static str {
        match self {
            Self::Trying => "Trying",
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::PaymentRequired => "Payment Required",
            Self::Forbidden => "Forbidden",
            Self::IntervalTooBrief => "Interval Too Brief",
            Self::TemporarilyUnavailable => "Temporarily Unavailable",
            Self::ServerInternalError => "Server Internal Error",
        }
    }

    pub const fn is_success(self) -> bool {
        self.code() >= 200 && self.code() < 300
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
