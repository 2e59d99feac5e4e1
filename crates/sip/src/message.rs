use std::fmt;

use crate::{Method, StatusCode, auth::WwwAuthenticate, uri::SipUri};

/// A `From`/`To` header value: optional display name, URI, optional tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAddr {
    pub display: Option<String>,
    pub uri: SipUri,
    pub tag: Option<String>,
}

impl NameAddr {
    pub fn new(uri: SipUri) -> Self {
        Self {
            display: None,
            uri,
            tag: None,
        }
    }
}

impl fmt::Display for NameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(display) = &self.display {
            write!(f, "\"{}\" ", display)?;
        }

        write!(f, "<{}>", self.uri)?;
        if let Some(tag) = &self.tag {
            write!(f, ";tag={}", tag)?;
        }

        Ok(())
    }
}

/// A `Contact` header value with its optional `expires` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub uri: SipUri,
    pub expires: Option<u32>,
}

impl Contact {
    pub fn new(uri: SipUri) -> Self {
        Self { uri, expires: None }
    }

    pub fn with_expires(mut self, expires: u32) -> Self {
        self.expires = Some(expires);
        self
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.uri)?;
        if let Some(expires) = self.expires {
            write!(f, ";expires={}", expires)?;
        }

        Ok(())
    }
}

/// The `CSeq` header: sequence number plus the method it numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CSeq {
    pub seq: u32,
    pub method: Method,
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.seq, self.method)
    }
}

/// A parsed inbound request.
///
/// The transport parses the wire bytes and delivers this model; header
/// fields the registrar never inspects are not carried. `Via` lines are
/// kept verbatim because responses must echo them byte-for-byte.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub uri: SipUri,
    pub vias: Vec<String>,
    pub from: NameAddr,
    pub to: Option<NameAddr>,
    pub call_id: String,
    pub cseq: CSeq,
    pub contacts: Vec<Contact>,
    pub expires: Option<u32>,
    pub max_forwards: u32,
    pub user_agent: Option<String>,
    pub authorization: Option<crate::auth::DigestAuthorization>,
}

impl Request {
    pub fn new(method: Method, uri: SipUri, from: NameAddr, call_id: &str) -> Self {
        Self {
            method,
            vias: Vec::new(),
            from,
            to: None,
            call_id: call_id.to_string(),
            cseq: CSeq { seq: 1, method },
            contacts: Vec::new(),
            expires: None,
            max_forwards: 70,
            user_agent: None,
            authorization: None,
            uri,
        }
    }

    /// First `Contact` header, if any.
    pub fn contact(&self) -> Option<&Contact> {
        self.contacts.first()
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("")
    }
}

/// An outbound response under construction.
///
/// Created from the request it answers so the dialog-identifying headers
/// are echoed; decoration (tags, challenges, contact lists) happens on the
/// fields before serialization.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub reason: String,
    pub vias: Vec<String>,
    pub from: NameAddr,
    pub to: Option<NameAddr>,
    pub call_id: String,
    pub cseq: CSeq,
    pub contacts: Vec<Contact>,
    pub expires: Option<u32>,
    pub min_expires: Option<u32>,
    /// Locally generated responses reset this to the none sentinel, which
    /// suppresses the header on the wire.
    pub max_forwards: Option<u32>,
    pub user_agent: Option<String>,
    pub date: Option<String>,
    pub www_authenticate: Option<WwwAuthenticate>,
}

impl Response {
    /// Build a response skeleton for a request.
    ///
    /// All responses echo `Via`, `From`, `To`, `Call-ID` and `CSeq` from
    /// the request they answer; everything else starts empty. A custom
    /// reason phrase replaces the canonical one when given.
    pub fn new(request: &Request, status: StatusCode, reason: Option<&str>) -> Self {
        Self {
            status,
            reason: reason.unwrap_or(status.canonical_reason()).to_string(),
            vias: request.vias.clone(),
            from: request.from.clone(),
            to: request.to.clone(),
            call_id: request.call_id.clone(),
            cseq: request.cseq,
            contacts: Vec::new(),
            expires: None,
            min_expires: None,
            max_forwards: None,
            user_agent: None,
            date: None,
            www_authenticate: None,
        }
    }

    /// Stamp a `Date` header with the current time, RFC 1123 format as
    /// required on 2xx registrar answers.
    pub fn with_date(mut self) -> Self {
        self.date = Some(
            chrono::Utc::now()
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string(),
        );

        self
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SIP/2.0 {} {}\r\n",
            self.status.code(),
            self.reason
        )?;

        for via in &self.vias {
            write!(f, "Via: {}\r\n", via)?;
        }

        write!(f, "From: {}\r\n", self.from)?;
        if let Some(to) = &self.to {
            write!(f, "To: {}\r\n", to)?;
        }

        write!(f, "Call-ID: {}\r\n", self.call_id)?;
        write!(f, "CSeq: {}\r\n", self.cseq)?;
        for contact in &self.contacts {
            write!(f, "Contact: {}\r\n", contact)?;
        }

        if let Some(expires) = self.expires {
            write!(f, "Expires: {}\r\n", expires)?;
        }

        if let Some(min_expires) = self.min_expires {
            write!(f, "Min-Expires: {}\r\n", min_expires)?;
        }

        if let Some(www_authenticate) = &self.www_authenticate {
            write!(f, "WWW-Authenticate: {}\r\n", www_authenticate)?;
        }

        if let Some(user_agent) = &self.user_agent {
            write!(f, "User-Agent: {}\r\n", user_agent)?;
        }

        if let Some(date) = &self.date {
            write!(f, "Date: {}\r\n", date)?;
        }

        if let Some(max_forwards) = self.max_forwards {
            write!(f, "Max-Forwards: {}\r\n", max_forwards)?;
        }

        write!(f, "Content-Length: 0\r\n\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        let mut request = Request::new(
            Method::Register,
            SipUri::new("", "3402000000"),
            NameAddr::new(SipUri::new("34020000001320000001", "3402000000")),
            "a84b4c76e66710",
        );

        request.to = Some(NameAddr::new(SipUri::new(
            "34020000001320000001",
            "3402000000",
        )));
        request.vias.push(
            "SIP/2.0/UDP 192.168.0.10:5060;branch=z9hG4bK776asdhds".to_string(),
        );

        request
    }

    #[test]
    fn test_response_echoes_request() {
        let request = request();
        let response = Response::new(&request, StatusCode::Ok, None);

        assert_eq!(response.vias, request.vias);
        assert_eq!(response.call_id, request.call_id);
        assert_eq!(response.cseq, request.cseq);
        assert_eq!(response.reason, "OK");
    }

    #[test]
    fn test_custom_reason() {
        let response = Response::new(
            &request(),
            StatusCode::BadRequest,
            Some("Missing Contact header"),
        );

        assert_eq!(response.reason, "Missing Contact header");
    }

    #[test]
    fn test_wire_format() {
        let mut response = Response::new(&request(), StatusCode::Ok, None);
        response.min_expires = Some(60);

        let text = response.to_string();
        assert!(text.starts_with("SIP/2.0 200 OK\r\n"));
        assert!(text.contains("Via: SIP/2.0/UDP 192.168.0.10:5060;branch=z9hG4bK776asdhds\r\n"));
        assert!(text.contains("CSeq: 1 REGISTER\r\n"));
        assert!(text.contains("Min-Expires: 60\r\n"));
        assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    }
}
