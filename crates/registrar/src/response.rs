use rand::{Rng, distr::Alphanumeric};
use sip::{Request, Response, StatusCode, WwwAuthenticate};

fn generate_tag() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(10)
        .map(char::from)
        .collect()
}

/// Base response for a request: dialog headers echoed, a To-tag minted
/// when the request carried none, server User-Agent stamped. Max-Forwards
/// stays at the locally-generated sentinel rather than echoing the
/// request's count.
pub fn reply(
    request: &Request,
    status: StatusCode,
    reason: Option<&str>,
    software: &str,
) -> Response {
    let mut response = Response::new(request, status, reason);
    if let Some(to) = response.to.as_mut() {
        if to.tag.is_none() {
            to.tag = Some(generate_tag());
        }
    }

    response.user_agent = Some(software.to_string());
    response
}

/// 200 OK, with the Date header success responses carry.
pub fn ok(request: &Request, software: &str) -> Response {
    reply(request, StatusCode::Ok, None, software).with_date()
}

/// 401 with a fresh-nonce digest challenge for the realm.
pub fn challenge(request: &Request, software: &str, realm: &str) -> Response {
    let mut response = reply(request, StatusCode::Unauthorized, None, software);
    response.www_authenticate = Some(WwwAuthenticate::new(realm));
    response
}
