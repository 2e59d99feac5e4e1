use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use gb28181_server::{config::Config, startup};
use registrar::{RegisterResult, SipTransport};
use sip::{Contact, Method, NameAddr, Request, Response, SipUri, StatusCode};

#[derive(Default)]
struct MockTransport {
    sent: Mutex<Vec<Response>>,
}

impl SipTransport for MockTransport {
    fn send_response(&self, response: &Response, _destination: SocketAddr) {
        self.sent.lock().push(response.clone());
    }
}

fn register_request(device: &str, domain: &str) -> Request {
    let mut request = Request::new(
        Method::Register,
        SipUri::new("", domain),
        NameAddr::new(SipUri::new(device, domain)),
        "a84b4c76e66710",
    );

    request.to = Some(NameAddr::new(SipUri::new(device, domain)));
    request
        .vias
        .push("SIP/2.0/UDP 192.168.0.10:5060;branch=z9hG4bK776asdhds".to_string());
    request
        .contacts
        .push(Contact::new(SipUri::new(device, "192.168.0.10").with_port(5060)));
    request.expires = Some(3600);
    request
}

async fn wait_response(transport: &MockTransport) -> Response {
    for _ in 0..200 {
        if let Some(response) = transport.sent.lock().first().cloned() {
            return response;
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    panic!("no response observed");
}

#[tokio::test]
async fn test_open_registrar_end_to_end() {
    let mut config = Config::default();
    config.sip.authentication = false;

    let transport = Arc::new(MockTransport::default());
    let server = startup(Arc::new(config), transport.clone()).await.unwrap();

    let local: SocketAddr = "0.0.0.0:5060".parse().unwrap();
    let remote: SocketAddr = "192.168.0.10:5060".parse().unwrap();
    let result = server.registrar().on_request(
        local,
        remote,
        register_request("34020000001320000001", "3402000000"),
    );

    assert_eq!(result, RegisterResult::Trying);

    let response = wait_response(&transport).await;
    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.date.is_some());

    // The camera is cached under the request-URI host with the source
    // address it registered from.
    let camera = server.devices().get("3402000000").unwrap();
    assert_eq!(camera.device_id, "34020000001320000001");
    assert_eq!(camera.ip, remote.ip());
    assert_eq!(camera.port, remote.port());
    assert_eq!(server.statistics().get().accepted, 1);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_protected_registrar_challenges() {
    let mut config = Config::default();
    config
        .auth
        .static_credentials
        .insert("34020000001320000001".to_string(), "123456".to_string());

    let transport = Arc::new(MockTransport::default());
    let server = startup(Arc::new(config), transport.clone()).await.unwrap();

    let local: SocketAddr = "0.0.0.0:5060".parse().unwrap();
    let remote: SocketAddr = "192.168.0.10:5060".parse().unwrap();
    server.registrar().on_request(
        local,
        remote,
        register_request("34020000001320000001", "3402000000"),
    );

    let response = wait_response(&transport).await;
    assert_eq!(response.status, StatusCode::Unauthorized);

    let challenge = response.www_authenticate.unwrap();
    assert_eq!(challenge.realm, "3402000000");
    assert!(!challenge.nonce.is_empty());

    // Nothing cached for a challenged device.
    assert!(server.devices().is_empty());
    assert_eq!(server.statistics().get().rejected, 1);

    server.shutdown().await.unwrap();
}
