use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use gateway_client::transport::build_transport;
use gateway_client::{ConnectionParams, GatewayClient, GatewayError, ObjectGateway, Operation};
use rstest::rstest;
use rustls::{Certificate, PrivateKey, ServerConfig, ServerConnection, StreamOwned};

use crate::constants::{ACCESS_KEY, BUCKET, SECRET_KEY};

const GATEWAY_CA: &[u8] = include_bytes!("fixtures/gateway-ca.pem");
// Signed by GATEWAY_CA, valid for localhost and 127.0.0.1
const SERVER_CERT: &[u8] = include_bytes!("fixtures/gateway-server.pem");
const SERVER_KEY: &[u8] = include_bytes!("fixtures/gateway-server.key");

#[derive(Debug, Clone, Copy)]
enum Trust {
    SkipVerify,
    GatewayCa,
    UnparsableBundle,
    SystemRootsOnly,
}

fn server_config() -> Arc<ServerConfig> {
    let certs = rustls_pemfile::certs(&mut &SERVER_CERT[..])
        .expect("Failed to read server certificate")
        .into_iter()
        .map(Certificate)
        .collect();
    let key = rustls_pemfile::pkcs8_private_keys(&mut &SERVER_KEY[..])
        .expect("Failed to read server key")
        .pop()
        .expect("Server key file holds no key");

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, PrivateKey(key))
        .expect("Failed to build server TLS config");
    Arc::new(config)
}

/// HTTPS listener on 127.0.0.1 that answers every request with an empty 200.
fn start_tls_gateway() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind TLS listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let config = server_config();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let config = config.clone();
            thread::spawn(move || {
                let Ok(conn) = ServerConnection::new(config) else { return };
                // Handshake failures are expected for untrusted clients.
                let _ = answer(&mut StreamOwned::new(conn, stream));
            });
        }
    });
    addr
}

fn answer(tls: &mut StreamOwned<ServerConnection, TcpStream>) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = tls.read(&mut buf)?;
        if read == 0 {
            return Ok(());
        }
        request.extend_from_slice(&buf[..read]);
    }

    tls.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")?;
    tls.conn.send_close_notify();
    tls.flush()
}

fn client_for(addr: SocketAddr, trust: Trust) -> GatewayClient {
    let params = ConnectionParams::new(ACCESS_KEY, SECRET_KEY, format!("https://{addr}")).with_max_retries(0);
    let (params, http_client) = match trust {
        Trust::SkipVerify => (params.with_insecure_skip_verify(true), None),
        Trust::GatewayCa => (params.with_ca_certificate(GATEWAY_CA), None),
        Trust::UnparsableBundle => (params.with_ca_certificate(b"not a certificate".as_slice()), None),
        Trust::SystemRootsOnly => (params, Some(build_transport(None, false))),
    };
    GatewayClient::new(params, http_client).expect("Failed to build gateway client")
}

#[rstest]
#[case(Trust::SkipVerify)]
#[case(Trust::GatewayCa)]
#[tokio::test]
async fn trusted_tls_gateway_is_reachable(#[case] trust: Trust) {
    let addr = start_tls_gateway();
    let client = client_for(addr, trust);

    assert!(client.tls_enabled());
    assert!(client.bucket_exists(BUCKET).await.expect("HEAD over TLS should succeed"));
}

#[rstest]
#[case(Trust::UnparsableBundle)]
#[case(Trust::SystemRootsOnly)]
#[tokio::test]
async fn untrusted_tls_gateway_is_a_transport_error(#[case] trust: Trust) {
    let addr = start_tls_gateway();
    let client = client_for(addr, trust);

    let err = client.bucket_exists(BUCKET).await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport { operation: Operation::HeadBucket, .. }), "unexpected error: {err}");
    assert!(err.is_retryable());
}
