//! HTTP transport tests against a scripted provider endpoint.

use courier_delivery::{HttpTransport, Transport, TransportConfig, TransportError};
use courier_store::UnitId;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    sync::oneshot,
};

/// One-shot provider stub: serves a single request with the given
/// response and hands back the raw request text.
async fn spawn_provider(
    status_line: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");

        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).await.expect("read");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);

            let text = String::from_utf8_lossy(&request);
            if let Some(headers_end) = text.find("\r\n\r\n") {
                let content_length = text
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= headers_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len(),
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");

        let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
    });

    (addr, rx)
}

fn transport_for(addr: &str) -> HttpTransport {
    HttpTransport::new(&TransportConfig {
        base_url: format!("http://{addr}"),
        token: "secret-token".to_string(),
        timeout_secs: 5,
    })
    .expect("build transport")
}

#[tokio::test]
async fn accepted_message_round_trips() {
    let (addr, received) = spawn_provider("200 OK", "{\"message\":\"OK\"}").await;
    let transport = transport_for(&addr);

    transport
        .send("hello there", "79000000001", UnitId(7))
        .await
        .expect("send should succeed");

    let request = received.await.expect("request captured");
    let lowered = request.to_lowercase();
    assert!(request.starts_with("POST /send/7 "));
    assert!(lowered.contains("authorization: bearer secret-token"));
    assert!(request.contains("\"id\":7"));
    assert!(request.contains("\"phone\":\"79000000001\""));
    assert!(request.contains("\"text\":\"hello there\""));
}

#[tokio::test]
async fn unconfirmed_acceptance_is_a_failure() {
    let (addr, _received) = spawn_provider("200 OK", "{\"message\":\"QUEUED\"}").await;
    let transport = transport_for(&addr);

    let err = transport
        .send("hello", "79000000001", UnitId(7))
        .await
        .expect_err("must fail");

    match err {
        TransportError::NotAccepted { answer } => assert_eq!(answer, "QUEUED"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_confirmation_field_is_a_failure() {
    let (addr, _received) = spawn_provider("200 OK", "{}").await;
    let transport = transport_for(&addr);

    let err = transport
        .send("hello", "79000000001", UnitId(7))
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::NotAccepted { .. }));
}

#[tokio::test]
async fn non_2xx_status_is_a_failure() {
    let (addr, _received) = spawn_provider("500 Internal Server Error", "{}").await;
    let transport = transport_for(&addr);

    let err = transport
        .send("hello", "79000000001", UnitId(7))
        .await
        .expect_err("must fail");

    match err {
        TransportError::Status { status } => assert_eq!(status, 500),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_payload_is_a_failure() {
    let (addr, _received) = spawn_provider("200 OK", "not json at all").await;
    let transport = transport_for(&addr);

    let err = transport
        .send("hello", "79000000001", UnitId(7))
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Http(_)));
}
