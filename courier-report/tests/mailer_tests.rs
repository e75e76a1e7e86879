//! Integration tests for the SMTP mailer against a scripted relay.

use courier_report::{Mail, MailConfig, MailError, Mailer, SmtpMailer};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpListener,
    sync::oneshot,
};

/// Bind a one-shot relay that accepts a single message and hands back the
/// raw DATA section, or rejects the given command with `reject_code`.
async fn spawn_relay(reject: Option<(&'static str, u16)>) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind relay");
    let addr = listener.local_addr().expect("relay addr").to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        writer.write_all(b"220 relay ready\r\n").await.expect("greet");

        let mut data = String::new();
        let mut in_data = false;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.expect("read") == 0 {
                break;
            }

            if in_data {
                if line.trim_end() == "." {
                    writer.write_all(b"250 queued\r\n").await.expect("queued");
                    in_data = false;
                    continue;
                }
                data.push_str(&line);
                continue;
            }

            let verb = line
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_ascii_uppercase();
            if let Some((rejected_verb, code)) = reject {
                if verb == rejected_verb {
                    writer
                        .write_all(format!("{code} no thanks\r\n").as_bytes())
                        .await
                        .expect("reject");
                    continue;
                }
            }

            match verb.as_str() {
                "EHLO" => {
                    // Multi-line reply, as real relays answer.
                    writer
                        .write_all(b"250-relay greets you\r\n250 OK\r\n")
                        .await
                        .expect("ehlo");
                }
                "MAIL" | "RCPT" => writer.write_all(b"250 OK\r\n").await.expect("ok"),
                "DATA" => {
                    writer
                        .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                        .await
                        .expect("data");
                    in_data = true;
                }
                "QUIT" => {
                    writer.write_all(b"221 bye\r\n").await.expect("bye");
                    break;
                }
                _ => writer.write_all(b"500 what\r\n").await.expect("what"),
            }
        }

        let _ = tx.send(data);
    });

    (addr, rx)
}

fn mail() -> Mail {
    Mail {
        subject: "Daily distribution report".to_string(),
        body: "Всего рассылок: 0".to_string(),
        from: "courier@example.com".to_string(),
        recipients: vec!["admin@example.com".to_string()],
    }
}

#[tokio::test]
async fn mailer_delivers_through_the_relay() {
    let (addr, received) = spawn_relay(None).await;
    let mailer = SmtpMailer::new(MailConfig {
        relay_addr: addr,
        local_name: "courier-test".to_string(),
    });

    mailer.send(&mail()).await.expect("send should succeed");

    let data = received.await.expect("relay task finished");
    assert!(data.contains("Subject: Daily distribution report"));
    assert!(data.contains("To: <admin@example.com>"));
    assert!(data.contains("Всего рассылок: 0"));
}

#[tokio::test]
async fn rejected_recipient_surfaces_as_an_error() {
    let (addr, _received) = spawn_relay(Some(("RCPT", 550))).await;
    let mailer = SmtpMailer::new(MailConfig {
        relay_addr: addr,
        local_name: "courier-test".to_string(),
    });

    let err = mailer.send(&mail()).await.expect_err("must fail");
    match err {
        MailError::Rejected { command, response } => {
            assert_eq!(command, "RCPT");
            assert!(response.starts_with("550"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_relay_is_an_io_error() {
    // Bind-then-drop guarantees a port with no listener.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    drop(listener);

    let mailer = SmtpMailer::new(MailConfig {
        relay_addr: addr,
        local_name: "courier-test".to_string(),
    });

    assert!(matches!(
        mailer.send(&mail()).await,
        Err(MailError::Io(_))
    ));
}
