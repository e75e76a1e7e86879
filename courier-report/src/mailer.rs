//! Email-like transport for the daily report.
//!
//! The report goes out through a trusted internal relay, so the client is
//! deliberately small: plain TCP, EHLO/MAIL/RCPT/DATA/QUIT, no extensions.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};

/// An outbound report message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub recipients: Vec<String>,
}

/// Errors from the report transport.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The relay closed the connection mid-exchange.
    #[error("Relay closed the connection")]
    ConnectionClosed,

    /// The relay answered a command with an unexpected code.
    #[error("Relay rejected {command}: {response}")]
    Rejected {
        command: &'static str,
        response: String,
    },
}

/// Transport used to deliver the daily report.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `mail` to all of its recipients.
    ///
    /// # Errors
    /// Any failure is retryable from the caller's point of view; partial
    /// delivery is treated as failure.
    async fn send(&self, mail: &Mail) -> Result<(), MailError>;
}

/// Relay connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// `host:port` of the SMTP relay.
    #[serde(default = "default_relay_addr")]
    pub relay_addr: String,

    /// Name to introduce ourselves with in EHLO.
    #[serde(default = "default_local_name")]
    pub local_name: String,
}

fn default_relay_addr() -> String {
    "localhost:25".to_string()
}

fn default_local_name() -> String {
    "courier".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            relay_addr: default_relay_addr(),
            local_name: default_local_name(),
        }
    }
}

/// Minimal SMTP client speaking to a configured relay.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &Mail) -> Result<(), MailError> {
        let stream = TcpStream::connect(&self.config.relay_addr).await?;
        let (read_half, mut writer) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        expect(&mut reader, "greeting", 220).await?;

        command(
            &mut writer,
            &format!("EHLO {}", self.config.local_name),
        )
        .await?;
        expect(&mut reader, "EHLO", 250).await?;

        command(&mut writer, &format!("MAIL FROM:<{}>", mail.from)).await?;
        expect(&mut reader, "MAIL", 250).await?;

        for recipient in &mail.recipients {
            command(&mut writer, &format!("RCPT TO:<{recipient}>")).await?;
            expect(&mut reader, "RCPT", 250).await?;
        }

        command(&mut writer, "DATA").await?;
        expect(&mut reader, "DATA", 354).await?;

        writer.write_all(render_message(mail).as_bytes()).await?;
        writer.write_all(b".\r\n").await?;
        expect(&mut reader, "message body", 250).await?;

        // Best effort; the message is already accepted.
        let _ = command(&mut writer, "QUIT").await;

        Ok(())
    }
}

async fn command(writer: &mut OwnedWriteHalf, line: &str) -> Result<(), MailError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    Ok(())
}

/// Read one (possibly multi-line) reply and check its code.
async fn expect(
    reader: &mut BufReader<OwnedReadHalf>,
    command: &'static str,
    code: u16,
) -> Result<(), MailError> {
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Err(MailError::ConnectionClosed);
        }
        let reply = line.trim_end();

        // "250-..." marks a continuation line, "250 ..." the final one.
        if reply.len() >= 4 && reply.as_bytes()[3] == b'-' {
            continue;
        }

        let received: u16 = reply.get(..3).and_then(|s| s.parse().ok()).unwrap_or(0);
        if received == code {
            return Ok(());
        }
        return Err(MailError::Rejected {
            command,
            response: reply.to_string(),
        });
    }
}

/// Headers plus dot-stuffed body, CRLF line endings throughout.
fn render_message(mail: &Mail) -> String {
    let mut message = String::new();

    message.push_str(&format!("From: <{}>\r\n", mail.from));
    message.push_str(&format!(
        "To: {}\r\n",
        mail.recipients
            .iter()
            .map(|recipient| format!("<{recipient}>"))
            .collect::<Vec<_>>()
            .join(", ")
    ));
    message.push_str(&format!("Subject: {}\r\n", mail.subject));
    message.push_str("MIME-Version: 1.0\r\n");
    message.push_str("Content-Type: text/plain; charset=utf-8\r\n");
    message.push_str("Content-Transfer-Encoding: 8bit\r\n");
    message.push_str("\r\n");

    for line in mail.body.lines() {
        if line.starts_with('.') {
            message.push('.');
        }
        message.push_str(line);
        message.push_str("\r\n");
    }

    message
}
