use crate::config::DatabaseConfig;
use crate::report::DatabaseStatus;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time;
use tracing::warn;

// The server greeting is a few hundred bytes; anything larger is not MySQL.
const MAX_GREETING_BYTES: usize = 16 * 1024;
const PROTOCOL_V10: u8 = 0x0a;
const ERR_PACKET: u8 = 0xff;

/// Liveness probe against the configured MySQL endpoint. Connects with the
/// configured timeout and reads the server greeting, which carries the
/// version string before any authentication. Every failure mode (refused
/// connection, timeout, malformed greeting, server-side error packet) is
/// folded into `connected: false`; nothing propagates past this boundary.
///
/// The connection lives only inside this call and is closed on every exit
/// path when the stream drops.
pub async fn probe_database(cfg: &DatabaseConfig) -> DatabaseStatus {
    let addr = format!("{}:{}", cfg.host, cfg.port);

    match time::timeout(Duration::from_millis(cfg.timeout_ms), read_greeting(&addr)).await {
        Ok(Ok(version)) => DatabaseStatus {
            connected: true,
            server_version: Some(version),
        },
        Ok(Err(err)) => {
            warn!(address = %addr, error = %err, "database probe failed");
            DatabaseStatus::default()
        }
        Err(_elapsed) => {
            warn!(address = %addr, timeout_ms = cfg.timeout_ms, "database probe timeout");
            DatabaseStatus::default()
        }
    }
}

async fn read_greeting(addr: &str) -> io::Result<String> {
    let mut stream = TcpStream::connect(addr).await?;

    let mut header = [0_u8; 4];
    stream.read_exact(&mut header).await?;
    let payload_len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
    if payload_len == 0 || payload_len > MAX_GREETING_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("implausible greeting length {payload_len}"),
        ));
    }

    let mut payload = vec![0_u8; payload_len];
    stream.read_exact(&mut payload).await?;

    parse_greeting(&payload)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed server greeting"))
}

/// Extracts the server version from a handshake payload: one protocol byte
/// (must be protocol 10), then a NUL-terminated version string. An error
/// packet (0xff) means the server answered but refused us; for a liveness
/// probe that still counts as not connected.
fn parse_greeting(payload: &[u8]) -> Option<String> {
    let (&first, rest) = payload.split_first()?;
    if first == ERR_PACKET || first != PROTOCOL_V10 {
        return None;
    }

    let end = rest.iter().position(|&b| b == 0)?;
    let version = std::str::from_utf8(&rest[..end]).ok()?.trim();
    if version.is_empty() {
        return None;
    }
    Some(version.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn greeting_payload(version: &str) -> Vec<u8> {
        let mut payload = vec![PROTOCOL_V10];
        payload.extend_from_slice(version.as_bytes());
        payload.push(0);
        // Remainder of the real handshake (thread id, salt, flags) is
        // irrelevant to the probe.
        payload.extend_from_slice(&[1, 2, 3, 4]);
        payload
    }

    fn framed(payload: &[u8]) -> Vec<u8> {
        let len = (payload.len() as u32).to_le_bytes();
        let mut packet = vec![len[0], len[1], len[2], 0];
        packet.extend_from_slice(payload);
        packet
    }

    #[test]
    fn greeting_parsing_extracts_version() {
        assert_eq!(
            parse_greeting(&greeting_payload("8.0.36")),
            Some("8.0.36".to_string())
        );
    }

    #[test]
    fn error_packet_and_garbage_are_rejected() {
        assert_eq!(parse_greeting(&[ERR_PACKET, 0x15, 0x04]), None);
        assert_eq!(parse_greeting(&[0x09, b'x', 0]), None);
        assert_eq!(parse_greeting(&[]), None);
        assert_eq!(parse_greeting(&[PROTOCOL_V10]), None);
    }

    #[tokio::test]
    async fn probe_reads_version_from_live_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let packet = framed(&greeting_payload("8.0.36-test"));
            socket.write_all(&packet).await.unwrap();
        });

        let cfg = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..DatabaseConfig::default()
        };
        let status = probe_database(&cfg).await;
        assert!(status.connected);
        assert_eq!(status.server_version.as_deref(), Some("8.0.36-test"));
    }

    #[tokio::test]
    async fn probe_reports_disconnected_on_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let cfg = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..DatabaseConfig::default()
        };
        let status = probe_database(&cfg).await;
        assert!(!status.connected);
        assert!(status.server_version.is_none());
    }

    #[tokio::test]
    async fn probe_times_out_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            // Hold the connection open without ever sending a greeting.
            time::sleep(Duration::from_secs(5)).await;
        });

        let cfg = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port,
            timeout_ms: 200,
            ..DatabaseConfig::default()
        };
        let status = probe_database(&cfg).await;
        assert!(!status.connected);
    }
}
