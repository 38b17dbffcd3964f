use crate::config::UpdateConfig;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("update.url is not configured")]
    NotConfigured,
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Fetches the configured remote resource and atomically replaces the local
/// target file. The download must complete within 10 seconds and answer
/// HTTP 200; anything else leaves the target untouched.
pub async fn run_self_update(client: &Client, cfg: &UpdateConfig) -> Result<(), UpdateError> {
    if cfg.url.is_empty() {
        return Err(UpdateError::NotConfigured);
    }

    let response = client
        .get(&cfg.url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(UpdateError::UnexpectedStatus(status));
    }
    let bytes = response.bytes().await?;

    write_atomic(Path::new(&cfg.target), &bytes)?;
    info!(url = %cfg.url, target = %cfg.target, bytes = bytes.len(), "update applied");
    Ok(())
}

/// Writes next to the target and renames over it, so a failed download or a
/// partial write can never leave a truncated file behind.
fn write_atomic(target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = target.as_os_str().to_owned();
    tmp.push(".download");
    let tmp = Path::new(&tmp);

    std::fs::write(tmp, contents)?;
    if let Err(err) = std::fs::rename(tmp, target) {
        let _ = std::fs::remove_file(tmp);
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("screend");
        std::fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new contents").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new contents");
        assert!(!target.with_extension("download").exists());
    }

    #[test]
    fn atomic_write_creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh");
        write_atomic(&target, b"payload").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_any_network_call() {
        let cfg = UpdateConfig {
            url: String::new(),
            target: "./screend".to_string(),
        };
        let err = run_self_update(&Client::new(), &cfg).await.unwrap_err();
        assert!(matches!(err, UpdateError::NotConfigured));
    }
}
