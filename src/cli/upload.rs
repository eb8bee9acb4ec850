//! Two-phase image upload: read the file, then encode and send it.
//!
//! The phases are separate awaitable operations composed in order. A failed
//! read never reaches the network, and a cancelled token stops whichever phase
//! is running.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::cli::client::{ApiClient, ClientError};
use crate::services::UploadedImage;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is empty")]
    Empty(PathBuf),

    #[error("{0} has no usable file name")]
    NoFileName(PathBuf),

    #[error("upload failed: {0}")]
    Send(#[from] ClientError),

    #[error("upload cancelled")]
    Cancelled,
}

/// Bytes read from disk, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Phase one: read the file
pub async fn read_image(path: &Path, cancel: &CancellationToken) -> Result<ImageFile, UploadError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| UploadError::NoFileName(path.to_path_buf()))?
        .to_string();

    let bytes = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(UploadError::Cancelled),
        read = tokio::fs::read(path) => read.map_err(|source| UploadError::Read {
            path: path.to_path_buf(),
            source,
        })?,
    };

    if bytes.is_empty() {
        return Err(UploadError::Empty(path.to_path_buf()));
    }

    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(ImageFile { file_name, bytes })
}

/// Phase two: base64-encode and post to the upload endpoint
pub async fn send_image(
    client: &ApiClient,
    image: &ImageFile,
    cancel: &CancellationToken,
) -> Result<UploadedImage, UploadError> {
    if cancel.is_cancelled() {
        return Err(UploadError::Cancelled);
    }

    let body = json!({
        "fileName": image.file_name,
        "fileData": image.to_base64(),
    });

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
        sent = client.post::<UploadedImage, _>("/api/entries/images", &body) => Ok(sent?),
    }
}

/// Both phases in sequence
pub async fn upload_image(
    client: &ApiClient,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<UploadedImage, UploadError> {
    let image = read_image(path, cancel).await?;
    let uploaded = send_image(client, &image, cancel).await?;
    tracing::info!("Uploaded {} as {}", image.file_name, uploaded.key);
    Ok(uploaded)
}

/// Token cancelled on Ctrl-C. The listener task ends with the process.
pub fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling upload");
            trigger.cancel();
        }
    });
    token
}
