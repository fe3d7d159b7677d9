//! Materialize streamed binary downloads into files.
//!
//! Downloaded bytes never go back to the model. They are streamed into a
//! fresh file in the download directory, the file is renamed after its
//! sniffed content type, and only a [`DownloadArtifact`] describing it is
//! returned.

use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::AgentError;

/// Bytes kept from the start of the stream for content sniffing.
const SNIFF_LEN: usize = 16;

/// Metadata for a fully written download.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub entity: String,
    pub message: String,
}

/// Writes byte streams into a download directory.
#[derive(Debug, Clone)]
pub struct DownloadMaterializer {
    download_dir: PathBuf,
}

impl DownloadMaterializer {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Stream `chunks` to disk and return the artifact once the file is final.
    ///
    /// A failed chunk aborts the download and removes the partial file.
    pub async fn materialize<S, B>(
        &self,
        chunks: S,
        entity: &str,
    ) -> Result<DownloadArtifact, AgentError>
    where
        S: Stream<Item = Result<B, AgentError>>,
        B: AsRef<[u8]>,
    {
        tokio::fs::create_dir_all(&self.download_dir).await?;
        let staging = self
            .download_dir
            .join(format!("{}-{}", file_stem(entity), Uuid::new_v4().simple()));

        let (size_bytes, header) = match write_chunks(&staging, chunks).await {
            Ok(written) => written,
            Err(err) => {
                let _ = tokio::fs::remove_file(&staging).await;
                return Err(err);
            }
        };

        let extension = sniff_extension(&header);
        let path = staging.with_extension(extension);
        finalize(&staging, &path).await?;
        tracing::debug!(
            entity,
            path = %path.display(),
            size_bytes,
            extension,
            "download materialized"
        );

        let message = format!(
            "Downloaded {entity} ({size_bytes} bytes) to {}. The content was saved to disk \
             instead of being returned inline; read the file at this path to inspect it.",
            path.display()
        );
        Ok(DownloadArtifact {
            path,
            size_bytes,
            entity: entity.to_string(),
            message,
        })
    }
}

async fn write_chunks<S, B>(path: &Path, chunks: S) -> Result<(u64, Vec<u8>), AgentError>
where
    S: Stream<Item = Result<B, AgentError>>,
    B: AsRef<[u8]>,
{
    let mut file = tokio::fs::File::create(path).await?;
    let mut header = Vec::with_capacity(SNIFF_LEN);
    let mut size_bytes = 0u64;

    let mut chunks = std::pin::pin!(chunks);
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let bytes = chunk.as_ref();
        if header.len() < SNIFF_LEN {
            let take = (SNIFF_LEN - header.len()).min(bytes.len());
            header.extend_from_slice(&bytes[..take]);
        }
        file.write_all(bytes).await?;
        size_bytes += bytes.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    Ok((size_bytes, header))
}

/// Move the staging file into place, removing it if the move fails.
async fn finalize(staging: &Path, path: &Path) -> Result<(), AgentError> {
    if let Err(err) = tokio::fs::rename(staging, path).await {
        let _ = tokio::fs::remove_file(staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn file_stem(entity: &str) -> String {
    let stem: String = entity
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "download".to_string()
    } else {
        stem
    }
}

/// File extension for the content type identified by its leading bytes.
pub fn sniff_extension(header: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "pdf"),
        (b"\x89PNG\r\n\x1a\n", "png"),
        (b"\xff\xd8\xff", "jpg"),
        (b"GIF87a", "gif"),
        (b"GIF89a", "gif"),
        (b"PK\x03\x04", "zip"),
        (b"\x1f\x8b", "gz"),
        (b"BM", "bmp"),
        (b"ID3", "mp3"),
        (b"OggS", "ogg"),
        (b"fLaC", "flac"),
        (b"\x25\x21PS", "ps"),
        (b"{\\rtf", "rtf"),
        (b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1", "doc"),
    ];
    if let Some(ext) = SIGNATURES
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, ext)| *ext)
    {
        return ext;
    }
    if header.len() >= 12 && &header[..4] == b"RIFF" {
        match &header[8..12] {
            b"WEBP" => return "webp",
            b"WAVE" => return "wav",
            _ => {}
        }
    }
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"qt  " => "mov",
            b"M4A " => "m4a",
            _ => "mp4",
        };
    }
    "bin"
}
