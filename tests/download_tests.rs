//! Tests for download materialization.

mod common;

use std::sync::Arc;

use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::MemoryConnector;
use connector_agent::config::AgentConfig;
use connector_agent::error::AgentError;
use connector_agent::tools::{DownloadMaterializer, ToolPipeline};

fn pdf_chunks() -> Vec<Vec<u8>> {
    vec![b"%PD".to_vec(), b"F-1.7\n".to_vec(), vec![0u8; 64], b"%%EOF".to_vec()]
}

#[tokio::test]
async fn pdf_bytes_are_saved_with_pdf_extension() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = DownloadMaterializer::new(dir.path());
    let chunks = futures::stream::iter(pdf_chunks().into_iter().map(Ok::<_, AgentError>));

    let artifact = materializer.materialize(chunks, "call_recordings").await.unwrap();

    assert_eq!(artifact.path.extension().and_then(|ext| ext.to_str()), Some("pdf"));
    assert_eq!(artifact.path.parent(), Some(dir.path()));
    assert_eq!(artifact.size_bytes, 3 + 6 + 64 + 5);
    assert_eq!(artifact.entity, "call_recordings");
    assert!(artifact.message.contains(&artifact.path.display().to_string()));

    let written = tokio::fs::read(&artifact.path).await.unwrap();
    assert_eq!(written, pdf_chunks().concat());
}

#[tokio::test]
async fn only_the_final_file_remains() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = DownloadMaterializer::new(dir.path().join("nested"));
    let chunks = futures::stream::iter(vec![Ok::<_, AgentError>(b"plain text".to_vec())]);

    let artifact = materializer.materialize(chunks, "notes").await.unwrap();

    assert_eq!(artifact.path.extension().and_then(|ext| ext.to_str()), Some("bin"));
    let mut entries = tokio::fs::read_dir(dir.path().join("nested")).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.path());
    }
    assert_eq!(names, vec![artifact.path]);
}

#[tokio::test]
async fn failed_stream_leaves_no_partial_file() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = DownloadMaterializer::new(dir.path());
    let chunks = futures::stream::iter(vec![
        Ok(b"%PDF-".to_vec()),
        Err(AgentError::connector("memory", "connection reset")),
    ])
    .boxed();

    let err = materializer.materialize(chunks, "calls").await.unwrap_err();

    assert!(matches!(err, AgentError::Connector { .. }));
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn execute_download_returns_artifact_json() {
    let dir = tempfile::tempdir().unwrap();
    let connector = MemoryConnector::new().with_download("recording", pdf_chunks());
    let pipeline = ToolPipeline::new(
        Arc::new(connector),
        AgentConfig::new().with_download_dir(dir.path()),
    );

    let out = pipeline
        .invoke(&json!({"entity": "recording", "action": "download", "params": {"id": "42"}}))
        .await
        .unwrap();

    let path = out["path"].as_str().unwrap();
    assert!(path.ends_with(".pdf"));
    assert_eq!(out["size_bytes"], json!(78));
    assert_eq!(out["entity"], json!("recording"));
    assert!(out["message"].as_str().unwrap().contains(path));
    assert!(std::path::Path::new(path).exists());
}
