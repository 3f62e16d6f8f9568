use std::path::{Path, PathBuf};

use clap::Args;
use serde_json::Value;

use service::http::api::client::ApiError;
use service::http::api::v1::{UploadRequest, UploadResponse};

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// JSON file to upload
    pub file: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path:?} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("upload failed: {0}")]
    Api(#[from] ApiError),
}

/// Read and parse the payload file
pub async fn load_payload(path: &Path) -> Result<Value, UploadError> {
    let raw = tokio::fs::read(path).await.map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| UploadError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

fn render(response: &UploadResponse) -> String {
    format!(
        "{}\n  state:   {}\n  session: {}",
        response.message, response.state, response.session_id
    )
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let payload = load_payload(&self.file).await?;
        let response = ctx.client.call(UploadRequest { payload }).await?;
        Ok(render(&response))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn test_load_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": 1}}"#).unwrap();
        let payload = load_payload(file.path()).await.unwrap();
        assert_eq!(payload, serde_json::json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_load_payload_rejects_bad_input() {
        let missing = PathBuf::from("/nonexistent/sample.json");
        assert!(matches!(
            load_payload(&missing).await,
            Err(UploadError::Read { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_payload(file.path()).await,
            Err(UploadError::InvalidJson { .. })
        ));
    }
}
