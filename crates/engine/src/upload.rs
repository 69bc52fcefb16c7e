//! Image upload for wallet icons and transaction receipts.
//!
//! Images are hosted by an external service; the engine only stores the URL
//! it gets back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Image attached to a wallet or transaction command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Already hosted; stored as is.
    Url(String),
    /// Local file to upload before anything else happens.
    File(PathBuf),
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads `path` into `folder` and returns the public URL.
    async fn upload(&self, path: &Path, folder: &str) -> ResultEngine<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Uploads files with a multipart `POST` to an unsigned upload endpoint.
///
/// The form carries `file`, `folder` and, when configured, `upload_preset`.
/// The JSON answer must contain `secure_url` or `url`.
#[derive(Clone, Debug)]
pub struct HttpImageUploader {
    client: reqwest::Client,
    url: String,
    preset: Option<String>,
}

impl HttpImageUploader {
    pub fn new(url: impl Into<String>, preset: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            preset,
        }
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, path: &Path, folder: &str) -> ResultEngine<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| EngineError::Upload(format!("{}: {err}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("folder", folder.to_string());
        if let Some(preset) = &self.preset {
            form = form.text("upload_preset", preset.clone());
        }

        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Upload(format!(
                "upload endpoint answered {status}"
            )));
        }

        let body: UploadResponse = response.json().await?;
        body.secure_url
            .or(body.url)
            .ok_or_else(|| EngineError::Upload("upload response carries no url".to_string()))
    }
}
