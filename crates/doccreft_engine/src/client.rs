use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use doccreft_logging::{dc_debug, dc_info};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, CompressOutput, FailureKind, PdfOutput, UploadedFile};

pub const DEFAULT_API_BASE: &str = "http://localhost:5001/api";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

impl ClientSettings {
    /// Builds `{api_base}/{segments...}`, percent-encoding each segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, self.api_base.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL a stored file is served from; also used for image thumbnails.
    pub fn download_url(&self, server_name: &str) -> Result<Url, ApiError> {
        self.endpoint(&["download", server_name])
    }
}

/// Typed access to the DocCreft backend.
#[async_trait::async_trait]
pub trait DocApi: Send + Sync {
    async fn usage_count(&self) -> Result<u64, ApiError>;

    async fn upload(&self, paths: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError>;

    async fn convert(&self, files: &[String], output_name: &str) -> Result<PdfOutput, ApiError>;

    async fn merge(&self, files: &[String]) -> Result<PdfOutput, ApiError>;

    async fn compress(&self, server_name: &str, quality: u8) -> Result<CompressOutput, ApiError>;

    async fn rotate(
        &self,
        server_name: &str,
        rotations: &BTreeMap<u32, i32>,
    ) -> Result<PdfOutput, ApiError>;

    async fn delete_pages(&self, server_name: &str, pages: &[u32]) -> Result<PdfOutput, ApiError>;

    async fn download(&self, server_filename: &str) -> Result<Bytes, ApiError>;
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    files: &'a [String],
    output_name: &'a str,
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    files: &'a [String],
}

#[derive(Serialize)]
struct CompressRequest<'a> {
    file: &'a str,
    quality: u8,
}

#[derive(Serialize)]
struct RotateRequest<'a> {
    file: &'a str,
    rotations: &'a BTreeMap<u32, i32>,
}

#[derive(Serialize)]
struct DeletePagesRequest<'a> {
    file: &'a str,
    pages: &'a [u32],
}

#[derive(Deserialize)]
struct CounterResponse {
    count: Option<u64>,
}

#[derive(Deserialize)]
struct UploadResponse {
    files: Option<Vec<UploadedFile>>,
}

#[derive(Deserialize)]
struct PdfResponse {
    pdf_url: Option<String>,
    filename: Option<String>,
}

#[derive(Deserialize)]
struct CompressResponse {
    url: Option<String>,
    filename: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct ReqwestDocApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestDocApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        // Fail early on a base that can't carry path segments.
        settings.endpoint(&[])?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.settings.endpoint(&[endpoint])?;
        dc_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_json(response).await
    }

    fn pdf_output(response: PdfResponse) -> Result<PdfOutput, ApiError> {
        let pdf_url = response
            .pdf_url
            .ok_or_else(|| ApiError::new(FailureKind::MissingField("pdf_url"), ""))?;
        let filename = response
            .filename
            .ok_or_else(|| ApiError::new(FailureKind::MissingField("filename"), ""))?;
        Ok(PdfOutput { pdf_url, filename })
    }
}

#[async_trait::async_trait]
impl DocApi for ReqwestDocApi {
    async fn usage_count(&self) -> Result<u64, ApiError> {
        let url = self.settings.endpoint(&["counter"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: CounterResponse = read_json(response).await?;
        Ok(body.count.unwrap_or(0))
    }

    async fn upload(&self, paths: &[PathBuf]) -> Result<Vec<UploadedFile>, ApiError> {
        let mut form = Form::new();
        let mut total_bytes = 0usize;
        for path in paths {
            let data = tokio::fs::read(path).await.map_err(|err| {
                ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))
            })?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            total_bytes += data.len();
            form = form.part("files", Part::bytes(data).file_name(file_name));
        }

        let url = self.settings.endpoint(&["upload"])?;
        dc_info!(
            "POST {} files={} bytes={}",
            url,
            paths.len(),
            total_bytes
        );
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: UploadResponse = read_json(response).await?;
        Ok(body.files.unwrap_or_default())
    }

    async fn convert(&self, files: &[String], output_name: &str) -> Result<PdfOutput, ApiError> {
        let body: PdfResponse = self
            .post_json("convert", &ConvertRequest { files, output_name })
            .await?;
        Self::pdf_output(body)
    }

    async fn merge(&self, files: &[String]) -> Result<PdfOutput, ApiError> {
        let body: PdfResponse = self.post_json("merge", &MergeRequest { files }).await?;
        Self::pdf_output(body)
    }

    async fn compress(&self, server_name: &str, quality: u8) -> Result<CompressOutput, ApiError> {
        let body: CompressResponse = self
            .post_json(
                "compress",
                &CompressRequest {
                    file: server_name,
                    quality,
                },
            )
            .await?;
        let url = body
            .url
            .ok_or_else(|| ApiError::new(FailureKind::MissingField("url"), ""))?;
        let filename = body
            .filename
            .ok_or_else(|| ApiError::new(FailureKind::MissingField("filename"), ""))?;
        Ok(CompressOutput { url, filename })
    }

    async fn rotate(
        &self,
        server_name: &str,
        rotations: &BTreeMap<u32, i32>,
    ) -> Result<PdfOutput, ApiError> {
        let body: PdfResponse = self
            .post_json(
                "rotate",
                &RotateRequest {
                    file: server_name,
                    rotations,
                },
            )
            .await?;
        Self::pdf_output(body)
    }

    async fn delete_pages(&self, server_name: &str, pages: &[u32]) -> Result<PdfOutput, ApiError> {
        let body: PdfResponse = self
            .post_json(
                "delete-pages",
                &DeletePagesRequest {
                    file: server_name,
                    pages,
                },
            )
            .await?;
        Self::pdf_output(body)
    }

    async fn download(&self, server_filename: &str) -> Result<Bytes, ApiError> {
        let url = self.settings.download_url(server_filename)?;
        dc_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "download too large",
                ));
            }
        }

        let mut bytes = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "download too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes.freeze())
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status, response).await);
    }
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Error for a non-success status, preferring the backend's `{error}` text.
async fn status_error(status: StatusCode, response: reqwest::Response) -> ApiError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| status.to_string());
    ApiError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.endpoint(&["counter"]).unwrap().as_str(),
            "http://localhost:5001/api/counter"
        );

        let settings = ClientSettings {
            api_base: "https://docs.example.com/api/".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.endpoint(&["delete-pages"]).unwrap().as_str(),
            "https://docs.example.com/api/delete-pages"
        );
    }

    #[test]
    fn download_url_encodes_server_name() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.download_url("a b/c.png").unwrap().as_str(),
            "http://localhost:5001/api/download/a%20b%2Fc.png"
        );
    }

    #[test]
    fn invalid_base_is_rejected() {
        let settings = ClientSettings {
            api_base: "not a url".to_string(),
            ..ClientSettings::default()
        };
        let err = ReqwestDocApi::new(settings).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);

        let settings = ClientSettings {
            api_base: "mailto:someone@example.com".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.endpoint(&["counter"]).unwrap_err().kind,
            FailureKind::InvalidUrl
        );
    }
}
