use std::time::Duration;

use bindery_core::{
    ActionReply, AnalyticsSnapshot, Job, SessionInfo, UploadInput, UploadOutcome, UploadSettings,
};
use bindery_logging::{bindery_debug, bindery_trace};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ApiError, FailureKind};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request budget; uploads of large books need the headroom.
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

impl ClientSettings {
    /// Join a server-relative path such as a job's `downloadUrl` onto the base URL.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// The conversion service's job-queue API.
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    async fn session(&self) -> Result<SessionInfo, ApiError>;
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;
    async fn create_job(
        &self,
        input: &UploadInput,
        settings: &UploadSettings,
    ) -> Result<UploadOutcome, ApiError>;
    async fn retry_job(&self, job_id: &str) -> Result<ActionReply, ApiError>;
    /// Cancels a processing job, deletes any other.
    async fn delete_job(&self, job_id: &str) -> Result<ActionReply, ApiError>;
    async fn clear_jobs(&self) -> Result<(), ApiError>;
    async fn reveal_job(&self, job_id: &str) -> Result<ActionReply, ApiError>;
    async fn update_profile(&self, display_name: &str) -> Result<Option<String>, ApiError>;
    async fn analytics(&self) -> Result<AnalyticsSnapshot, ApiError>;
}

#[derive(Debug, Deserialize)]
struct JobsEnvelope {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct CreatedEnvelope {
    job: Job,
    #[serde(default)]
    skipped: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActionEnvelope {
    job: Option<Job>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest<'a> {
    display_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProfileEnvelope {
    display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestJobApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let parsed = reqwest::Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.settings.resolve(path);
        bindery_trace!("{method} {url}");
        self.client.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = self.read_body(response).await?;
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                error_message(&body, status.canonical_reason().unwrap_or("request failed")),
            ));
        }
        Ok(body)
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, ApiError> {
        let limit = self.settings.max_response_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(ApiError::new(FailureKind::Decode, "response too large"));
        }
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            if body.len() as u64 + chunk.len() as u64 > limit {
                return Err(ApiError::new(FailureKind::Decode, "response too large"));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        decode(&body)
    }

    /// Like `send_json`, but an empty body reads as the default value.
    async fn send_json_or_default<T: DeserializeOwned + Default>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        decode(&body)
    }
}

#[async_trait::async_trait]
impl JobApi for ReqwestJobApi {
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        self.send_json(self.request(Method::GET, "/api/session")).await
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let envelope: JobsEnvelope = self.send_json(self.request(Method::GET, "/api/jobs")).await?;
        Ok(envelope.jobs)
    }

    async fn create_job(
        &self,
        input: &UploadInput,
        settings: &UploadSettings,
    ) -> Result<UploadOutcome, ApiError> {
        let file = Part::bytes(input.payload().to_vec())
            .file_name(input.filename().to_string())
            .mime_str(input.mime_type())
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("pageSize", settings.page_size.as_str())
            .text("margin", settings.margin_mm.to_string())
            .text("force", if settings.force { "true" } else { "false" });

        bindery_debug!("uploading {} ({} bytes)", input.filename(), input.payload().len());
        let envelope: CreatedEnvelope = self
            .send_json(self.request(Method::POST, "/api/jobs").multipart(form))
            .await?;
        Ok(if envelope.skipped {
            UploadOutcome::Skipped(envelope.job)
        } else {
            UploadOutcome::Created(envelope.job)
        })
    }

    async fn retry_job(&self, job_id: &str) -> Result<ActionReply, ApiError> {
        self.action(Method::POST, &format!("/api/jobs/{job_id}/retry")).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<ActionReply, ApiError> {
        self.action(Method::DELETE, &format!("/api/jobs/{job_id}")).await
    }

    async fn clear_jobs(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, "/api/jobs")).await.map(|_| ())
    }

    async fn reveal_job(&self, job_id: &str) -> Result<ActionReply, ApiError> {
        self.action(Method::POST, &format!("/api/jobs/{job_id}/reveal")).await
    }

    async fn update_profile(&self, display_name: &str) -> Result<Option<String>, ApiError> {
        let body = serde_json::to_vec(&ProfileRequest { display_name })
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let envelope: ProfileEnvelope = self
            .send_json_or_default(
                self.request(Method::POST, "/api/profile")
                    .header(CONTENT_TYPE, "application/json")
                    .body(body),
            )
            .await?;
        Ok(envelope.display_name.filter(|name| !name.trim().is_empty()))
    }

    async fn analytics(&self) -> Result<AnalyticsSnapshot, ApiError> {
        self.send_json(self.request(Method::GET, "/api/analytics")).await
    }
}

impl ReqwestJobApi {
    async fn action(&self, method: Method, path: &str) -> Result<ActionReply, ApiError> {
        let envelope: ActionEnvelope = self.send_json_or_default(self.request(method, path)).await?;
        Ok(ActionReply {
            job: envelope.job,
            message: envelope.message,
        })
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Prefer the service's `{"error": ...}` body, then a short plain-text body.
fn error_message(body: &[u8], fallback: &str) -> String {
    if let Ok(ErrorEnvelope { error: Some(error) }) =
        serde_json::from_slice::<ErrorEnvelope>(body)
    {
        return error;
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() || text.starts_with('<') {
        return fallback.to_string();
    }
    text.chars().take(200).collect()
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
    fn resolve_joins_relative_paths() {
        let settings = ClientSettings {
            base_url: "http://host:5000/".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.resolve("/api/jobs/a/download"),
            "http://host:5000/api/jobs/a/download"
        );
        assert_eq!(settings.resolve("https://cdn/x.pdf"), "https://cdn/x.pdf");
    }

    #[test]
    fn error_message_prefers_json_error() {
        assert_eq!(
            error_message(br#"{"error":"Missing file upload"}"#, "Bad Request"),
            "Missing file upload"
        );
        assert_eq!(error_message(b"<!doctype html>", "Not Found"), "Not Found");
        assert_eq!(error_message(b"", "Conflict"), "Conflict");
        assert_eq!(error_message(b"busy", "Conflict"), "busy");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let settings = ClientSettings {
            base_url: "ftp://example.com".to_string(),
            ..ClientSettings::default()
        };
        let err = ReqwestJobApi::new(settings).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
