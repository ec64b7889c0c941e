use std::time::Duration;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

use cleanmails_logging::clean_debug;

use crate::wire::{
    CreateJobRequest, CreateJobResponse, ErrorBody, JobSnapshot, JobStatusResponse, NetworkCheck,
    ResultItem, ResultsResponse, VerifyRequest, WireResult,
};
use crate::{ApiError, FailureKind};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            token: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The verification backend as seen by the engine.
#[async_trait::async_trait]
pub trait VerifierApi: Send + Sync {
    /// `POST /v1/bulk`; returns the backend job id.
    async fn create_job(&self, emails: &[String], level: u8) -> Result<String, ApiError>;

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError>;

    async fn job_results(&self, job_id: &str, limit: u32) -> Result<Vec<ResultItem>, ApiError>;

    /// `POST /v1/verify` for a single address.
    async fn verify(&self, email: &str, level: u8) -> Result<WireResult, ApiError>;

    async fn network_check(&self) -> Result<NetworkCheck, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestVerifierApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestVerifierApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot carry a path", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.settings.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let backend_message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|body| body.error)
                .filter(|message| !message.is_empty());
            clean_debug!("Backend answered {}: {:?}", status, backend_message);
            return Err(
                ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                    .with_backend_message(backend_message),
            );
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl VerifierApi for ReqwestVerifierApi {
    async fn create_job(&self, emails: &[String], level: u8) -> Result<String, ApiError> {
        let url = self.endpoint(&["v1", "bulk"])?;
        let body = CreateJobRequest { emails, level };
        let created: CreateJobResponse = self.send_json(self.client.post(url).json(&body)).await?;
        Ok(created.id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let url = self.endpoint(&["v1", "bulk", job_id])?;
        let status: JobStatusResponse = self.send_json(self.client.get(url)).await?;
        Ok(status.job)
    }

    async fn job_results(&self, job_id: &str, limit: u32) -> Result<Vec<ResultItem>, ApiError> {
        let mut url = self.endpoint(&["v1", "bulk", job_id, "results"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let results: ResultsResponse = self.send_json(self.client.get(url)).await?;
        Ok(results.results)
    }

    async fn verify(&self, email: &str, level: u8) -> Result<WireResult, ApiError> {
        let url = self.endpoint(&["v1", "verify"])?;
        let body = VerifyRequest { email, level };
        self.send_json(self.client.post(url).json(&body)).await
    }

    async fn network_check(&self) -> Result<NetworkCheck, ApiError> {
        let url = self.endpoint(&["v1", "network-check"])?;
        self.send_json(self.client.get(url)).await
    }
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
