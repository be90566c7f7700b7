//! HTTP implementation of the analysis service contract

use std::time::{Duration, Instant};

use agent_optimizer_sdk::{
    async_trait, AnalysisBackend, AnalysisOutcome, AnswerPayload, ChatRequest, FlowchartRequest,
    TransportError,
};
use reqwest::{multipart, Client, Response};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;

const GENERATE_DECK_PATH: &str = "generate_deck/";
const CHAT_PATH: &str = "chat";
const DOWNLOAD_PATH: &str = "download_pptx/";
const FLOWCHART_PATH: &str = "generate_flowchart";

/// Talks to the analysis service over HTTP
pub struct HttpBackend {
    client: Client,
    config: Config,
}

impl HttpBackend {
    pub fn new(config: Config) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout(self.config.request_timeout.as_secs())
        } else {
            TransportError::Network(e.to_string())
        }
    }

    /// Turn a non-2xx response into an error, preferring the backend's own message
    async fn error_from(response: Response, fallback: &str) -> TransportError {
        let status = response.status().as_u16();
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());

        warn!(status, message = %message, "backend returned an error");
        TransportError::Api { status, message }
    }

    async fn checked(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
        fallback: &str,
    ) -> Result<Response, TransportError> {
        let started = Instant::now();
        let response = request.send().await.map_err(|e| self.send_error(e))?;
        info!(
            endpoint,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response, fallback).await)
        }
    }

    async fn bytes(&self, response: Response) -> Result<Vec<u8>, TransportError> {
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| self.send_error(e))
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    #[instrument(skip_all, fields(base = %self.config.api_base_url))]
    async fn generate_deck(
        &self,
        payload: &AnswerPayload,
    ) -> Result<AnalysisOutcome, TransportError> {
        let form = payload
            .fields
            .iter()
            .fold(multipart::Form::new(), |form, (key, value)| {
                form.text(key.clone(), value.clone())
            });
        debug!(fields = payload.fields.len(), "submitting answers");

        let request = self
            .client
            .post(self.config.endpoint(GENERATE_DECK_PATH))
            .multipart(form);
        let response = self
            .checked(request, GENERATE_DECK_PATH, "Failed to generate deck")
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(AnalysisOutcome::from_response(&body))
    }

    #[instrument(skip_all, fields(messages = request.messages.len()))]
    async fn chat(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let builder = self.client.post(self.config.endpoint(CHAT_PATH)).json(request);
        let response = self.checked(builder, CHAT_PATH, "Failed to get reply").await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        body.get("reply")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TransportError::Decode("response has no 'reply' field".to_string()))
    }

    #[instrument(skip(self))]
    async fn download_artifact(&self, artifact: &str) -> Result<Vec<u8>, TransportError> {
        let builder = self
            .client
            .get(self.config.endpoint(DOWNLOAD_PATH))
            .query(&[("pptx_file", artifact)]);
        let response = self
            .checked(builder, DOWNLOAD_PATH, "Failed to download PPTX file")
            .await?;
        self.bytes(response).await
    }

    #[instrument(skip_all, fields(points = request.points.len()))]
    async fn generate_flowchart(
        &self,
        request: &FlowchartRequest,
    ) -> Result<Vec<u8>, TransportError> {
        let builder = self
            .client
            .post(self.config.endpoint(FLOWCHART_PATH))
            .json(request);
        let response = self
            .checked(builder, FLOWCHART_PATH, "Failed to generate flowchart")
            .await?;
        self.bytes(response).await
    }
}
