use crate::config::{FluxAuth, LlmConfig, ScenarioCredentials};
use crate::engine::{SseDecoder, StepEventStream, StreamEvent, StreamFeed, translate};
use crate::error::BackendError;
use crate::scenario::{ExecutionRequest, ExecutionResponse};
use crate::transcript::HistoryEntry;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use url::Url;

const STREAM_PATH: &str = "api/v1/llm/scenario/stream";
const CONFIRM_PATH: &str = "api/v1/llm/scenario/confirm";
const CHAT_PATH: &str = "api/v1/llm/chat";

/// 시나리오 백엔드와의 통신 계층을 정의한다.
#[async_trait]
pub trait ScenarioBackend: Send + Sync {
    /// 단계 이벤트 구독을 연다. 수신은 백그라운드 작업이 담당한다.
    fn open_stream(&self, credentials: &ScenarioCredentials) -> StepEventStream;

    /// 확인된 조치를 실행한다.
    async fn execute(
        &self,
        api_base: &Url,
        request: ExecutionRequest,
    ) -> Result<ExecutionResponse, BackendError>;

    /// 대화 메시지를 보내고 답변을 받는다.
    async fn chat(&self, api_base: &Url, request: ChatRequest) -> Result<String, BackendError>;
}

/// ScenarioBackend를 공유하기 위한 Arc 타입 별칭이다.
pub type SharedBackend = Arc<dyn ScenarioBackend>;

/// 대화 API 요청 본문이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<HistoryEntry>,
    pub provider: String,
    pub api_key: String,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flux_base_url: Option<String>,
}

impl ChatRequest {
    /// 대화 이력과 설정으로 요청을 만든다. Flux 인증은 있으면 함께 보낸다.
    pub fn new(messages: Vec<HistoryEntry>, llm: &LlmConfig, flux: Option<&FluxAuth>) -> Self {
        Self {
            messages,
            provider: llm.provider.clone(),
            api_key: llm.api_key.clone(),
            base_url: llm.base_url.clone(),
            auth_code: flux.map(|auth| auth.auth_code.clone()),
            flux_base_url: flux.map(|auth| auth.base_url.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// 기준 주소 뒤에 API 경로를 붙인다. 기준 주소의 하위 경로는 유지한다.
pub fn endpoint(api_base: &Url, path: &str) -> Url {
    let mut url = api_base.clone();
    let prefix = api_base.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/{path}"));
    url.set_query(None);
    url
}

/// reqwest 기반의 실제 백엔드 구현이다.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    runtime: Handle,
}

impl HttpBackend {
    /// 스트림 수신 작업을 띄울 런타임 핸들로 초기화한다.
    pub fn new(runtime: Handle) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, runtime })
    }
}

#[async_trait]
impl ScenarioBackend for HttpBackend {
    fn open_stream(&self, credentials: &ScenarioCredentials) -> StepEventStream {
        let mut url = endpoint(&credentials.api_base, STREAM_PATH);
        info!(endpoint = %url, provider = %credentials.llm.provider, "시나리오 스트림 연결");
        url.query_pairs_mut()
            .append_pair("auth_code", &credentials.flux.auth_code)
            .append_pair("flux_base_url", &credentials.flux.base_url)
            .append_pair("provider", &credentials.llm.provider)
            .append_pair("api_key", &credentials.llm.api_key)
            .append_pair("llm_base_url", &credentials.llm.base_url);

        let (feed, stream) = StepEventStream::channel();
        let client = self.client.clone();
        self.runtime.spawn(pump_stream(client, url, feed));
        stream
    }

    async fn execute(
        &self,
        api_base: &Url,
        request: ExecutionRequest,
    ) -> Result<ExecutionResponse, BackendError> {
        let url = endpoint(api_base, CONFIRM_PATH);
        info!(
            endpoint = %url,
            incidents = request.incident_ids.len(),
            ips = request.ips_to_block.len(),
            "조치 실행 요청"
        );
        let response = self.client.post(url).json(&request).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn chat(&self, api_base: &Url, request: ChatRequest) -> Result<String, BackendError> {
        let url = endpoint(api_base, CHAT_PATH);
        debug!(endpoint = %url, messages = request.messages.len(), "대화 요청");
        let response = self.client.post(url).json(&request).send().await?;
        let body = read_success_body(response).await?;
        let envelope: ChatEnvelope = serde_json::from_str(&body)?;
        if envelope.success {
            Ok(envelope.message.unwrap_or_default())
        } else {
            Err(BackendError::Envelope(
                envelope
                    .error
                    .or(envelope.message)
                    .unwrap_or_else(|| "요청 처리에 실패했습니다.".into()),
            ))
        }
    }
}

/// 2xx 응답의 본문을 읽는다. 그 외 상태는 본문을 담아 오류로 바꾼다.
async fn read_success_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "API 오류 응답");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.text().await?)
}

/// 구독이 닫힐 때까지 스트림을 읽어 이벤트를 전달한다.
async fn pump_stream(client: reqwest::Client, url: Url, feed: StreamFeed) {
    let cancel = feed.cancel_token().clone();
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!("시나리오 스트림 구독 취소");
        }
        terminal = read_stream(&client, url, &feed) => {
            if let Some(event) = terminal {
                feed.send(event);
            }
        }
    }
}

/// 종료 이벤트를 만날 때까지 읽는다. 전달할 종료 이벤트를 반환한다.
async fn read_stream(client: &reqwest::Client, url: Url, feed: &StreamFeed) -> Option<StreamEvent> {
    let response = match client
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
    {
        Ok(response) => response,
        // 쿼리에 자격 증명이 있으므로 URL을 오류 문구에서 뺀다.
        Err(err) => return Some(StreamEvent::Error(BackendError::from(err.without_url()).to_string())),
    };
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "시나리오 스트림 연결 실패");
        let err = BackendError::Status {
            status: status.as_u16(),
            body,
        };
        return Some(StreamEvent::Error(err.to_string()));
    }

    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                return Some(StreamEvent::Error(BackendError::from(err.without_url()).to_string()));
            }
        };
        for frame in decoder.push(&chunk) {
            match translate(&frame) {
                Some(StreamEvent::StepComplete(completion)) => {
                    if !feed.send(StreamEvent::StepComplete(completion)) {
                        return None;
                    }
                }
                Some(terminal) => return Some(terminal),
                None => {}
            }
        }
    }
    if let Some(frame) = decoder.finish() {
        match translate(&frame) {
            Some(StreamEvent::StepComplete(completion)) => {
                feed.send(StreamEvent::StepComplete(completion));
            }
            Some(terminal) => return Some(terminal),
            None => {}
        }
    }
    info!("complete 이벤트 없이 스트림이 종료됨");
    Some(StreamEvent::Disconnected)
}
