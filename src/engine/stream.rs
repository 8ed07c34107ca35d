use super::events::{StepCompletion, StreamEvent};
use super::sse::SseFrame;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// 스트림 오류 본문에 메시지가 없을 때 사용하는 문구이다.
pub const STREAM_ERROR_FALLBACK: &str = "시나리오 실행 중 오류가 발생했습니다.";

/// 단계 결과를 해석하지 못했을 때 오류 문구 앞에 붙는 접두어이다.
const STEP_DECODE_FAILURE: &str = "분석 단계 결과를 해석하지 못했습니다";

/// 구독을 소유하는 쪽에서 이벤트를 읽는 핸들이다.
///
/// 드롭하거나 [`close`](Self::close)하면 생산자 작업이 취소된다.
#[derive(Debug)]
pub struct StepEventStream {
    events: UnboundedReceiver<StreamEvent>,
    cancel: CancellationToken,
    finished: bool,
}

/// 생산자 작업이 이벤트를 보내는 쪽이다.
#[derive(Debug, Clone)]
pub struct StreamFeed {
    sender: UnboundedSender<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamFeed {
    /// 이벤트를 보낸다. 구독이 이미 닫혔으면 `false`를 반환한다.
    pub fn send(&self, event: StreamEvent) -> bool {
        !self.cancel.is_cancelled() && self.sender.send(event).is_ok()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl StepEventStream {
    /// 연결된 생산자/소비자 쌍을 만든다.
    pub fn channel() -> (StreamFeed, Self) {
        let (sender, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        (
            StreamFeed {
                sender,
                cancel: cancel.clone(),
            },
            Self {
                events,
                cancel,
                finished: false,
            },
        )
    }

    /// 대기 없이 다음 이벤트를 꺼낸다.
    ///
    /// 종료 이벤트(`Complete`, `Error`, `Disconnected`)를 한 번 돌려준 뒤에는 항상 `None`이다.
    /// 생산자가 종료 이벤트 없이 사라지면 `Disconnected`로 알린다.
    pub fn try_next(&mut self) -> Option<StreamEvent> {
        if self.finished {
            return None;
        }
        let event = match self.events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => StreamEvent::Disconnected,
        };
        if !matches!(event, StreamEvent::StepComplete(_)) {
            self.finished = true;
        }
        Some(event)
    }

    /// 구독을 닫고 생산자 작업을 취소한다.
    pub fn close(&mut self) {
        self.finished = true;
        self.cancel.cancel();
        self.events.close();
    }
}

impl Drop for StepEventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// 이름 있는 SSE 이벤트를 스트림 이벤트로 변환한다.
///
/// 알 수 없는 이벤트 이름은 경고만 남기고 버린다. 해석할 수 없는 `step_complete`는
/// 해당 단계가 영원히 대기하지 않도록 스트림 오류로 바꾼다.
pub fn translate(frame: &SseFrame) -> Option<StreamEvent> {
    match frame.name() {
        "step_complete" => match StepCompletion::decode(&frame.data) {
            Ok(completion) => Some(StreamEvent::StepComplete(completion)),
            Err(err) => {
                warn!(error = %err, "단계 완료 이벤트 해석 실패");
                Some(StreamEvent::Error(format!("{STEP_DECODE_FAILURE}: {err}")))
            }
        },
        "complete" => Some(StreamEvent::Complete),
        "error" => Some(StreamEvent::Error(error_message(&frame.data))),
        other => {
            warn!(event = other, "알 수 없는 스트림 이벤트");
            None
        }
    }
}

/// 오류 이벤트 본문에서 사용자 메시지를 꺼낸다.
fn error_message(data: &str) -> String {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return STREAM_ERROR_FALLBACK.to_string();
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .filter(|message| !message.trim().is_empty())
            .map_or_else(|| STREAM_ERROR_FALLBACK.to_string(), str::to_string),
        Err(_) => trimmed.to_string(),
    }
}
