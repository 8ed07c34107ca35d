use chrono::{DateTime, Local};
use serde::Serialize;

/// 화면에 유지할 최대 메시지 수이다.
pub const MAX_TRANSCRIPT_MESSAGES: usize = 500;

/// 새 대화를 시작할 때 표시하는 인사말이다.
const GREETING: &str = "안녕하세요! Flux 보안 운영 도우미입니다. 보안 이벤트 조회, IP 위협 분석, 차단 같은 연동 처리 작업을 도와드릴 수 있습니다. 무엇을 도와드릴까요?";

/// 메시지 작성 주체이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 메시지 종류이다. 렌더링 방식을 결정한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// 일반 대화.
    Text,
    /// 시나리오 진행 알림.
    Scenario,
    /// 시나리오 실행 결과.
    ScenarioResult,
    /// 경고.
    Warning,
    /// 오류.
    Error,
}

/// 컨트롤러나 대화 흐름이 남기는 기록 항목이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub role: Role,
    pub kind: MessageKind,
    pub content: String,
}

impl Notice {
    /// 사용자 발화로 기록한다.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            kind: MessageKind::Text,
            content: content.into(),
        }
    }

    /// 도우미 발화로 기록한다.
    pub fn assistant(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            kind,
            content: content.into(),
        }
    }
}

/// 대화 기록에 저장된 메시지이다.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

/// 대화 API에 전달하는 메시지 형식이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// 대화 기록이다.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    /// 인사말 하나로 시작하는 기록을 만든다.
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        transcript.append(Notice::assistant(MessageKind::Text, GREETING));
        transcript
    }

    /// 기록을 비우고 새 대화를 시작한다.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// 항목을 기록 끝에 추가한다.
    pub fn append(&mut self, notice: Notice) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            role: notice.role,
            kind: notice.kind,
            content: notice.content,
            timestamp: Local::now(),
        });
        if self.messages.len() > MAX_TRANSCRIPT_MESSAGES {
            let overflow = self.messages.len() - MAX_TRANSCRIPT_MESSAGES;
            self.messages.drain(0..overflow);
        }
    }

    /// 여러 항목을 순서대로 추가한다.
    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.append(notice);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// 대화 API로 보낼 일반 대화 이력만 추린다.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter(|message| message.kind == MessageKind::Text)
            .map(|message| HistoryEntry {
                role: message.role,
                content: message.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_only_carries_text_messages() {
        let mut transcript = Transcript::new();
        transcript.append(Notice::user("오늘 고위험 이벤트 보여줘"));
        transcript.append(Notice::assistant(MessageKind::Scenario, "시나리오 분석 완료"));
        transcript.append(Notice::assistant(MessageKind::Text, "3건이 있습니다."));
        let history = transcript.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, Role::User);
        assert_eq!(history[2].content, "3건이 있습니다.");
    }

    /// 최대 개수를 넘으면 오래된 메시지부터 버린다.
    #[test]
    fn transcript_is_bounded() {
        let mut transcript = Transcript::new();
        for idx in 0..MAX_TRANSCRIPT_MESSAGES + 10 {
            transcript.append(Notice::user(format!("m{idx}")));
        }
        assert_eq!(transcript.messages().len(), MAX_TRANSCRIPT_MESSAGES);
        let last = transcript.messages().last().expect("비어 있음");
        assert_eq!(last.content, format!("m{}", MAX_TRANSCRIPT_MESSAGES + 9));
        transcript.reset();
        assert_eq!(transcript.messages().len(), 1);
    }
}
