use crate::scenario::{AnalysisPayload, ConfirmationPayload, IncidentQuery};
use serde::Deserialize;

/// 분석 단계 완료 이벤트의 단계별 본문이다.
#[derive(Debug, Clone, PartialEq)]
pub enum StepCompletion {
    /// 1단계: 이벤트 조회.
    Incidents(IncidentQuery),
    /// 2단계: 상위 이벤트 분석.
    Analysis(AnalysisPayload),
    /// 3단계: IP 위협 정보와 확인 요약.
    Confirmation(ConfirmationPayload),
}

impl StepCompletion {
    /// 1부터 시작하는 단계 번호를 반환한다.
    pub fn step(&self) -> usize {
        match self {
            StepCompletion::Incidents(_) => 1,
            StepCompletion::Analysis(_) => 2,
            StepCompletion::Confirmation(_) => 3,
        }
    }

    /// `{ step, data }` 형태의 JSON 본문을 해석한다.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct Envelope {
            step: u8,
            #[serde(default)]
            data: serde_json::Value,
        }

        let envelope: Envelope = serde_json::from_str(raw)?;
        match envelope.step {
            1 => serde_json::from_value(envelope.data).map(StepCompletion::Incidents),
            2 => serde_json::from_value(envelope.data).map(StepCompletion::Analysis),
            3 => serde_json::from_value(envelope.data).map(StepCompletion::Confirmation),
            other => Err(serde::de::Error::custom(format!(
                "알 수 없는 단계 번호: {other}"
            ))),
        }
    }
}

/// 스트림 소비자가 컨트롤러에 전달하는 이벤트이다.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// `step_complete`: 분석 단계 하나가 끝났다.
    StepComplete(StepCompletion),
    /// `complete`: 더 이상 단계 이벤트가 오지 않는다.
    Complete,
    /// `error` 또는 전송 실패.
    Error(String),
    /// `complete` 없이 서버가 연결을 정상 종료했다.
    Disconnected,
}
