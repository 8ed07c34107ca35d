use super::events::StreamEvent;
use super::state::{ExecutionStatus, ScenarioState, StepTransition};
use super::stream::StepEventStream;
use super::view;
use crate::backend::SharedBackend;
use crate::config::FluxConfig;
use crate::error::BackendError;
use crate::scenario::{ExecutionRequest, ExecutionResponse, find_scenario};
use crate::transcript::{MessageKind, Notice};
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

type ExecutionOutcome = Result<ExecutionResponse, BackendError>;

/// 시나리오 실행을 조율하고 상태를 단독으로 소유한다.
///
/// 모든 공개 작업은 실패를 상태나 기록 항목으로 접어 넣고 오류를 반환하지 않는다.
pub struct ScenarioController {
    state: ScenarioState,
    stream: Option<StepEventStream>,
    pending_execution: Option<oneshot::Receiver<ExecutionOutcome>>,
    notices: Vec<Notice>,
    backend: SharedBackend,
    runtime: Handle,
}

impl ScenarioController {
    /// 백엔드와 실행 요청을 띄울 런타임 핸들로 생성한다.
    pub fn new(backend: SharedBackend, runtime: Handle) -> Self {
        Self {
            state: ScenarioState::default(),
            stream: None,
            pending_execution: None,
            notices: Vec::new(),
            backend,
            runtime,
        }
    }

    pub fn state(&self) -> &ScenarioState {
        &self.state
    }

    /// 스트림 수신이나 실행 응답을 기다리는 중인지 확인한다.
    pub fn is_waiting(&self) -> bool {
        self.stream.is_some() || self.pending_execution.is_some()
    }

    /// 쌓인 기록 항목을 꺼낸다.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, kind: MessageKind, content: impl Into<String>) {
        self.notices.push(Notice::assistant(kind, content));
    }

    /// 진행 중인 구독과 실행 대기를 모두 버린다.
    fn teardown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
        self.pending_execution = None;
    }

    /// 시나리오를 시작한다. 진행 중인 실행이 있으면 대체한다.
    ///
    /// 설정이 부족하면 구독을 열지 않고 `false`를 반환한다.
    pub fn start(&mut self, scenario_id: &str, config: &FluxConfig) -> bool {
        let Some(template) = find_scenario(scenario_id) else {
            warn!(scenario_id, "알 수 없는 시나리오");
            self.notify(MessageKind::Error, format!("알 수 없는 시나리오입니다: {scenario_id}"));
            return false;
        };
        let credentials = match config.scenario_credentials() {
            Ok(credentials) => credentials,
            Err(err) => {
                warn!(error = %err, "시나리오 시작에 필요한 설정 누락");
                self.notify(MessageKind::Error, err.to_string());
                return false;
            }
        };

        self.teardown();
        self.state = ScenarioState::started(template.id);
        self.notices.push(Notice::user(format!("{} 시나리오 실행", template.name)));
        self.notify(
            MessageKind::Scenario,
            format!("🚀 「{}」 시나리오를 시작합니다. 분석이 끝나면 조치 내용을 확인해 주세요.", template.name),
        );
        info!(scenario_id = template.id, "시나리오 시작");
        self.stream = Some(self.backend.open_stream(&credentials));
        true
    }

    /// 도착한 스트림 이벤트와 실행 응답을 반영한다. 상태가 바뀌면 `true`이다.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(event) = self.stream.as_mut().and_then(StepEventStream::try_next) {
            self.apply_event(event);
            changed = true;
        }
        if let Some(rx) = self.pending_execution.as_mut() {
            let outcome = match rx.try_recv() {
                Ok(outcome) => Some(outcome.map_err(|err| err.to_string())),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(Err("실행 작업이 응답 없이 종료되었습니다.".into())),
            };
            if let Some(outcome) = outcome {
                self.pending_execution = None;
                self.finish_execution(outcome);
                changed = true;
            }
        }
        changed
    }

    /// 스트림 이벤트 하나를 상태에 반영한다.
    pub fn apply_event(&mut self, event: StreamEvent) {
        if !self.state.is_open {
            debug!(?event, "닫힌 시나리오의 이벤트 무시");
            return;
        }
        match event {
            StreamEvent::StepComplete(completion) => match self.state.apply_step(completion) {
                StepTransition::Applied { step } => {
                    debug!(step, current_step = self.state.current_step, "단계 완료");
                }
                StepTransition::NothingToRemediate => {
                    info!("처리할 고위험 이벤트 없음");
                    self.notify(
                        MessageKind::Scenario,
                        "오늘 처리되지 않은 고위험 이벤트가 없습니다.",
                    );
                }
                StepTransition::Ignored => debug!("중복되었거나 종료된 단계 이벤트 무시"),
            },
            StreamEvent::Complete => {
                self.close_stream();
                self.state.mark_stream_finished();
                if self.state.can_confirm() && !self.state.incident_ids.is_empty() {
                    self.notify(
                        MessageKind::Scenario,
                        format!(
                            "분석이 완료되었습니다. 이벤트 {}건, 차단 대상 IP {}개를 확인한 뒤 실행하세요.",
                            self.state.incident_ids.len(),
                            self.state.ips_to_block.len()
                        ),
                    );
                }
                info!(current_step = self.state.current_step, "시나리오 스트림 완료");
            }
            StreamEvent::Error(message) => {
                self.close_stream();
                let step = self.state.fail_stream(message.clone());
                warn!(?step, error = %message, "시나리오 스트림 실패");
                self.notify(MessageKind::Error, format!("시나리오 실행 실패: {message}"));
            }
            StreamEvent::Disconnected => {
                self.close_stream();
                warn!(current_step = self.state.current_step, "complete 없이 스트림 종료");
                self.notify(
                    MessageKind::Warning,
                    "분석 결과를 모두 받기 전에 서버 연결이 종료되었습니다. 시나리오를 다시 실행하세요.",
                );
            }
        }
    }

    fn close_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
        }
    }

    /// 확인된 조치를 실행한다. 요청을 보냈거나 종료 처리했으면 `true`이다.
    pub fn confirm(&mut self, config: &FluxConfig) -> bool {
        if !self.state.can_confirm() {
            debug!(
                current_step = self.state.current_step,
                execution = ?self.state.execution_status,
                "확인할 수 없는 상태"
            );
            return false;
        }
        if self.state.incident_ids.is_empty() {
            info!("처리할 이벤트가 없어 시나리오 종료");
            self.teardown();
            self.state = ScenarioState::default();
            self.notify(
                MessageKind::ScenarioResult,
                "처리할 이벤트가 없어 조치 없이 시나리오를 종료했습니다.",
            );
            return true;
        }
        let prepared = config
            .flux_auth()
            .cloned()
            .and_then(|flux| config.api_base().map(|api_base| (flux, api_base)));
        let (flux, api_base) = match prepared {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "실행에 필요한 설정 누락");
                self.notify(MessageKind::Error, err.to_string());
                return false;
            }
        };

        let request = ExecutionRequest {
            incident_ids: self.state.incident_ids.clone(),
            ips_to_block: self.state.ips_to_block.clone(),
            auth_code: flux.auth_code,
            flux_base_url: flux.base_url,
        };
        info!(
            incidents = request.incident_ids.len(),
            ips = request.ips_to_block.len(),
            "조치 실행 시작"
        );
        self.notices.push(Notice::user(format!(
            "{}: 이벤트 {}건 [{}], IP {}개 [{}]",
            view::confirm_caption(&self.state),
            request.incident_ids.len(),
            request.incident_ids.join(", "),
            request.ips_to_block.len(),
            request.ips_to_block.join(", ")
        )));
        self.state.begin_execution();

        let (tx, rx) = oneshot::channel();
        let backend = self.backend.clone();
        self.runtime.spawn(async move {
            let outcome = backend.execute(&api_base, request).await;
            let _ = tx.send(outcome);
        });
        self.pending_execution = Some(rx);
        true
    }

    fn finish_execution(&mut self, outcome: Result<ExecutionResponse, String>) {
        if !self.state.finish_execution(outcome) {
            return;
        }
        let status = self.state.execution_status;
        match status {
            ExecutionStatus::Error => warn!(error = ?self.state.execution_error, "조치 실행 실패"),
            _ => info!(?status, "조치 실행 종료"),
        }
        if let Some(summary) = view::outcome_summary(&self.state) {
            self.notify(MessageKind::ScenarioResult, summary);
        }
    }

    /// 실행을 취소하고 상태를 초기화한다. 이미 시작된 서버 작업은 멈추지 않는다.
    pub fn cancel(&mut self) {
        if !self.state.is_open {
            return;
        }
        info!(scenario_id = ?self.state.scenario_id, "시나리오 취소");
        self.teardown();
        self.state = ScenarioState::default();
        self.notify(MessageKind::Scenario, "시나리오가 취소되었습니다.");
    }

    /// 대화상자를 닫고 상태를 초기화한다. 기록은 남기지 않는다.
    pub fn close(&mut self) {
        self.teardown();
        self.state = ScenarioState::default();
    }
}

impl Drop for ScenarioController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChatRequest, ScenarioBackend};
    use crate::config::{FluxAuth, LlmConfig, ScenarioCredentials};
    use crate::engine::events::StepCompletion;
    use crate::engine::{StepStatus, StreamFeed};
    use crate::scenario::{
        AnalysisPayload, ConfirmationPayload, DAILY_HIGH_RISK_CLOSURE, ExecutionResults, Incident,
        IncidentQuery, IpBlockDetail, IpBlockSummary,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use url::Url;

    /// 미리 정한 이벤트와 실행 응답을 돌려주는 가짜 백엔드이다.
    #[derive(Default)]
    struct FakeBackend {
        scripted: Mutex<Vec<StreamEvent>>,
        feeds: Mutex<Vec<StreamFeed>>,
        execution: Mutex<Option<ExecutionOutcome>>,
        executed: Mutex<Vec<ExecutionRequest>>,
    }

    impl FakeBackend {
        fn with_events(events: Vec<StreamEvent>) -> Arc<Self> {
            Arc::new(Self {
                scripted: Mutex::new(events),
                ..Self::default()
            })
        }

        fn respond_with(&self, outcome: ExecutionOutcome) {
            *self.execution.lock().expect("lock") = Some(outcome);
        }

        /// 가장 최근 구독에 이벤트를 추가로 보낸다.
        fn push(&self, event: StreamEvent) -> bool {
            self.feeds
                .lock()
                .expect("lock")
                .last()
                .is_some_and(|feed| feed.send(event))
        }

        fn opened(&self) -> usize {
            self.feeds.lock().expect("lock").len()
        }

        fn executed(&self) -> Vec<ExecutionRequest> {
            self.executed.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ScenarioBackend for FakeBackend {
        fn open_stream(&self, _credentials: &ScenarioCredentials) -> StepEventStream {
            let (feed, stream) = StepEventStream::channel();
            for event in self.scripted.lock().expect("lock").drain(..) {
                feed.send(event);
            }
            self.feeds.lock().expect("lock").push(feed);
            stream
        }

        async fn execute(
            &self,
            _api_base: &Url,
            request: ExecutionRequest,
        ) -> Result<ExecutionResponse, BackendError> {
            self.executed.lock().expect("lock").push(request);
            self.execution
                .lock()
                .expect("lock")
                .take()
                .unwrap_or_else(|| Ok(success_response(1, 0)))
        }

        async fn chat(&self, _api_base: &Url, _request: ChatRequest) -> Result<String, BackendError> {
            Ok(String::new())
        }
    }

    fn config() -> FluxConfig {
        FluxConfig {
            api_url: "http://127.0.0.1:9".into(),
            llm: Some(LlmConfig {
                api_key: "sk-test".into(),
                ..LlmConfig::default()
            }),
            flux: Some(FluxAuth {
                auth_code: "code-1".into(),
                base_url: "https://flux.example".into(),
            }),
        }
    }

    fn incidents(ids: &[&str]) -> StreamEvent {
        StreamEvent::StepComplete(StepCompletion::Incidents(IncidentQuery {
            incidents: ids
                .iter()
                .map(|id| Incident {
                    uu_id: id.to_string(),
                    name: format!("Incident {id}"),
                    host_ip: "10.0.0.5".into(),
                    severity: 4,
                    deal_status: 0,
                    end_time: 0,
                })
                .collect(),
            total: ids.len() as u64,
        }))
    }

    fn analysis() -> StreamEvent {
        StreamEvent::StepComplete(StepCompletion::Analysis(AnalysisPayload::empty()))
    }

    fn confirmation(ips: &[&str]) -> StreamEvent {
        StreamEvent::StepComplete(StepCompletion::Confirmation(ConfirmationPayload {
            ips_to_block: ips.iter().map(|ip| ip.to_string()).collect(),
            ai_summary: "차단이 필요합니다".into(),
            ..ConfirmationPayload::nothing_to_remediate()
        }))
    }

    fn decoded(raw: serde_json::Value) -> StreamEvent {
        StreamEvent::StepComplete(StepCompletion::decode(&raw.to_string()).expect("단계 본문"))
    }

    fn success_response(succeeded: u32, failed: u32) -> ExecutionResponse {
        ExecutionResponse {
            success: failed == 0,
            partial_success: false,
            message: String::new(),
            results: Some(ExecutionResults {
                ip_block: IpBlockSummary {
                    total: succeeded + failed,
                    success: succeeded,
                    failed,
                    details: (0..failed)
                        .map(|idx| IpBlockDetail {
                            ip: format!("198.51.100.{idx}"),
                            success: false,
                            rule_ids: Vec::new(),
                            message: None,
                            error: Some("rule conflict".into()),
                        })
                        .collect(),
                },
                ..ExecutionResults::default()
            }),
        }
    }

    fn controller(backend: &Arc<FakeBackend>) -> ScenarioController {
        ScenarioController::new(backend.clone(), Handle::current())
    }

    /// 실행 응답이 반영될 때까지 폴링한다.
    async fn settle_execution(controller: &mut ScenarioController) {
        for _ in 0..200 {
            controller.poll();
            if controller.state().execution_status.is_terminal() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// 두 건의 이벤트와 두 개의 IP로 전체 흐름을 끝까지 진행한다.
    #[tokio::test]
    async fn full_run_reaches_partial_success() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1", "inc-2"]),
            analysis(),
            confirmation(&["203.0.113.9", "198.51.100.0"]),
            StreamEvent::Complete,
        ]);
        backend.respond_with(Ok(success_response(1, 1)));
        let mut controller = controller(&backend);

        assert!(controller.start(DAILY_HIGH_RISK_CLOSURE, &config()));
        assert_eq!(controller.state().step_status, [StepStatus::Loading; 3]);
        controller.poll();

        let state = controller.state();
        assert_eq!(state.step_status, [StepStatus::Completed; 3]);
        assert_eq!(state.current_step, 3);
        assert!(state.stream_finished);
        assert_eq!(state.incident_ids, vec!["inc-1".to_string(), "inc-2".to_string()]);
        assert!(state.can_confirm());
        assert!(!controller.is_waiting());

        assert!(controller.confirm(&config()));
        assert_eq!(controller.state().execution_status, ExecutionStatus::Executing);
        settle_execution(&mut controller).await;

        let state = controller.state();
        assert_eq!(state.execution_status, ExecutionStatus::PartialSuccess);
        assert!(state.execution_error.is_none());
        let result = state.execution_result.as_ref().expect("결과");
        assert_eq!(result.ip_block.details[0].error.as_deref(), Some("rule conflict"));

        let requests = backend.executed();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].incident_ids, vec!["inc-1".to_string(), "inc-2".to_string()]);
        assert_eq!(requests[0].ips_to_block.len(), 2);
        assert_eq!(requests[0].auth_code, "code-1");

        let notices = controller.drain_notices();
        assert!(notices.iter().any(|n| n.kind == MessageKind::ScenarioResult
            && n.content.starts_with("⚠️")));
    }

    /// 이벤트 한 건, IP 한 개의 흐름을 서버 본문 그대로 따라간다.
    #[tokio::test]
    async fn single_incident_walkthrough_succeeds() {
        let backend = FakeBackend::with_events(Vec::new());
        backend.respond_with(Ok(serde_json::from_value(json!({
            "success": true,
            "results": {
                "ip_block": {"total": 1, "success": 1, "failed": 0,
                    "details": [{"ip": "203.0.113.9", "success": true}]},
                "incident_updates": {"total": 1, "success": 1, "failed": 0,
                    "details": [{"success": true, "total": 1, "succeededNum": 1, "failedNum": 0}]}
            }
        }))
        .expect("응답")));
        let mut controller = controller(&backend);
        assert!(controller.start(DAILY_HIGH_RISK_CLOSURE, &config()));

        controller.apply_event(decoded(json!({"step": 1, "data": {
            "incidents": [{"uuId": "i1", "name": "Incident A", "hostIp": "10.0.0.5",
                "severity": 4, "dealStatus": 0, "endTime": 1_700_000_000}],
            "total": 1
        }})));
        assert_eq!(controller.state().status(1), StepStatus::Completed);
        assert_eq!(controller.state().current_step, 1);
        assert_eq!(controller.state().incident_ids, vec!["i1".to_string()]);

        controller.apply_event(decoded(json!({"step": 2, "data": {
            "incident_details": [{"incident": {"uuId": "i1"}, "success": true,
                "risk_assessment": {"risk_level": 3, "risk_reasoning": "lateral movement"}}]
        }})));
        assert_eq!(controller.state().current_step, 2);

        controller.apply_event(decoded(json!({"step": 3, "data": {
            "ips_to_block": ["203.0.113.9"],
            "ip_details": [{"ip": "203.0.113.9", "threat_level": 3, "location": "CN", "tags": ["botnet"]}],
            "ai_summary": "1 IP requires blocking"
        }})));
        assert_eq!(controller.state().current_step, 3);
        assert_eq!(controller.state().ips_to_block, vec!["203.0.113.9".to_string()]);

        assert!(controller.confirm(&config()));
        settle_execution(&mut controller).await;
        let state = controller.state();
        assert_eq!(state.execution_status, ExecutionStatus::Success);
        assert!(state.execution_error.is_none());
        assert_eq!(backend.executed()[0].ips_to_block, vec!["203.0.113.9".to_string()]);
    }

    #[tokio::test]
    async fn missing_configuration_opens_nothing() {
        let backend = FakeBackend::with_events(Vec::new());
        let mut controller = controller(&backend);
        let mut config = config();
        config.flux = None;

        assert!(!controller.start(DAILY_HIGH_RISK_CLOSURE, &config));
        assert_eq!(backend.opened(), 0);
        assert_eq!(controller.state(), &ScenarioState::default());
        let notices = controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, MessageKind::Error);
    }

    /// 이벤트가 없으면 실행 요청 없이 종료한다.
    #[tokio::test]
    async fn empty_incidents_confirm_without_backend_call() {
        let backend = FakeBackend::with_events(vec![incidents(&[]), StreamEvent::Complete]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();

        assert_eq!(controller.state().step_status, [StepStatus::Completed; 3]);
        assert_eq!(controller.state().current_step, 3);
        assert!(controller.confirm(&config()));
        assert!(backend.executed().is_empty());
        assert!(!controller.state().is_open);
        let notices = controller.drain_notices();
        assert!(notices.iter().any(|n| n.kind == MessageKind::ScenarioResult));
    }

    #[tokio::test]
    async fn stream_error_freezes_the_run() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            StreamEvent::Error("LLM 호출 실패".into()),
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();

        assert_eq!(controller.state().status(2), StepStatus::Error);
        assert_eq!(controller.state().stream_error.as_deref(), Some("LLM 호출 실패"));
        assert!(!backend.push(analysis()), "구독이 닫혀 있어야 한다");

        controller.apply_event(confirmation(&["1.1.1.1"]));
        assert_eq!(controller.state().status(3), StepStatus::Loading);
        assert!(!controller.confirm(&config()));
        assert!(backend.executed().is_empty());
    }

    /// 1단계 결과가 빠진 채 3단계가 오면 "처리할 이벤트 없음"으로 종료하지 않는다.
    #[tokio::test]
    async fn missing_step_one_blocks_confirm() {
        let backend = FakeBackend::with_events(vec![
            confirmation(&["203.0.113.9"]),
            StreamEvent::Complete,
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        controller.drain_notices();

        assert_eq!(controller.state().current_step, 3);
        assert!(!controller.state().can_confirm());
        assert!(!controller.confirm(&config()));
        assert!(controller.state().is_open);
        assert_eq!(controller.state().ips_to_block, vec!["203.0.113.9".to_string()]);
        assert!(backend.executed().is_empty());
        assert!(!controller
            .drain_notices()
            .iter()
            .any(|n| n.kind == MessageKind::ScenarioResult));
    }

    /// 해석할 수 없는 1단계 결과는 스트림 오류로 실행을 멈춘다.
    #[tokio::test]
    async fn undecodable_step_one_fails_the_run() {
        let frame = crate::engine::sse::SseFrame {
            event: Some("step_complete".into()),
            data: r#"{"step":1,"data":{"incidents":[{"uuId":null}]}}"#.into(),
        };
        let event = crate::engine::translate(&frame).expect("오류 이벤트");
        let backend = FakeBackend::with_events(vec![
            event,
            confirmation(&["203.0.113.9"]),
            StreamEvent::Complete,
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();

        let state = controller.state();
        assert_eq!(state.status(1), StepStatus::Error);
        assert_eq!(state.status(3), StepStatus::Loading);
        assert!(state.stream_error.is_some());
        assert!(!controller.confirm(&config()));
        assert!(backend.executed().is_empty());
    }

    #[tokio::test]
    async fn confirm_is_rejected_before_step_three() {
        let backend = FakeBackend::with_events(vec![incidents(&["inc-1"]), analysis()]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        assert_eq!(controller.state().current_step, 2);
        assert!(!controller.confirm(&config()));
        assert_eq!(controller.state().execution_status, ExecutionStatus::Idle);
        assert!(backend.executed().is_empty());
    }

    /// 실행 중 두 번째 확인은 요청을 보내지 않는다.
    #[tokio::test]
    async fn double_confirm_sends_one_request() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            analysis(),
            confirmation(&["203.0.113.9"]),
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        assert!(controller.confirm(&config()));
        assert!(!controller.confirm(&config()));
        settle_execution(&mut controller).await;
        assert!(!controller.confirm(&config()));
        assert_eq!(backend.executed().len(), 1);
        assert_eq!(controller.state().execution_status, ExecutionStatus::Success);
    }

    #[tokio::test]
    async fn cancel_resets_and_drops_late_events() {
        let backend = FakeBackend::with_events(vec![incidents(&["inc-1"])]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        controller.drain_notices();

        controller.cancel();
        assert_eq!(controller.state(), &ScenarioState::default());
        assert!(!backend.push(analysis()));
        assert!(!controller.poll());
        let notices = controller.drain_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].content, "시나리오가 취소되었습니다.");

        controller.close();
        assert!(controller.drain_notices().is_empty());
    }

    /// 새 실행을 시작하면 이전 구독은 닫힌다.
    #[tokio::test]
    async fn restart_supersedes_previous_subscription() {
        let backend = FakeBackend::with_events(vec![incidents(&["old"])]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        assert_eq!(controller.state().current_step, 1);

        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        assert_eq!(backend.opened(), 2);
        assert_eq!(controller.state().current_step, 0);
        let feeds = backend.feeds.lock().expect("lock");
        assert!(feeds[0].cancel_token().is_cancelled());
        assert!(!feeds[1].cancel_token().is_cancelled());
    }

    #[tokio::test]
    async fn disconnect_keeps_step_statuses() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            StreamEvent::Disconnected,
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        let state = controller.state();
        assert_eq!(state.status(1), StepStatus::Completed);
        assert_eq!(state.status(2), StepStatus::Loading);
        assert!(state.stream_error.is_none());
        assert!(!controller.is_waiting());
        assert!(controller
            .drain_notices()
            .iter()
            .any(|n| n.kind == MessageKind::Warning));
    }

    #[tokio::test]
    async fn transport_failure_is_execution_error() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            analysis(),
            confirmation(&[]),
        ]);
        backend.respond_with(Err(BackendError::Status {
            status: 503,
            body: "maintenance".into(),
        }));
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        assert!(controller.confirm(&config()));
        settle_execution(&mut controller).await;

        let state = controller.state();
        assert_eq!(state.execution_status, ExecutionStatus::Error);
        assert!(state.execution_error.as_deref().is_some_and(|e| e.contains("503")));
        assert!(state.execution_result.is_none());
    }

    /// 실행 도중 취소하면 늦게 온 결과는 버린다.
    #[tokio::test]
    async fn cancel_during_execution_discards_result() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            analysis(),
            confirmation(&["203.0.113.9"]),
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        assert!(controller.confirm(&config()));
        controller.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.poll();
        assert_eq!(controller.state(), &ScenarioState::default());
    }

    #[tokio::test]
    async fn missing_auth_at_confirm_leaves_state_unchanged() {
        let backend = FakeBackend::with_events(vec![
            incidents(&["inc-1"]),
            analysis(),
            confirmation(&["203.0.113.9"]),
        ]);
        let mut controller = controller(&backend);
        controller.start(DAILY_HIGH_RISK_CLOSURE, &config());
        controller.poll();
        let before = controller.state().clone();

        let mut config = config();
        config.flux = None;
        assert!(!controller.confirm(&config));
        assert_eq!(controller.state(), &before);
        assert!(backend.executed().is_empty());
    }
}
