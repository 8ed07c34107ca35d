use super::events::StepCompletion;
use crate::scenario::{
    AnalysisPayload, ConfirmationPayload, ExecutionResponse, ExecutionResults, IncidentQuery,
};

/// 서버가 진행하는 분석 단계 수이다.
pub const ANALYSIS_STEPS: usize = 3;

/// 분석 단계의 상태이다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepStatus {
    /// 실행 전.
    #[default]
    Idle,
    /// 결과 대기 중.
    Loading,
    /// 정상 종료.
    Completed,
    /// 실패.
    Error,
}

/// 확인 후 실행 단계의 상태이다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStatus {
    #[default]
    Idle,
    Executing,
    Success,
    PartialSuccess,
    Error,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Success | ExecutionStatus::PartialSuccess | ExecutionStatus::Error
        )
    }
}

/// 분석 단계 이벤트를 반영한 결과이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTransition {
    /// 해당 단계가 완료 처리되었다.
    Applied { step: usize },
    /// 1단계에서 이벤트가 없어 2·3단계까지 빈 결과로 완료되었다.
    NothingToRemediate,
    /// 이미 완료된 단계이거나 종료된 실행이라 무시했다.
    Ignored,
}

/// 시나리오 한 번의 실행 상태이다.
///
/// 컨트롤러만 변경하고 화면은 읽기만 한다. 기본값은 닫힌 상태이다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioState {
    /// 진행 대화상자 표시 여부.
    pub is_open: bool,
    /// 실행 중인 템플릿 ID.
    pub scenario_id: Option<String>,
    /// 완료 또는 실패에 도달한 가장 먼 단계(0~3).
    pub current_step: usize,
    /// 1~3단계 상태.
    pub step_status: [StepStatus; ANALYSIS_STEPS],
    /// 1단계 결과.
    pub incidents: Option<IncidentQuery>,
    /// 2단계 결과.
    pub analysis: Option<AnalysisPayload>,
    /// 3단계 결과.
    pub confirmation: Option<ConfirmationPayload>,
    /// 처리 대상 이벤트 ID.
    pub incident_ids: Vec<String>,
    /// 차단 대상 IP.
    pub ips_to_block: Vec<String>,
    /// 스트림 실패 메시지. 값이 있으면 이번 실행은 더 진행되지 않는다.
    pub stream_error: Option<String>,
    /// `complete` 이벤트 수신 여부.
    pub stream_finished: bool,
    pub execution_status: ExecutionStatus,
    pub execution_result: Option<ExecutionResults>,
    pub execution_error: Option<String>,
}

impl ScenarioState {
    /// 세 분석 단계를 모두 대기 상태로 둔 새 실행 상태를 만든다.
    pub fn started(scenario_id: &str) -> Self {
        Self {
            is_open: true,
            scenario_id: Some(scenario_id.to_string()),
            step_status: [StepStatus::Loading; ANALYSIS_STEPS],
            ..Self::default()
        }
    }

    /// 1부터 시작하는 단계 번호로 상태를 조회한다.
    pub fn status(&self, step: usize) -> StepStatus {
        step.checked_sub(1)
            .and_then(|idx| self.step_status.get(idx).copied())
            .unwrap_or_default()
    }

    fn set_status(&mut self, step: usize, status: StepStatus) {
        if let Some(slot) = step.checked_sub(1).and_then(|idx| self.step_status.get_mut(idx)) {
            *slot = status;
        }
    }

    fn advance_to(&mut self, step: usize) {
        self.current_step = self.current_step.max(step);
    }

    /// 스트림 실패로 이번 실행이 끝났는지 확인한다.
    pub fn is_failed(&self) -> bool {
        self.stream_error.is_some()
    }

    /// 확인 버튼을 누를 수 있는 상태인지 확인한다.
    ///
    /// 처리 대상 이벤트 ID는 1단계에서만 채워지므로 1단계 완료도 요구한다.
    pub fn can_confirm(&self) -> bool {
        self.is_open
            && self.current_step == ANALYSIS_STEPS
            && self.status(1) == StepStatus::Completed
            && self.status(ANALYSIS_STEPS) == StepStatus::Completed
            && self.execution_status == ExecutionStatus::Idle
            && !self.is_failed()
    }

    /// `step_complete` 이벤트를 반영한다.
    pub fn apply_step(&mut self, completion: StepCompletion) -> StepTransition {
        if !self.is_open || self.is_failed() {
            return StepTransition::Ignored;
        }
        let step = completion.step();
        if self.status(step) == StepStatus::Completed {
            return StepTransition::Ignored;
        }
        match completion {
            StepCompletion::Incidents(query) => {
                self.incident_ids = query.incident_ids();
                self.incidents = Some(query);
                self.set_status(1, StepStatus::Completed);
                self.advance_to(1);
                if self.incident_ids.is_empty() {
                    self.analysis = Some(AnalysisPayload::empty());
                    self.confirmation = Some(ConfirmationPayload::nothing_to_remediate());
                    self.ips_to_block.clear();
                    self.set_status(2, StepStatus::Completed);
                    self.set_status(3, StepStatus::Completed);
                    self.advance_to(3);
                    return StepTransition::NothingToRemediate;
                }
            }
            StepCompletion::Analysis(payload) => {
                self.analysis = Some(payload);
                self.set_status(2, StepStatus::Completed);
                self.advance_to(2);
            }
            StepCompletion::Confirmation(payload) => {
                self.ips_to_block = payload.ips_to_block.clone();
                self.confirmation = Some(payload);
                self.set_status(3, StepStatus::Completed);
                self.advance_to(3);
            }
        }
        StepTransition::Applied { step }
    }

    /// `complete` 이벤트를 반영한다. 단계 상태는 바꾸지 않는다.
    pub fn mark_stream_finished(&mut self) {
        if self.is_open {
            self.stream_finished = true;
        }
    }

    /// 스트림 실패를 아직 끝나지 않은 가장 앞 단계에 기록한다.
    ///
    /// 실패로 표시한 단계 번호를 돌려준다. 모든 단계가 이미 완료된 뒤라면
    /// 메시지만 남기고 `None`을 돌려준다.
    pub fn fail_stream(&mut self, message: String) -> Option<usize> {
        if !self.is_open || self.is_failed() {
            return None;
        }
        let target = (1..=ANALYSIS_STEPS).find(|step| self.status(*step) == StepStatus::Loading);
        if let Some(step) = target {
            self.set_status(step, StepStatus::Error);
            self.advance_to(step);
        }
        self.stream_error = Some(message);
        target
    }

    /// 실행 요청을 보내기 직전 상태로 바꾼다.
    pub fn begin_execution(&mut self) {
        self.execution_status = ExecutionStatus::Executing;
    }

    /// 실행 응답을 최종 상태로 반영한다. 실행 중이 아니면 무시한다.
    pub fn finish_execution(&mut self, outcome: Result<ExecutionResponse, String>) -> bool {
        if self.execution_status != ExecutionStatus::Executing {
            return false;
        }
        match outcome {
            Ok(response) => {
                let status = classify_execution(&response);
                if status == ExecutionStatus::Error {
                    self.execution_error = Some(if response.message.is_empty() {
                        "실행 중 오류가 발생했습니다.".to_string()
                    } else {
                        response.message.clone()
                    });
                }
                self.execution_status = status;
                self.execution_result = Some(response.results.unwrap_or_default());
            }
            Err(message) => {
                self.execution_status = ExecutionStatus::Error;
                self.execution_error = Some(message);
            }
        }
        true
    }
}

/// 실행 응답을 성공, 부분 성공, 실패로 분류한다.
pub fn classify_execution(response: &ExecutionResponse) -> ExecutionStatus {
    let Some(results) = &response.results else {
        return if response.success {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Error
        };
    };
    let succeeded = results.succeeded();
    let failed = results.failed();
    if failed == 0 {
        if response.success || succeeded > 0 {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Error
        }
    } else if succeeded > 0 || response.partial_success {
        ExecutionStatus::PartialSuccess
    } else {
        ExecutionStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Incident, IpBlockSummary};

    fn incident(id: &str) -> Incident {
        Incident {
            uu_id: id.into(),
            name: format!("Incident {id}"),
            host_ip: "10.0.0.5".into(),
            severity: 4,
            deal_status: 0,
            end_time: 1_700_000_000,
        }
    }

    fn step1(ids: &[&str]) -> StepCompletion {
        StepCompletion::Incidents(IncidentQuery {
            incidents: ids.iter().map(|id| incident(id)).collect(),
            total: ids.len() as u64,
        })
    }

    fn step3(ips: &[&str]) -> StepCompletion {
        StepCompletion::Confirmation(ConfirmationPayload {
            ips_to_block: ips.iter().map(|ip| ip.to_string()).collect(),
            ..ConfirmationPayload::nothing_to_remediate()
        })
    }

    /// 어떤 순서로 단계 이벤트가 와도 current_step은 줄어들지 않는다.
    #[test]
    fn current_step_never_decreases() {
        let sequences: Vec<Vec<StepCompletion>> = vec![
            vec![step1(&["i1"]), StepCompletion::Analysis(AnalysisPayload::empty()), step3(&[])],
            vec![step3(&["1.1.1.1"]), step1(&["i1"]), StepCompletion::Analysis(AnalysisPayload::empty())],
            vec![
                StepCompletion::Analysis(AnalysisPayload::empty()),
                step1(&["i1"]),
                step1(&["i2"]),
                step3(&["1.1.1.1"]),
            ],
        ];
        for sequence in sequences {
            let mut state = ScenarioState::started("daily-high-risk-closure");
            for completion in sequence {
                let before = state.current_step;
                state.apply_step(completion);
                assert!(state.current_step >= before);
            }
            assert_eq!(state.current_step, 3);
        }
    }

    /// 3단계가 2단계보다 먼저 오면 단계는 진행하되 2단계 데이터는 비어 있다.
    #[test]
    fn out_of_order_step_three_leaves_step_two_pending() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        state.apply_step(step1(&["i1"]));
        state.apply_step(step3(&["203.0.113.9"]));
        assert_eq!(state.current_step, 3);
        assert_eq!(state.status(2), StepStatus::Loading);
        assert!(state.analysis.is_none());
        assert!(state.can_confirm());
    }

    /// 1단계 없이 3단계만 도착하면 빈 이벤트 목록으로 확인할 수 없다.
    #[test]
    fn step_three_without_step_one_cannot_confirm() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        state.apply_step(step3(&["203.0.113.9"]));
        state.mark_stream_finished();
        assert_eq!(state.current_step, 3);
        assert_eq!(state.status(1), StepStatus::Loading);
        assert!(state.incident_ids.is_empty());
        assert!(!state.can_confirm());
    }

    #[test]
    fn empty_incidents_complete_every_step() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        let transition = state.apply_step(step1(&[]));
        assert_eq!(transition, StepTransition::NothingToRemediate);
        assert_eq!(state.step_status, [StepStatus::Completed; 3]);
        assert_eq!(state.current_step, 3);
        assert!(state.ips_to_block.is_empty());
        assert_eq!(state.analysis, Some(AnalysisPayload::empty()));
        assert!(state.can_confirm());
    }

    #[test]
    fn duplicate_step_is_ignored() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        state.apply_step(step1(&["i1"]));
        let payload = StepCompletion::Analysis(AnalysisPayload::empty());
        state.apply_step(payload.clone());
        let once = state.clone();
        assert_eq!(state.apply_step(payload), StepTransition::Ignored);
        assert_eq!(state, once);
    }

    /// 실패 이후 도착한 단계 이벤트는 어떤 상태도 바꾸지 못한다.
    #[test]
    fn failed_run_rejects_later_steps() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        assert_eq!(state.fail_stream("boom".into()), Some(1));
        let frozen = state.clone();
        assert_eq!(state.apply_step(step1(&["i1"])), StepTransition::Ignored);
        assert_eq!(state.apply_step(step3(&["1.1.1.1"])), StepTransition::Ignored);
        assert_eq!(state, frozen);
        assert_eq!(state.status(1), StepStatus::Error);
        assert!(!state.can_confirm());
    }

    #[test]
    fn stream_error_targets_first_unresolved_step() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        state.apply_step(step1(&["i1"]));
        assert_eq!(state.fail_stream("lost".into()), Some(2));
        assert_eq!(state.status(1), StepStatus::Completed);
        assert_eq!(state.status(2), StepStatus::Error);
        assert_eq!(state.current_step, 2);
    }

    #[test]
    fn partial_block_failure_is_partial_success() {
        let response = ExecutionResponse {
            success: true,
            partial_success: false,
            message: String::new(),
            results: Some(ExecutionResults {
                ip_block: IpBlockSummary {
                    total: 3,
                    success: 2,
                    failed: 1,
                    details: Vec::new(),
                },
                ..ExecutionResults::default()
            }),
        };
        assert_eq!(classify_execution(&response), ExecutionStatus::PartialSuccess);

        let all_failed = ExecutionResponse {
            success: false,
            results: Some(ExecutionResults {
                ip_block: IpBlockSummary {
                    total: 1,
                    success: 0,
                    failed: 1,
                    details: Vec::new(),
                },
                ..ExecutionResults::default()
            }),
            ..response
        };
        assert_eq!(classify_execution(&all_failed), ExecutionStatus::Error);
    }

    #[test]
    fn execution_result_is_ignored_unless_executing() {
        let mut state = ScenarioState::started("daily-high-risk-closure");
        assert!(!state.finish_execution(Err("late".into())));
        assert_eq!(state.execution_status, ExecutionStatus::Idle);
        state.begin_execution();
        assert!(state.finish_execution(Err("network".into())));
        assert_eq!(state.execution_status, ExecutionStatus::Error);
        assert_eq!(state.execution_error.as_deref(), Some("network"));
        assert!(state.execution_result.is_none());
    }
}
