use super::*;

/// 분석 단계 상태를 아이콘과 텍스트로 바꾼다.
pub(super) fn status_indicator(status: StepStatus) -> (&'static str, &'static str) {
    let icon = match status {
        StepStatus::Idle => "⏸",
        StepStatus::Loading => "⏳",
        StepStatus::Completed => "✅",
        StepStatus::Error => "❌",
    };
    (icon, view::step_status_label(status))
}

/// 확인·실행 단계의 상태를 아이콘과 텍스트로 바꾼다.
pub(super) fn execution_indicator(state: &ScenarioState) -> (&'static str, &'static str) {
    match state.execution_status {
        ExecutionStatus::Idle if state.can_confirm() => ("👉", "확인 대기"),
        ExecutionStatus::Idle => ("⏸", "대기"),
        ExecutionStatus::Executing => ("⚙️", "실행 중"),
        ExecutionStatus::Success => ("✅", "완료"),
        ExecutionStatus::PartialSuccess => ("⚠️", "부분 완료"),
        ExecutionStatus::Error => ("❌", "실패"),
    }
}
