use super::state::{ExecutionStatus, ScenarioState, StepStatus};
use chrono::{Local, TimeZone};

/// 진행 대화상자의 단계 제목이다. 마지막 항목은 확인·실행 단계이다.
pub const STEP_TITLES: [&str; 4] = ["이벤트 조회", "상위 이벤트 분석", "IP 위협 확인", "확인 및 실행"];

/// 위험도·위협 등급의 강조 수준이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTone {
    Neutral,
    Warning,
    Danger,
}

/// 등급이 3 이상이면 위험, 2 이상이면 경고로 표시한다.
pub fn level_tone(level: u8) -> LevelTone {
    match level {
        3.. => LevelTone::Danger,
        2 => LevelTone::Warning,
        _ => LevelTone::Neutral,
    }
}

pub fn step_title(step: usize) -> &'static str {
    step.checked_sub(1)
        .and_then(|idx| STEP_TITLES.get(idx).copied())
        .unwrap_or("알 수 없는 단계")
}

pub fn step_status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Idle => "대기",
        StepStatus::Loading => "진행 중",
        StepStatus::Completed => "완료",
        StepStatus::Error => "실패",
    }
}

/// 분석 단계 진행률(0.0~1.0)이다.
pub fn analysis_progress(state: &ScenarioState) -> f32 {
    let done = state
        .step_status
        .iter()
        .filter(|status| **status == StepStatus::Completed)
        .count();
    done as f32 / state.step_status.len() as f32
}

/// 확인 버튼 문구이다.
pub fn confirm_caption(state: &ScenarioState) -> &'static str {
    if state.execution_status == ExecutionStatus::Executing {
        "실행 중..."
    } else if state.incident_ids.is_empty() {
        "확인"
    } else if state.ips_to_block.is_empty() {
        "이벤트 상태 변경"
    } else {
        "IP 차단 및 이벤트 종결"
    }
}

/// 실행 결과 제목이다. 최종 상태가 아니면 `None`이다.
pub fn outcome_headline(status: ExecutionStatus) -> Option<&'static str> {
    match status {
        ExecutionStatus::Success => Some("✅ 조치가 완료되었습니다"),
        ExecutionStatus::PartialSuccess => Some("⚠️ 일부 조치만 완료되었습니다"),
        ExecutionStatus::Error => Some("❌ 조치 실행에 실패했습니다"),
        ExecutionStatus::Idle | ExecutionStatus::Executing => None,
    }
}

/// 대화 기록에 남길 실행 결과 요약을 만든다.
pub fn outcome_summary(state: &ScenarioState) -> Option<String> {
    let headline = outcome_headline(state.execution_status)?;
    let mut lines = vec![headline.to_string()];
    if let Some(results) = &state.execution_result {
        let ip = &results.ip_block;
        if ip.total > 0 || !state.ips_to_block.is_empty() {
            lines.push(format!("- IP 차단: 성공 {}건, 실패 {}건", ip.success, ip.failed));
            for detail in ip.details.iter().filter(|detail| !detail.success) {
                let reason = detail
                    .error
                    .as_deref()
                    .or(detail.message.as_deref())
                    .unwrap_or("사유 없음");
                lines.push(format!("  - {}: {reason}", detail.ip));
            }
        }
        let updates = &results.incident_updates;
        lines.push(format!(
            "- 이벤트 상태 변경: 성공 {}건, 실패 {}건",
            updates.success, updates.failed
        ));
    }
    if let Some(error) = &state.execution_error {
        lines.push(format!("- 오류: {error}"));
    }
    Some(lines.join("\n"))
}

/// epoch 초를 로컬 시각 문자열로 바꾼다.
pub fn format_epoch(seconds: i64) -> String {
    match Local.timestamp_opt(seconds, 0).single() {
        Some(time) if seconds > 0 => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "-".to_string(),
    }
}
