use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

/// 유일하게 제공되는 시나리오 템플릿 ID이다.
pub const DAILY_HIGH_RISK_CLOSURE: &str = "daily-high-risk-closure";

/// 시나리오 카탈로그 항목을 표현한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioTemplate {
    /// 템플릿 ID.
    pub id: &'static str,
    /// 화면에 표시할 이름.
    pub name: &'static str,
    /// 한 줄 설명.
    pub description: &'static str,
    /// 카드 아이콘(이모지).
    pub icon: &'static str,
    /// 전체 단계 수(분석 3단계 + 확인/실행 1단계).
    pub steps: u8,
    /// 예상 소요 시간.
    pub estimated_time: &'static str,
}

/// 실행 가능한 시나리오 목록이다.
pub const SCENARIOS: &[ScenarioTemplate] = &[ScenarioTemplate {
    id: DAILY_HIGH_RISK_CLOSURE,
    name: "일일 고위험 이벤트 종결",
    description: "오늘 처리되지 않은 고위험 이벤트를 조회하고 상위 이벤트를 분석해 IP 차단과 처리 상태 변경을 한 번에 제안한다",
    icon: "🛡️",
    steps: 4,
    estimated_time: "2-3분",
}];

/// ID로 시나리오 템플릿을 찾는다.
pub fn find_scenario(id: &str) -> Option<&'static ScenarioTemplate> {
    SCENARIOS.iter().find(|scenario| scenario.id == id)
}

/// 이벤트 심각도 라벨을 반환한다.
pub fn severity_label(level: u8) -> &'static str {
    match level {
        0 => "정보",
        1 => "낮음",
        2 => "중간",
        3 => "높음",
        4 => "심각",
        _ => "알 수 없음",
    }
}

/// IP 위협 등급 라벨을 반환한다.
pub fn threat_label(level: u8) -> &'static str {
    match level {
        1 => "낮음",
        2 => "중간",
        3 => "높음",
        4 => "심각",
        _ => "알 수 없음",
    }
}

/// 명시적인 `null`을 기본값으로 읽는다. 서버는 표시용 필드를 `null`로 보내기도 한다.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 보안 이벤트 한 건이다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// 이벤트 UUID.
    pub uu_id: String,
    /// 이벤트 이름.
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// 대상 호스트 IP.
    #[serde(default, deserialize_with = "null_default")]
    pub host_ip: String,
    /// 심각도(0~4).
    #[serde(default, deserialize_with = "null_default")]
    pub severity: u8,
    /// 처리 상태 코드.
    #[serde(default, deserialize_with = "null_default")]
    pub deal_status: i64,
    /// 마지막 발생 시각(epoch 초).
    #[serde(default, deserialize_with = "null_default")]
    pub end_time: i64,
}

/// 1단계: 이벤트 조회 결과이다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentQuery {
    /// 조회된 이벤트 목록.
    #[serde(default, deserialize_with = "null_default")]
    pub incidents: Vec<Incident>,
    /// 서버가 보고한 전체 건수.
    #[serde(default, deserialize_with = "null_default")]
    pub total: u64,
}

impl IncidentQuery {
    /// 이벤트 ID 목록을 순서대로 추출한다.
    pub fn incident_ids(&self) -> Vec<String> {
        self.incidents.iter().map(|incident| incident.uu_id.clone()).collect()
    }
}

/// LLM 또는 규칙 기반 위험도 평가 결과이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RiskAssessment {
    /// 위험 등급(0~4).
    #[serde(default, deserialize_with = "null_default")]
    pub risk_level: u8,
    /// 판단 근거.
    #[serde(default, deserialize_with = "null_default")]
    pub risk_reasoning: String,
    /// 권고 조치.
    #[serde(default, deserialize_with = "null_default")]
    pub recommendation: String,
}

/// 이벤트 타임라인 항목이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentTimeline {
    #[serde(default, deserialize_with = "null_default")]
    pub stage: String,
    #[serde(default, deserialize_with = "null_default")]
    pub time: String,
    pub score: Option<f64>,
    pub source: Option<String>,
}

/// 이벤트 증거 정보이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentProof {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub uu_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub host_ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub incident_time_lines: Vec<IncidentTimeline>,
}

/// 이벤트에 연관된 IP 엔티티이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpEntity {
    pub ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub threat_level: u8,
    #[serde(default, deserialize_with = "null_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_default")]
    pub intelligence_tag: Vec<String>,
}

/// 이벤트 엔티티 목록이다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IncidentEntities {
    #[serde(default, deserialize_with = "null_default")]
    pub item: Vec<IpEntity>,
}

/// 2단계에서 분석된 이벤트 한 건이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentDetail {
    /// 분석 대상 이벤트.
    pub incident: Incident,
    /// 증거 정보.
    #[serde(default)]
    pub proof: Option<IncidentProof>,
    /// IP 엔티티.
    #[serde(default)]
    pub entities: Option<IncidentEntities>,
    /// 분석 성공 여부.
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    /// 위험도 평가.
    #[serde(default)]
    pub risk_assessment: Option<RiskAssessment>,
    /// 분석 실패 사유.
    #[serde(default)]
    pub error: Option<String>,
}

/// 2단계: 이벤트 분석 결과이다.
///
/// 서버는 상위 N건 분석(`incident_details`)과 단일 이벤트 분석(`proof`/`entities`)
/// 두 형태를 보낸다. 역직렬화 시 둘 중 하나로 확정한다.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    /// 여러 이벤트 분석 결과.
    Batch(Vec<IncidentDetail>),
    /// 단일 이벤트 분석 결과.
    Single {
        proof: Option<IncidentProof>,
        entities: Option<IncidentEntities>,
    },
}

impl AnalysisPayload {
    /// 분석할 이벤트가 없을 때 사용하는 빈 결과이다.
    pub fn empty() -> Self {
        AnalysisPayload::Batch(Vec::new())
    }
}

impl<'de> Deserialize<'de> for AnalysisPayload {
    /// 두 가지 응답 형태를 명시적인 변형으로 변환한다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            incident_details: Option<Vec<IncidentDetail>>,
            #[serde(default)]
            proof: Option<IncidentProof>,
            #[serde(default)]
            entities: Option<IncidentEntities>,
        }

        let helper = Helper::deserialize(deserializer)?;
        Ok(match helper.incident_details {
            Some(details) => AnalysisPayload::Batch(details),
            None => AnalysisPayload::Single {
                proof: helper.proof,
                entities: helper.entities,
            },
        })
    }
}

/// 3단계에서 제시되는 IP 위협 정보이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpDetail {
    pub ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub threat_level: u8,
    #[serde(default, deserialize_with = "null_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub ndr_status: String,
}

/// 3단계에서 요약된 이벤트 한 건이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IncidentSummary {
    pub incident_id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub incident_name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub host_ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub severity: u8,
    #[serde(default, deserialize_with = "null_default")]
    pub ip_count: u32,
}

/// 확인 단계가 다루는 이벤트 범위이다.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationScope {
    /// 상위 N건 이벤트 요약.
    Batch(Vec<IncidentSummary>),
    /// 단일 이벤트.
    Single {
        incident_id: String,
        incident_name: String,
    },
    /// 처리할 이벤트가 없다.
    Empty,
}

/// 3단계: 처리 확인 정보이다.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationPayload {
    /// 차단 대상 IP 목록.
    pub ips_to_block: Vec<String>,
    /// IP별 위협 정보.
    pub ip_details: Vec<IpDetail>,
    /// AI 요약 문구.
    pub ai_summary: String,
    /// 이벤트 범위.
    pub scope: ConfirmationScope,
}

impl ConfirmationPayload {
    /// 처리할 이벤트가 없을 때 사용하는 중립 결과이다.
    pub fn nothing_to_remediate() -> Self {
        Self {
            ips_to_block: Vec::new(),
            ip_details: Vec::new(),
            ai_summary: "오늘 처리되지 않은 심각·고위험 이벤트가 없어 조치가 필요하지 않습니다.".into(),
            scope: ConfirmationScope::Empty,
        }
    }
}

impl<'de> Deserialize<'de> for ConfirmationPayload {
    /// 단일/다중 이벤트 응답 형태를 모두 지원하도록 역직렬화한다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default, deserialize_with = "null_default")]
            ips_to_block: Vec<String>,
            #[serde(default, deserialize_with = "null_default")]
            ip_details: Vec<IpDetail>,
            #[serde(default, deserialize_with = "null_default")]
            ai_summary: String,
            #[serde(default)]
            incident_summaries: Option<Vec<IncidentSummary>>,
            #[serde(default)]
            incident_id: Option<String>,
            #[serde(default)]
            incident_name: Option<String>,
        }

        let helper = Helper::deserialize(deserializer)?;
        let scope = match (helper.incident_summaries, helper.incident_id) {
            (Some(summaries), _) => ConfirmationScope::Batch(summaries),
            (None, Some(incident_id)) => ConfirmationScope::Single {
                incident_id,
                incident_name: helper.incident_name.unwrap_or_default(),
            },
            (None, None) => ConfirmationScope::Empty,
        };
        Ok(Self {
            ips_to_block: helper.ips_to_block,
            ip_details: helper.ip_details,
            ai_summary: helper.ai_summary,
            scope,
        })
    }
}

/// 확인 후 실행 요청 본문이다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRequest {
    pub incident_ids: Vec<String>,
    pub ips_to_block: Vec<String>,
    pub auth_code: String,
    pub flux_base_url: String,
}

/// IP 차단 결과 한 건이다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IpBlockDetail {
    pub ip: String,
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub rule_ids: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// IP 차단 결과 집계이다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IpBlockSummary {
    #[serde(default, deserialize_with = "null_default")]
    pub total: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub success: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub failed: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub details: Vec<IpBlockDetail>,
}

/// 이벤트 상태 변경 결과 한 건이다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentUpdateDetail {
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub total: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub succeeded_num: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub failed_num: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// 이벤트 상태 변경 결과 집계이다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentUpdateSummary {
    pub total: u32,
    pub success: u32,
    pub failed: u32,
    pub details: Vec<IncidentUpdateDetail>,
}

impl<'de> Deserialize<'de> for IncidentUpdateSummary {
    /// 집계 객체, 결과 목록, 단일 결과 세 형태를 집계 형태로 정규화한다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Summary {
                total: u32,
                success: u32,
                failed: u32,
                #[serde(default, deserialize_with = "null_default")]
                details: Vec<IncidentUpdateDetail>,
            },
            List(Vec<IncidentUpdateDetail>),
            Single(IncidentUpdateDetail),
        }

        Ok(match Helper::deserialize(deserializer)? {
            Helper::Summary {
                total,
                success,
                failed,
                details,
            } => IncidentUpdateSummary {
                total,
                success,
                failed,
                details,
            },
            Helper::List(details) => {
                let success = details.iter().filter(|d| d.success).count() as u32;
                IncidentUpdateSummary {
                    total: details.len() as u32,
                    success,
                    failed: details.len() as u32 - success,
                    details,
                }
            }
            Helper::Single(detail) => IncidentUpdateSummary {
                total: detail.total,
                success: detail.succeeded_num,
                failed: detail.failed_num,
                details: vec![detail],
            },
        })
    }
}

/// 실행 결과 본문이다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExecutionResults {
    #[serde(default, deserialize_with = "null_default")]
    pub ip_block: IpBlockSummary,
    #[serde(default, alias = "incident_update", deserialize_with = "null_default")]
    pub incident_updates: IncidentUpdateSummary,
}

impl ExecutionResults {
    /// 성공한 하위 작업 수.
    pub fn succeeded(&self) -> u32 {
        self.ip_block.success + self.incident_updates.success
    }

    /// 실패한 하위 작업 수.
    pub fn failed(&self) -> u32 {
        self.ip_block.failed + self.incident_updates.failed
    }
}

/// 실행 엔드포인트 응답이다.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResponse {
    /// 서버가 판단한 전체 성공 여부.
    pub success: bool,
    /// 서버가 표시한 부분 성공 여부.
    pub partial_success: bool,
    /// 사용자 메시지.
    pub message: String,
    /// 하위 작업 결과.
    pub results: Option<ExecutionResults>,
}

impl<'de> Deserialize<'de> for ExecutionResponse {
    /// `results` 중첩 응답과 평탄한 응답을 모두 받아들인다.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default, deserialize_with = "null_default")]
            success: bool,
            #[serde(default)]
            partial_success: Option<bool>,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            error: Option<String>,
            #[serde(default)]
            results: Option<ExecutionResults>,
            #[serde(default)]
            ip_block: Option<IpBlockSummary>,
            #[serde(default, alias = "incident_update")]
            incident_updates: Option<IncidentUpdateSummary>,
        }

        let helper = Helper::deserialize(deserializer)?;
        let flat = match (helper.ip_block, helper.incident_updates) {
            (None, None) => None,
            (ip_block, incident_updates) => Some(ExecutionResults {
                ip_block: ip_block.unwrap_or_default(),
                incident_updates: incident_updates.unwrap_or_default(),
            }),
        };
        Ok(Self {
            success: helper.success,
            partial_success: helper.partial_success.unwrap_or(false),
            message: helper.message.or(helper.error).unwrap_or_default(),
            results: helper.results.or(flat),
        })
    }
}
