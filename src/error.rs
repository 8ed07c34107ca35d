/// 로컬 설정이 없거나 읽을 수 없을 때 발생하는 오류이다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// LLM 제공자 설정이 비어 있다.
    #[error("먼저 설정 화면에서 LLM API를 설정하세요.")]
    MissingLlmConfig,
    /// Flux 인증 정보가 비어 있다.
    #[error("Flux 인증 정보가 없습니다. 인증 코드와 Flux 주소를 설정하세요.")]
    MissingFluxAuth,
    /// 백엔드 주소가 비어 있거나 잘못되었다.
    #[error("백엔드 주소가 올바르지 않습니다: {0}")]
    InvalidApiUrl(String),
    /// 설정 파일 입출력 오류이다.
    #[error("설정 파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 파일 형식 오류이다.
    #[error("설정 파일 형식 오류: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// 백엔드 호출 중 발생하는 오류이다.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// 네트워크 또는 HTTP 전송 오류이다.
    #[error("네트워크 오류: {0}")]
    Transport(#[from] reqwest::Error),
    /// 2xx가 아닌 응답이다.
    #[error("API 요청 실패 (HTTP {status}): {body}")]
    Status { status: u16, body: String },
    /// 응답 본문을 해석할 수 없다.
    #[error("응답 해석 실패: {0}")]
    Decode(#[from] serde_json::Error),
    /// 서버가 실패 봉투를 돌려주었다.
    #[error("{0}")]
    Envelope(String),
}
