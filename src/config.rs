use crate::error::ConfigError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// 백엔드 기본 주소이다.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// 설정 파일 경로를 덮어쓰는 환경 변수 이름이다.
const CONFIG_PATH_ENV: &str = "FLUX_COCKPIT_CONFIG";

/// 설정 화면에서 고를 수 있는 LLM 제공자 정의이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderPreset {
    /// 백엔드에 전달되는 제공자 값.
    pub value: &'static str,
    /// 표시 이름.
    pub label: &'static str,
    /// 대표 모델명.
    pub model: &'static str,
    /// 아이콘(이모지).
    pub icon: &'static str,
    /// 제공자 기본 API 주소.
    pub default_base_url: Option<&'static str>,
}

/// 지원하는 LLM 제공자 목록이다.
pub const PROVIDERS: &[ProviderPreset] = &[
    ProviderPreset {
        value: "zhipu",
        label: "Zhipu AI",
        model: "GLM-4.7",
        icon: "🤖",
        default_base_url: Some("https://open.bigmodel.cn/api/paas/v4/"),
    },
    ProviderPreset {
        value: "openai",
        label: "OpenAI",
        model: "GPT-4",
        icon: "🧠",
        default_base_url: Some("https://api.openai.com/v1/"),
    },
    ProviderPreset {
        value: "azure",
        label: "Azure OpenAI",
        model: "GPT-4",
        icon: "☁️",
        default_base_url: Some("https://{your-resource-name}.openai.azure.com/"),
    },
    ProviderPreset {
        value: "deepseek",
        label: "DeepSeek",
        model: "DeepSeek",
        icon: "🔍",
        default_base_url: Some("https://api.deepseek.com/v1/"),
    },
    ProviderPreset {
        value: "custom",
        label: "사용자 정의",
        model: "사용자 정의",
        icon: "⚙️",
        default_base_url: None,
    },
];

/// 제공자 값으로 프리셋을 찾는다.
pub fn provider_preset(value: &str) -> Option<&'static ProviderPreset> {
    PROVIDERS.iter().find(|preset| preset.value == value)
}

/// LLM 제공자 설정이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
}

impl Default for LlmConfig {
    /// 기본 제공자는 zhipu이다.
    fn default() -> Self {
        Self {
            provider: "zhipu".into(),
            api_key: String::new(),
            base_url: "https://open.bigmodel.cn/api/paas/v4/".into(),
        }
    }
}

impl LlmConfig {
    /// 제공자를 바꾸고 프리셋 기본 주소가 있으면 함께 적용한다.
    pub fn switch_provider(&mut self, value: &str) {
        self.provider = value.to_string();
        if let Some(url) = provider_preset(value).and_then(|preset| preset.default_base_url) {
            self.base_url = url.to_string();
        }
    }
}

/// Flux 백엔드 인증 정보이다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluxAuth {
    #[serde(default)]
    pub auth_code: String,
    #[serde(default)]
    pub base_url: String,
}

/// 로컬에 저장되는 전체 설정이다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FluxConfig {
    /// 백엔드 API 주소.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// LLM 제공자 설정.
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    /// Flux 인증 정보.
    #[serde(default)]
    pub flux: Option<FluxAuth>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            llm: None,
            flux: None,
        }
    }
}

/// 시나리오 스트림을 여는 데 필요한 검증된 설정 묶음이다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioCredentials {
    pub api_base: Url,
    pub llm: LlmConfig,
    pub flux: FluxAuth,
}

impl FluxConfig {
    /// 백엔드 주소를 해석한다.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        let trimmed = self.api_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::InvalidApiUrl("(비어 있음)".into()));
        }
        Url::parse(trimmed).map_err(|err| ConfigError::InvalidApiUrl(format!("{trimmed} ({err})")))
    }

    /// API 키까지 채워진 LLM 설정을 반환한다.
    pub fn llm(&self) -> Result<&LlmConfig, ConfigError> {
        match &self.llm {
            Some(llm) if !llm.provider.trim().is_empty() && !llm.api_key.trim().is_empty() => {
                Ok(llm)
            }
            _ => Err(ConfigError::MissingLlmConfig),
        }
    }

    /// 인증 코드와 주소가 모두 있는 Flux 인증 정보를 반환한다.
    pub fn flux_auth(&self) -> Result<&FluxAuth, ConfigError> {
        match &self.flux {
            Some(flux) if !flux.auth_code.trim().is_empty() && !flux.base_url.trim().is_empty() => {
                Ok(flux)
            }
            _ => Err(ConfigError::MissingFluxAuth),
        }
    }

    /// 시나리오 시작에 필요한 설정을 한 번에 검증한다.
    pub fn scenario_credentials(&self) -> Result<ScenarioCredentials, ConfigError> {
        let llm = self.llm()?.clone();
        let flux = self.flux_auth()?.clone();
        let api_base = self.api_base()?;
        Ok(ScenarioCredentials {
            api_base,
            llm,
            flux,
        })
    }
}

/// 기본 설정 파일 경로를 결정한다.
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    directories::ProjectDirs::from("", "", "flux-cockpit").map_or_else(
        || PathBuf::from("flux-cockpit.yaml"),
        |dirs| dirs.config_dir().join("config.yaml"),
    )
}

/// YAML 설정 파일을 읽는다. 파일이 없으면 기본값을 돌려준다.
pub fn load_config(path: &Path) -> Result<FluxConfig, ConfigError> {
    if !path.exists() {
        return Ok(FluxConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(FluxConfig::default());
    }
    Ok(serde_yaml::from_str(&raw)?)
}

/// 설정을 YAML 파일로 저장한다.
pub fn save_config(path: &Path, config: &FluxConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("설정 디렉터리 생성 실패: {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(config).context("설정 직렬화 실패")?;
    fs::write(path, yaml).with_context(|| format!("설정 파일 쓰기 실패: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> FluxConfig {
        FluxConfig {
            api_url: "http://127.0.0.1:8000".into(),
            llm: Some(LlmConfig {
                provider: "openai".into(),
                api_key: "sk-test".into(),
                base_url: "https://api.openai.com/v1/".into(),
            }),
            flux: Some(FluxAuth {
                auth_code: "code".into(),
                base_url: "https://flux.example".into(),
            }),
        }
    }

    /// 설정을 저장한 뒤 다시 읽으면 동일한 값이 복원된다.
    #[test]
    fn config_survives_save_and_load() {
        let dir = tempfile::tempdir().expect("임시 디렉터리 생성 실패");
        let path = dir.path().join("nested").join("config.yaml");
        let config = complete_config();
        save_config(&path, &config).expect("저장 실패");
        let loaded = load_config(&path).expect("읽기 실패");
        assert_eq!(config, loaded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("임시 디렉터리 생성 실패");
        let loaded = load_config(&dir.path().join("absent.yaml")).expect("읽기 실패");
        assert_eq!(loaded, FluxConfig::default());
        assert_eq!(loaded.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("임시 디렉터리 생성 실패");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "llm: [unterminated").expect("파일 작성 실패");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    /// 필수 설정이 빠지면 어떤 항목이 없는지 구분해 알려준다.
    #[test]
    fn scenario_credentials_require_llm_and_flux() {
        let mut config = complete_config();
        assert!(config.scenario_credentials().is_ok());

        config.llm.as_mut().expect("llm").api_key.clear();
        assert!(matches!(
            config.scenario_credentials(),
            Err(ConfigError::MissingLlmConfig)
        ));

        let mut config = complete_config();
        config.flux = None;
        assert!(matches!(
            config.scenario_credentials(),
            Err(ConfigError::MissingFluxAuth)
        ));

        let mut config = complete_config();
        config.api_url = "not a url".into();
        assert!(matches!(
            config.scenario_credentials(),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn switching_provider_applies_preset_base_url() {
        let mut llm = LlmConfig::default();
        llm.switch_provider("deepseek");
        assert_eq!(llm.base_url, "https://api.deepseek.com/v1/");
        llm.base_url = "https://proxy.internal/v1/".into();
        llm.switch_provider("custom");
        assert_eq!(llm.provider, "custom");
        assert_eq!(llm.base_url, "https://proxy.internal/v1/");
    }
}
