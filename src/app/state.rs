use crate::backend::{ChatRequest, SharedBackend};
use crate::config::{FluxAuth, FluxConfig, LlmConfig, save_config};
use crate::engine::ScenarioController;
use crate::error::BackendError;
use crate::theme::{Theme, install_custom_font};
use crate::transcript::{MessageKind, Notice, Transcript};
use eframe::egui;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{info, warn};

/// 상단 탭 종류를 나타낸다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppTab {
    Chat,
    Settings,
}

/// 설정 화면에서 편집 중인 값이다. 저장 전까지 실제 설정에 반영되지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SettingsDraft {
    pub(crate) api_url: String,
    pub(crate) llm: LlmConfig,
    pub(crate) auth_code: String,
    pub(crate) flux_base_url: String,
}

impl SettingsDraft {
    pub(crate) fn from_config(config: &FluxConfig) -> Self {
        let flux = config.flux.clone().unwrap_or_default();
        Self {
            api_url: config.api_url.clone(),
            llm: config.llm.clone().unwrap_or_default(),
            auth_code: flux.auth_code,
            flux_base_url: flux.base_url,
        }
    }

    /// 편집 값을 저장할 설정으로 바꾼다. 비어 있는 항목은 `None`으로 둔다.
    pub(crate) fn to_config(&self) -> FluxConfig {
        let llm = self.llm.clone();
        let llm = (!llm.api_key.trim().is_empty()).then_some(llm);
        let flux = FluxAuth {
            auth_code: self.auth_code.trim().to_string(),
            base_url: self.flux_base_url.trim().to_string(),
        };
        let flux = (!flux.auth_code.is_empty() || !flux.base_url.is_empty()).then_some(flux);
        FluxConfig {
            api_url: self.api_url.trim().to_string(),
            llm,
            flux,
        }
    }
}

/// egui 애플리케이션의 전체 상태를 보관한다.
pub struct FluxApp {
    /// UI 테마 정보.
    pub(crate) theme: Theme,
    /// 선택된 탭.
    pub(crate) active_tab: AppTab,
    /// Tokio 런타임.
    runtime: Runtime,
    /// 백엔드 클라이언트.
    backend: SharedBackend,
    /// 시나리오 컨트롤러.
    pub(crate) controller: ScenarioController,
    /// 대화 기록.
    pub(crate) transcript: Transcript,
    /// 입력창 내용.
    pub(crate) input: String,
    /// 대화 응답 대기 채널.
    chat_rx: Option<oneshot::Receiver<Result<String, BackendError>>>,
    /// 설정 파일 경로.
    pub(crate) config_path: PathBuf,
    /// 저장된 설정.
    pub(crate) config: FluxConfig,
    /// 설정 화면 편집 값.
    pub(crate) settings_draft: SettingsDraft,
    /// 설정 저장 결과 메시지. `true`면 성공.
    pub(crate) settings_status: Option<(bool, String)>,
    /// 마지막 오류 메시지.
    pub(crate) last_error: Option<String>,
}

impl FluxApp {
    /// egui Context와 런타임, 백엔드, 읽어 둔 설정으로 초기 상태를 구성한다.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        backend: SharedBackend,
        config_path: PathBuf,
        config: FluxConfig,
        load_error: Option<String>,
    ) -> Self {
        let theme = Theme::default();
        theme.apply(&cc.egui_ctx);
        install_custom_font(&cc.egui_ctx);

        let controller = ScenarioController::new(backend.clone(), runtime.handle().clone());
        let active_tab = if config.llm().is_ok() {
            AppTab::Chat
        } else {
            AppTab::Settings
        };
        Self {
            theme,
            active_tab,
            runtime,
            backend,
            controller,
            transcript: Transcript::new(),
            input: String::new(),
            chat_rx: None,
            settings_draft: SettingsDraft::from_config(&config),
            config_path,
            config,
            settings_status: None,
            last_error: load_error,
        }
    }

    /// 대화 응답을 기다리는 중인지 확인한다.
    pub(crate) fn chat_pending(&self) -> bool {
        self.chat_rx.is_some()
    }

    /// 비동기 작업 결과를 모두 소비하여 UI 상태를 동기화한다.
    pub(super) fn drain_events(&mut self) {
        self.controller.poll();
        self.transcript.extend(self.controller.drain_notices());

        if let Some(rx) = self.chat_rx.as_mut() {
            let reply = match rx.try_recv() {
                Ok(reply) => Some(reply.map_err(|err| err.to_string())),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(Err("응답을 받지 못했습니다.".to_string())),
            };
            if let Some(reply) = reply {
                self.chat_rx = None;
                match reply {
                    Ok(message) => {
                        self.transcript.append(Notice::assistant(MessageKind::Text, message));
                    }
                    Err(err) => {
                        warn!(error = %err, "대화 요청 실패");
                        self.transcript
                            .append(Notice::assistant(MessageKind::Error, format!("요청 실패: {err}")));
                    }
                }
            }
        }
    }

    /// 백그라운드 작업이 남아 있으면 주기적으로 다시 그리도록 요청한다.
    pub(super) fn schedule_repaint(&self, ctx: &egui::Context) {
        if self.controller.is_waiting() || self.chat_pending() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    pub(super) fn start_scenario(&mut self, scenario_id: &str) {
        if !self.controller.start(scenario_id, &self.config) {
            self.last_error = Some("시나리오를 시작하지 못했습니다. 설정을 확인하세요.".into());
        } else {
            self.last_error = None;
        }
        self.transcript.extend(self.controller.drain_notices());
    }

    pub(super) fn confirm_scenario(&mut self) {
        self.controller.confirm(&self.config);
        self.transcript.extend(self.controller.drain_notices());
    }

    pub(super) fn cancel_scenario(&mut self) {
        self.controller.cancel();
        self.transcript.extend(self.controller.drain_notices());
    }

    pub(super) fn close_scenario(&mut self) {
        self.controller.close();
    }

    /// 입력창의 메시지를 대화 API로 보낸다.
    pub(super) fn send_chat(&mut self) {
        let content = self.input.trim().to_string();
        if content.is_empty() || self.chat_pending() {
            return;
        }
        let prepared = self
            .config
            .llm()
            .cloned()
            .and_then(|llm| self.config.api_base().map(|api_base| (llm, api_base)));
        let (llm, api_base) = match prepared {
            Ok(pair) => pair,
            Err(err) => {
                self.transcript
                    .append(Notice::assistant(MessageKind::Error, err.to_string()));
                return;
            }
        };
        self.input.clear();
        self.transcript.append(Notice::user(content));

        let request = ChatRequest::new(
            self.transcript.history(),
            &llm,
            self.config.flux_auth().ok(),
        );
        let (tx, rx) = oneshot::channel();
        let backend = self.backend.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(backend.chat(&api_base, request).await);
        });
        self.chat_rx = Some(rx);
    }

    /// 대화 기록을 비우고 새 대화를 시작한다.
    pub(super) fn new_conversation(&mut self) {
        self.chat_rx = None;
        self.transcript.reset();
    }

    /// 설정 편집 값을 저장하고 적용한다.
    pub(super) fn save_settings(&mut self) {
        let config = self.settings_draft.to_config();
        if let Err(err) = config.api_base() {
            self.settings_status = Some((false, err.to_string()));
            return;
        }
        match save_config(&self.config_path, &config) {
            Ok(()) => {
                info!(path = %self.config_path.display(), "설정 저장");
                self.config = config;
                self.settings_status = Some((true, "설정을 저장했습니다.".into()));
                self.last_error = None;
            }
            Err(err) => {
                warn!(error = %err, "설정 저장 실패");
                self.settings_status = Some((false, format!("{err:#}")));
            }
        }
    }

    /// 편집 값을 저장된 설정으로 되돌린다.
    pub(super) fn revert_settings(&mut self) {
        self.settings_draft = SettingsDraft::from_config(&self.config);
        self.settings_status = None;
    }
}
