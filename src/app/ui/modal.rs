use super::*;
use crate::scenario::{
    AnalysisPayload, ConfirmationPayload, ConfirmationScope, ExecutionResults, IncidentQuery,
    find_scenario, severity_label, threat_label,
};

/// 대화상자 버튼으로 요청된 동작이다.
enum DialogAction {
    Confirm,
    Cancel,
    Close,
}

impl FluxApp {
    /// 시나리오 진행 대화상자를 렌더링해 사용자 결정을 수집한다.
    pub(super) fn render_scenario_dialog(&mut self, ctx: &egui::Context) {
        if !self.controller.state().is_open {
            return;
        }
        let palette = *self.theme.palette();
        let mut action: Option<DialogAction> = None;
        let state = self.controller.state();
        let title = state
            .scenario_id
            .as_deref()
            .and_then(find_scenario)
            .map_or("시나리오", |scenario| scenario.name);

        egui::Window::new("시나리오 진행")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .show(ctx, |ui| {
                ui.set_width(640.0);
                ui.label(
                    RichText::new(format!("🛡️ {title}"))
                        .size(20.0)
                        .color(palette.fg_text_primary)
                        .strong(),
                );
                ui.add_space(6.0);
                let ratio = view::analysis_progress(state);
                ui.add(
                    egui::ProgressBar::new(ratio)
                        .fill(palette.accent_primary)
                        .text(format!("분석 진행률: {:.0}%", ratio * 100.0)),
                );
                ui.add_space(10.0);

                egui::ScrollArea::vertical()
                    .max_height(460.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        ui.spacing_mut().item_spacing.y = 8.0;
                        for step in 1..=crate::engine::ANALYSIS_STEPS {
                            let status = state.status(step);
                            let (icon, text) = status::status_indicator(status);
                            ui.add(
                                StepCard::new(&self.theme, step, view::step_title(step))
                                    .status(icon, text, self.theme.step_color(status))
                                    .highlighted(status == StepStatus::Loading),
                            );
                            if status == StepStatus::Completed {
                                ui.indent(("step_detail", step), |ui| {
                                    self.render_step_detail(ui, state, step);
                                });
                            }
                        }
                        let (icon, text) = status::execution_indicator(state);
                        ui.add(
                            StepCard::new(&self.theme, 4, view::step_title(4))
                                .status(icon, text, self.theme.execution_color(state.execution_status))
                                .highlighted(state.can_confirm()),
                        );
                        if let Some(error) = &state.stream_error {
                            ui.label(
                                RichText::new(format!("❌ {error}"))
                                    .color(palette.accent_error)
                                    .strong(),
                            );
                        }
                        self.render_execution_outcome(ui, state);
                    });

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if state.execution_status.is_terminal() {
                        if ui
                            .add(PrimaryButton::new(&self.theme, "닫기").icon("✔"))
                            .clicked()
                        {
                            action = Some(DialogAction::Close);
                        }
                        return;
                    }
                    let caption = view::confirm_caption(state);
                    if ui
                        .add_enabled(
                            state.can_confirm(),
                            PrimaryButton::new(&self.theme, caption).icon("✅"),
                        )
                        .clicked()
                    {
                        action = Some(DialogAction::Confirm);
                    }
                    let executing = state.execution_status == ExecutionStatus::Executing;
                    if executing {
                        ui.spinner();
                    }
                    if ui
                        .add_enabled(
                            !executing,
                            PrimaryButton::new(&self.theme, "취소")
                                .icon("🛑")
                                .tone(ButtonTone::Danger),
                        )
                        .clicked()
                    {
                        action = Some(DialogAction::Cancel);
                    }
                });
            });

        match action {
            Some(DialogAction::Confirm) => self.confirm_scenario(),
            Some(DialogAction::Cancel) => self.cancel_scenario(),
            Some(DialogAction::Close) => self.close_scenario(),
            None => {}
        }
    }

    /// 완료된 분석 단계의 결과를 보여준다.
    fn render_step_detail(&self, ui: &mut egui::Ui, state: &ScenarioState, step: usize) {
        match step {
            1 => match &state.incidents {
                Some(query) => self.render_incidents(ui, query),
                None => self.render_pending(ui),
            },
            2 => match &state.analysis {
                Some(payload) => self.render_analysis(ui, payload),
                None => self.render_pending(ui),
            },
            _ => match &state.confirmation {
                Some(payload) => self.render_confirmation(ui, payload),
                None => self.render_pending(ui),
            },
        }
    }

    fn render_pending(&self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("결과를 기다리는 중입니다.")
                .color(self.theme.palette().fg_text_secondary)
                .italics(),
        );
    }

    fn render_incidents(&self, ui: &mut egui::Ui, query: &IncidentQuery) {
        let palette = *self.theme.palette();
        ui.label(
            RichText::new(format!("미처리 고위험 이벤트 {}건", query.total))
                .color(palette.fg_text_primary),
        );
        if query.incidents.is_empty() {
            return;
        }
        egui::Grid::new("incident_grid")
            .num_columns(4)
            .spacing([12.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                for incident in &query.incidents {
                    ui.label(&incident.name);
                    ui.label(&incident.host_ip);
                    level_badge(
                        ui,
                        self.theme.tone_color(level_tone(incident.severity)),
                        severity_label(incident.severity),
                    );
                    ui.label(view::format_epoch(incident.end_time));
                    ui.end_row();
                }
            });
    }

    fn render_analysis(&self, ui: &mut egui::Ui, payload: &AnalysisPayload) {
        let palette = *self.theme.palette();
        match payload {
            AnalysisPayload::Batch(details) if details.is_empty() => {
                ui.label(RichText::new("분석할 이벤트가 없습니다.").color(palette.fg_text_secondary));
            }
            AnalysisPayload::Batch(details) => {
                for detail in details {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new(&detail.incident.name).strong());
                        if let Some(risk) = &detail.risk_assessment {
                            level_badge(
                                ui,
                                self.theme.tone_color(level_tone(risk.risk_level)),
                                &format!("위험도 {}", risk.risk_level),
                            );
                        }
                    });
                    if let Some(risk) = &detail.risk_assessment {
                        if !risk.risk_reasoning.is_empty() {
                            ui.label(
                                RichText::new(&risk.risk_reasoning).color(palette.fg_text_secondary),
                            );
                        }
                    }
                    if let Some(error) = detail.error.as_deref().filter(|_| !detail.success) {
                        ui.label(RichText::new(error).color(palette.accent_error));
                    }
                }
            }
            AnalysisPayload::Single { proof, entities } => {
                if let Some(proof) = proof {
                    ui.label(
                        RichText::new(format!(
                            "{} · {} · 타임라인 {}건",
                            proof.name,
                            proof.host_ip,
                            proof.incident_time_lines.len()
                        ))
                        .strong(),
                    );
                }
                for entity in entities.iter().flat_map(|e| e.item.iter()) {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(&entity.ip);
                        level_badge(
                            ui,
                            self.theme.tone_color(level_tone(entity.threat_level)),
                            threat_label(entity.threat_level),
                        );
                        ui.label(RichText::new(&entity.location).color(palette.fg_text_secondary));
                    });
                }
            }
        }
    }

    fn render_confirmation(&self, ui: &mut egui::Ui, payload: &ConfirmationPayload) {
        let palette = *self.theme.palette();
        if !payload.ai_summary.is_empty() {
            ui.label(RichText::new(&payload.ai_summary).color(palette.fg_text_primary));
        }
        match &payload.scope {
            ConfirmationScope::Batch(summaries) => {
                for summary in summaries {
                    ui.label(
                        RichText::new(format!(
                            "• {} ({}) · {} · IP {}개",
                            summary.incident_name,
                            summary.host_ip,
                            severity_label(summary.severity),
                            summary.ip_count
                        ))
                        .color(palette.fg_text_secondary),
                    );
                }
            }
            ConfirmationScope::Single {
                incident_id,
                incident_name,
            } => {
                ui.label(
                    RichText::new(format!("대상 이벤트: {incident_name} ({incident_id})"))
                        .color(palette.fg_text_secondary),
                );
            }
            ConfirmationScope::Empty => {}
        }
        if payload.ip_details.is_empty() {
            return;
        }
        ui.add_space(4.0);
        ui.label(RichText::new(format!("차단 대상 IP {}개", payload.ips_to_block.len())).strong());
        egui::Grid::new("ip_grid")
            .num_columns(4)
            .spacing([12.0, 6.0])
            .striped(true)
            .show(ui, |ui| {
                for detail in &payload.ip_details {
                    ui.label(&detail.ip);
                    level_badge(
                        ui,
                        self.theme.tone_color(level_tone(detail.threat_level)),
                        threat_label(detail.threat_level),
                    );
                    ui.label(&detail.location);
                    ui.label(detail.tags.join(", "));
                    ui.end_row();
                }
            });
    }

    /// 실행 결과 요약과 항목별 결과를 보여준다.
    fn render_execution_outcome(&self, ui: &mut egui::Ui, state: &ScenarioState) {
        let Some(headline) = view::outcome_headline(state.execution_status) else {
            return;
        };
        let palette = *self.theme.palette();
        ui.add_space(6.0);
        ui.label(
            RichText::new(headline)
                .size(16.0)
                .color(self.theme.execution_color(state.execution_status))
                .strong(),
        );
        if let Some(error) = &state.execution_error {
            ui.label(RichText::new(error).color(palette.accent_error));
        }
        if let Some(results) = &state.execution_result {
            self.render_result_details(ui, results);
        }
    }

    fn render_result_details(&self, ui: &mut egui::Ui, results: &ExecutionResults) {
        let palette = *self.theme.palette();
        let ok = |success: bool| {
            if success {
                ("✅", palette.accent_success)
            } else {
                ("❌", palette.accent_error)
            }
        };
        ui.label(format!(
            "IP 차단 · 성공 {} / 실패 {} / 전체 {}",
            results.ip_block.success, results.ip_block.failed, results.ip_block.total
        ));
        for detail in &results.ip_block.details {
            let (icon, color) = ok(detail.success);
            let note = detail
                .error
                .as_deref()
                .or(detail.message.as_deref())
                .unwrap_or_default();
            ui.label(RichText::new(format!("  {icon} {} {note}", detail.ip)).color(color));
        }
        let updates = &results.incident_updates;
        ui.label(format!(
            "이벤트 상태 변경 · 성공 {} / 실패 {} / 전체 {}",
            updates.success, updates.failed, updates.total
        ));
        for detail in &updates.details {
            let (icon, color) = ok(detail.success);
            ui.label(
                RichText::new(format!(
                    "  {icon} {}건 처리 · {}",
                    detail.succeeded_num,
                    detail.message.as_deref().unwrap_or_default()
                ))
                .color(color),
            );
        }
    }
}
