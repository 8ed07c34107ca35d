use super::*;
use crate::scenario::SCENARIOS;
use crate::transcript::{ChatMessage, MessageKind, Role};

impl FluxApp {
    /// 좌측 시나리오 목록 패널을 그린다.
    pub(super) fn render_scenario_panel(&mut self, ui: &mut egui::Ui) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        solid_section_header(ui, &self.theme, "🧭", "시나리오");
        ui.add_space(12.0);
        ui.spacing_mut().item_spacing.y = 12.0;

        let running = self.controller.state().is_open;
        let mut requested: Option<&'static str> = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for scenario in SCENARIOS {
                    egui::Frame::none()
                        .fill(palette.bg_panel)
                        .stroke(egui::Stroke::new(1.0, palette.border_soft))
                        .rounding(egui::Rounding::same(decorations.card_rounding))
                        .inner_margin(decorations.card_inner_margin)
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.label(
                                RichText::new(format!("{} {}", scenario.icon, scenario.name))
                                    .size(16.0)
                                    .color(palette.fg_text_primary)
                                    .strong(),
                            );
                            ui.add_space(4.0);
                            ui.label(
                                RichText::new(scenario.description).color(palette.fg_text_secondary),
                            );
                            ui.add_space(4.0);
                            ui.label(
                                RichText::new(format!(
                                    "{}단계 · 예상 {}",
                                    scenario.steps, scenario.estimated_time
                                ))
                                .size(12.0)
                                .color(palette.fg_text_secondary),
                            );
                            ui.add_space(8.0);
                            if ui
                                .add_enabled(
                                    !running,
                                    PrimaryButton::new(&self.theme, "실행").icon("▶"),
                                )
                                .clicked()
                            {
                                requested = Some(scenario.id);
                            }
                        });
                }
            });
        if let Some(id) = requested {
            self.start_scenario(id);
        }
    }

    /// 대화 기록을 렌더링한다.
    pub(super) fn render_transcript(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = 10.0;
                for message in self.transcript.messages() {
                    ui.push_id(message.id, |ui| self.render_message(ui, message));
                }
                if self.chat_pending() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(
                            RichText::new("답변을 작성하는 중...")
                                .color(self.theme.palette().fg_text_secondary)
                                .italics(),
                        );
                    });
                }
            });
    }

    fn render_message(&self, ui: &mut egui::Ui, message: &ChatMessage) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        let (fill, accent) = match (message.role, message.kind) {
            (Role::User, _) => (palette.bg_user_bubble, palette.fg_text_primary),
            (_, MessageKind::Error) => (palette.bg_panel, palette.accent_error),
            (_, MessageKind::Warning) => (palette.bg_panel, palette.accent_warning),
            (_, MessageKind::Scenario | MessageKind::ScenarioResult) => {
                (palette.bg_panel, palette.accent_primary)
            }
            (_, MessageKind::Text) => (palette.bg_panel, palette.border_soft),
        };
        let layout = match message.role {
            Role::User => egui::Layout::right_to_left(egui::Align::TOP),
            Role::Assistant => egui::Layout::left_to_right(egui::Align::TOP),
        };
        ui.with_layout(layout, |ui| {
            egui::Frame::none()
                .fill(fill)
                .stroke(egui::Stroke::new(1.0, accent))
                .rounding(egui::Rounding::same(decorations.card_rounding))
                .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.8);
                    ui.vertical(|ui| {
                        ui.label(RichText::new(&message.content).color(palette.fg_text_primary));
                        ui.label(
                            RichText::new(message.timestamp.format("%H:%M").to_string())
                                .size(11.0)
                                .color(palette.fg_text_secondary),
                        );
                    });
                });
        });
    }

    /// 하단 입력창을 그린다. Enter로 전송하고 Shift+Enter로 줄을 바꾼다.
    pub(super) fn render_input(&mut self, ui: &mut egui::Ui) {
        let decorations = *self.theme.decorations();
        let busy = self.chat_pending();
        let mut submit = false;
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = decorations.button_gap;
            let width = ui.available_width() - decorations.button_min_width - decorations.button_gap;
            let response = ui.add_enabled(
                !busy,
                egui::TextEdit::multiline(&mut self.input)
                    .hint_text("메시지를 입력하세요...")
                    .desired_rows(2)
                    .desired_width(width),
            );
            if response.has_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift)
            {
                submit = true;
            }
            let can_send = !busy && !self.input.trim().is_empty();
            if ui
                .add_enabled(can_send, PrimaryButton::new(&self.theme, "전송").icon("📨"))
                .clicked()
            {
                submit = true;
            }
        });
        if submit {
            // Enter 입력으로 들어간 줄바꿈은 버린다.
            let trimmed = self.input.trim_end_matches(['\n', '\r']).to_string();
            self.input = trimmed;
            self.send_chat();
        }
    }
}
