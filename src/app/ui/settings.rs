use super::*;
use crate::config::{PROVIDERS, provider_preset};

impl FluxApp {
    /// 설정 탭 본문을 그린다.
    pub(super) fn render_settings(&mut self, ui: &mut egui::Ui) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        let mut save = false;
        let mut revert = false;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.set_max_width(720.0);
                solid_section_header(ui, &self.theme, "🤖", "LLM 제공자");
                ui.add_space(10.0);
                let draft = &mut self.settings_draft;
                let current = draft.llm.provider.clone();
                ui.horizontal_wrapped(|ui| {
                    for preset in PROVIDERS {
                        let label = format!("{} {} · {}", preset.icon, preset.label, preset.model);
                        if ui.selectable_label(current == preset.value, label).clicked() {
                            draft.llm.switch_provider(preset.value);
                        }
                    }
                });
                ui.add_space(8.0);
                egui::Grid::new("llm_settings_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("API 키");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.llm.api_key)
                                .password(true)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                        ui.label("API 주소");
                        let hint = provider_preset(&draft.llm.provider)
                            .and_then(|preset| preset.default_base_url)
                            .unwrap_or("https://");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.llm.base_url)
                                .hint_text(hint)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(16.0);
                solid_section_header(ui, &self.theme, "🔐", "Flux 연동");
                ui.add_space(10.0);
                egui::Grid::new("flux_settings_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("인증 코드");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.auth_code)
                                .password(true)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                        ui.label("Flux 주소");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.flux_base_url)
                                .hint_text("https://flux.example.com")
                                .desired_width(420.0),
                        );
                        ui.end_row();
                        ui.label("백엔드 주소");
                        ui.add(
                            egui::TextEdit::singleline(&mut draft.api_url)
                                .hint_text(crate::config::DEFAULT_API_URL)
                                .desired_width(420.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(16.0);
                ui.label(
                    RichText::new(format!("저장 위치 · {}", self.config_path.display()))
                        .color(palette.fg_text_secondary),
                );
                if let Some((ok, message)) = &self.settings_status {
                    let color = if *ok {
                        palette.accent_success
                    } else {
                        palette.accent_error
                    };
                    ui.label(RichText::new(message).color(color).strong());
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = decorations.button_gap;
                    if ui
                        .add(PrimaryButton::new(&self.theme, "저장").icon("💾"))
                        .clicked()
                    {
                        save = true;
                    }
                    if ui
                        .add(
                            PrimaryButton::new(&self.theme, "되돌리기")
                                .icon("↩")
                                .tone(ButtonTone::Quiet),
                        )
                        .clicked()
                    {
                        revert = true;
                    }
                });
            });

        if save {
            self.save_settings();
        } else if revert {
            self.revert_settings();
        }
    }
}
