use super::*;
use crate::config::provider_preset;

impl FluxApp {
    /// 대화 탭 상단 툴바를 그린다.
    pub(super) fn render_chat_toolbar(&mut self, ui: &mut egui::Ui) {
        let decorations = *self.theme.decorations();
        let palette = *self.theme.palette();
        ui.vertical(|ui| {
            ui.label(
                RichText::new("🛡️ Flux 보안 운영 도우미")
                    .size(20.0)
                    .color(palette.fg_text_primary)
                    .strong(),
            );
            match self.config.llm() {
                Ok(llm) => {
                    let label = provider_preset(&llm.provider)
                        .map(|preset| format!("{} {} · {}", preset.icon, preset.label, preset.model))
                        .unwrap_or_else(|| llm.provider.clone());
                    ui.label(RichText::new(format!("연결됨 · {label}")).color(palette.fg_text_secondary));
                }
                Err(err) => {
                    ui.label(RichText::new(err.to_string()).color(palette.accent_warning));
                }
            }
            if let Some(err) = &self.last_error {
                ui.label(RichText::new(err).color(palette.accent_error).strong());
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = decorations.button_gap;
                let idle = !self.chat_pending() && !self.controller.state().is_open;
                if ui
                    .add_enabled(idle, PrimaryButton::new(&self.theme, "새 대화").icon("🆕"))
                    .clicked()
                {
                    self.new_conversation();
                }
                if ui
                    .add(
                        PrimaryButton::new(&self.theme, "설정")
                            .icon("⚙")
                            .tone(ButtonTone::Quiet),
                    )
                    .clicked()
                {
                    self.active_tab = AppTab::Settings;
                }
            });
        });
    }
}
