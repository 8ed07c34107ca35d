use crate::theme::{Theme, blend_color};
use eframe::egui::{self, RichText, Widget};

/// 버튼 강조 종류이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ButtonTone {
    Primary,
    Quiet,
    Danger,
}

/// 테마 색상과 일정한 높이를 가진 기본 버튼 위젯.
pub(super) struct PrimaryButton<'a> {
    theme: &'a Theme,
    label: &'a str,
    icon: &'a str,
    tone: ButtonTone,
}

impl<'a> PrimaryButton<'a> {
    pub(super) fn new(theme: &'a Theme, label: &'a str) -> Self {
        Self {
            theme,
            label,
            icon: "",
            tone: ButtonTone::Primary,
        }
    }

    pub(super) fn icon(mut self, icon: &'a str) -> Self {
        self.icon = icon;
        self
    }

    pub(super) fn tone(mut self, tone: ButtonTone) -> Self {
        self.tone = tone;
        self
    }
}

impl Widget for PrimaryButton<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let decorations = self.theme.decorations();
        let palette = self.theme.palette();
        let enabled = ui.is_enabled();

        let text = if self.icon.is_empty() {
            self.label.to_string()
        } else {
            format!("{}  {}", self.icon, self.label)
        };
        let font_size = 15.0;
        let text_color = match (enabled, self.tone) {
            (false, _) => blend_color(palette.fg_text_secondary, palette.bg_panel, 0.4),
            (true, ButtonTone::Quiet) => palette.fg_text_primary,
            (true, _) => egui::Color32::WHITE,
        };
        let rich = RichText::new(text).size(font_size).strong().color(text_color);

        let text_height = ui.ctx().fonts(|f| {
            f.row_height(&egui::FontId::new(font_size, egui::FontFamily::Proportional))
        });
        let button_height = decorations.button_height.max(text_height + 6.0);

        let base = match self.tone {
            ButtonTone::Primary => palette.accent_primary,
            ButtonTone::Quiet => palette.bg_sidebar,
            ButtonTone::Danger => palette.accent_error,
        };
        let fill = if enabled {
            base
        } else {
            blend_color(base, palette.border_soft, 0.5)
        };
        let button = egui::Button::new(rich)
            .min_size(egui::vec2(decorations.button_min_width, button_height))
            .rounding(egui::Rounding::same(decorations.button_rounding))
            .stroke(egui::Stroke::new(1.0, blend_color(fill, palette.border_soft, 0.6)))
            .fill(fill);

        let response = ui.add(button);
        if enabled && response.hovered() {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
        }
        response
    }
}

/// 분석 단계 하나를 번호, 제목, 상태로 보여주는 카드.
pub(super) struct StepCard<'a> {
    theme: &'a Theme,
    index: usize,
    title: &'a str,
    status_icon: &'a str,
    status_text: &'a str,
    status_color: egui::Color32,
    highlighted: bool,
}

impl<'a> StepCard<'a> {
    pub(super) fn new(theme: &'a Theme, index: usize, title: &'a str) -> Self {
        Self {
            theme,
            index,
            title,
            status_icon: "",
            status_text: "",
            status_color: theme.palette().fg_text_secondary,
            highlighted: false,
        }
    }

    pub(super) fn status(mut self, icon: &'a str, text: &'a str, color: egui::Color32) -> Self {
        self.status_icon = icon;
        self.status_text = text;
        self.status_color = color;
        self
    }

    /// 현재 진행 위치로 강조한다.
    pub(super) fn highlighted(mut self, highlighted: bool) -> Self {
        self.highlighted = highlighted;
        self
    }
}

impl Widget for StepCard<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let palette = self.theme.palette();
        let decorations = self.theme.decorations();
        let stroke_color = if self.highlighted {
            self.status_color
        } else {
            palette.border_soft
        };
        egui::Frame::none()
            .fill(palette.bg_panel)
            .stroke(egui::Stroke::new(1.0, stroke_color))
            .rounding(egui::Rounding::same(decorations.card_rounding))
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("{}", self.index))
                            .size(16.0)
                            .color(self.status_color)
                            .strong(),
                    );
                    ui.add_space(6.0);
                    ui.label(
                        RichText::new(self.title)
                            .size(15.0)
                            .color(palette.fg_text_primary)
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("{} {}", self.status_icon, self.status_text))
                                .color(self.status_color),
                        );
                    });
                });
            })
            .response
    }
}

/// 단색 헤더를 그려 정보 영역의 시각적 위계를 만든다.
pub(super) fn solid_section_header(ui: &mut egui::Ui, theme: &Theme, icon: &str, title: &str) {
    let decorations = theme.decorations();
    let palette = theme.palette();
    let size = egui::vec2(ui.available_width(), decorations.header_height);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let rounding = egui::Rounding::same(decorations.header_rounding);
    ui.painter().rect_filled(rect, rounding, decorations.header_fill);
    ui.painter().rect_stroke(
        rect,
        rounding,
        egui::Stroke::new(1.0, blend_color(decorations.header_fill, palette.bg_panel, 0.4)),
    );
    let content_rect = rect.shrink2(egui::vec2(14.0, 0.0));
    ui.allocate_ui_at_rect(content_rect, |ui| {
        ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
            if !icon.is_empty() {
                ui.label(
                    RichText::new(icon)
                        .size(decorations.header_icon_size)
                        .color(decorations.header_text),
                );
                ui.add_space(6.0);
            }
            ui.label(
                RichText::new(title)
                    .size(16.0)
                    .color(decorations.header_text)
                    .strong(),
            );
        });
    });
}

/// 등급 숫자를 색이 입혀진 라벨로 표시한다.
pub(super) fn level_badge(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::none()
        .fill(blend_color(color, egui::Color32::BLACK, 0.65))
        .stroke(egui::Stroke::new(1.0, color))
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(egui::Margin::symmetric(6.0, 1.0))
        .show(ui, |ui| {
            ui.label(RichText::new(text).size(12.0).color(color).strong());
        });
}
