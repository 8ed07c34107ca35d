use crate::engine::view::LevelTone;
use crate::engine::{ExecutionStatus, StepStatus};
use eframe::egui::{self, Color32};

include!(concat!(env!("OUT_DIR"), "/custom_font.rs"));

/// 화면 전체에서 공유하는 색상 표이다.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg_main: Color32,
    pub bg_panel: Color32,
    pub bg_sidebar: Color32,
    pub bg_toolbar: Color32,
    /// 대화 기록 배경.
    pub bg_log: Color32,
    /// 사용자 말풍선 배경.
    pub bg_user_bubble: Color32,
    pub border_soft: Color32,
    pub fg_text_primary: Color32,
    pub fg_text_secondary: Color32,
    pub accent_primary: Color32,
    pub accent_success: Color32,
    pub accent_warning: Color32,
    pub accent_error: Color32,
}

/// 모서리, 여백, 버튼 크기 같은 장식 값이다.
#[derive(Debug, Clone, Copy)]
pub struct Decorations {
    pub container_rounding: f32,
    pub toolbar_rounding: f32,
    pub card_rounding: f32,
    pub card_inner_margin: egui::Margin,
    pub button_gap: f32,
    pub button_height: f32,
    pub button_min_width: f32,
    pub button_rounding: f32,
    pub header_height: f32,
    pub header_rounding: f32,
    pub header_fill: Color32,
    pub header_text: Color32,
    pub header_icon_size: f32,
}

/// UI 전체에서 참조할 공통 테마 정보.
#[derive(Debug, Clone)]
pub struct Theme {
    palette: Palette,
    decorations: Decorations,
}

impl Default for Theme {
    /// 어두운 보안 관제 화면용 기본값이다.
    fn default() -> Self {
        let palette = Palette {
            bg_main: Color32::from_rgb(18, 20, 26),
            bg_panel: Color32::from_rgb(28, 31, 40),
            bg_sidebar: Color32::from_rgb(22, 25, 32),
            bg_toolbar: Color32::from_rgb(24, 27, 35),
            bg_log: Color32::from_rgb(20, 22, 29),
            bg_user_bubble: Color32::from_rgb(37, 58, 96),
            border_soft: Color32::from_rgb(52, 57, 70),
            fg_text_primary: Color32::from_rgb(230, 233, 240),
            fg_text_secondary: Color32::from_rgb(150, 157, 172),
            accent_primary: Color32::from_rgb(64, 132, 246),
            accent_success: Color32::from_rgb(60, 180, 120),
            accent_warning: Color32::from_rgb(232, 170, 60),
            accent_error: Color32::from_rgb(220, 80, 80),
        };
        let decorations = Decorations {
            container_rounding: 8.0,
            toolbar_rounding: 10.0,
            card_rounding: 8.0,
            card_inner_margin: egui::Margin::same(14.0),
            button_gap: 10.0,
            button_height: 34.0,
            button_min_width: 96.0,
            button_rounding: 6.0,
            header_height: 38.0,
            header_rounding: 6.0,
            header_fill: Color32::from_rgb(36, 48, 72),
            header_text: Color32::from_rgb(225, 232, 245),
            header_icon_size: 18.0,
        };
        Self {
            palette,
            decorations,
        }
    }
}

impl Theme {
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// egui Context에 테마 기반 스타일을 적용한다.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.window_rounding = egui::Rounding::same(self.decorations.container_rounding);
        visuals.window_fill = self.palette.bg_panel;
        visuals.panel_fill = self.palette.bg_main;
        visuals.widgets.inactive.bg_fill = self.palette.bg_sidebar;
        visuals.selection.bg_fill = self.palette.accent_primary;
        ctx.set_visuals(visuals);
    }

    /// 분석 단계 상태에 대응하는 색상을 반환한다.
    pub fn step_color(&self, status: StepStatus) -> Color32 {
        match status {
            StepStatus::Idle => self.palette.fg_text_secondary,
            StepStatus::Loading => self.palette.accent_primary,
            StepStatus::Completed => self.palette.accent_success,
            StepStatus::Error => self.palette.accent_error,
        }
    }

    pub fn execution_color(&self, status: ExecutionStatus) -> Color32 {
        match status {
            ExecutionStatus::Idle => self.palette.fg_text_secondary,
            ExecutionStatus::Executing => self.palette.accent_primary,
            ExecutionStatus::Success => self.palette.accent_success,
            ExecutionStatus::PartialSuccess => self.palette.accent_warning,
            ExecutionStatus::Error => self.palette.accent_error,
        }
    }

    /// 위험도·위협 등급 배지 색상이다.
    pub fn tone_color(&self, tone: LevelTone) -> Color32 {
        match tone {
            LevelTone::Neutral => self.palette.fg_text_secondary,
            LevelTone::Warning => self.palette.accent_warning,
            LevelTone::Danger => self.palette.accent_error,
        }
    }
}

/// 두 색을 `t` 비율(0.0~1.0)로 섞는다.
pub fn blend_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(from.r(), to.r()),
        mix(from.g(), to.g()),
        mix(from.b(), to.b()),
        mix(from.a(), to.a()),
    )
}

/// build.rs에서 찾은 CJK 폰트를 egui에 등록한다.
pub fn install_custom_font(ctx: &egui::Context) {
    if let Some(bytes) = embedded_font_bytes() {
        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("custom".into(), egui::FontData::from_static(bytes));
        fonts
            .families
            .entry(egui::FontFamily::Proportional)
            .or_default()
            .insert(0, "custom".into());
        fonts
            .families
            .entry(egui::FontFamily::Monospace)
            .or_default()
            .push("custom".into());
        ctx.set_fonts(fonts);
    }
}
