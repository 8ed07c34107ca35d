use super::*;

impl FluxApp {
    /// 탭 선택 바를 렌더링한다.
    fn render_tab_selector(&mut self, ctx: &egui::Context) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        let frame = egui::Frame {
            fill: palette.bg_panel,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.container_rounding),
            inner_margin: egui::Margin::symmetric(12.0, 8.0),
            ..Default::default()
        };
        egui::TopBottomPanel::top("tab_selector")
            .frame(frame)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing.x = 10.0;
                    let tabs = [(AppTab::Chat, "💬 대화"), (AppTab::Settings, "⚙ 설정")];
                    for (tab, label) in tabs {
                        let selected = self.active_tab == tab;
                        if ui.selectable_label(selected, label).clicked() {
                            self.active_tab = tab;
                        }
                    }
                });
            });
    }

    /// 대화 탭 전체 레이아웃을 렌더링한다.
    fn render_chat_view(&mut self, ctx: &egui::Context) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        let toolbar_frame = egui::Frame {
            fill: palette.bg_toolbar,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.toolbar_rounding),
            inner_margin: decorations.card_inner_margin,
            ..Default::default()
        };
        egui::TopBottomPanel::top("chat_toolbar")
            .frame(toolbar_frame)
            .resizable(false)
            .show(ctx, |ui| {
                self.render_chat_toolbar(ui);
            });
        let sidebar_frame = egui::Frame {
            fill: palette.bg_sidebar,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.container_rounding),
            inner_margin: decorations.card_inner_margin,
            ..Default::default()
        };
        egui::SidePanel::left("scenarios")
            .resizable(false)
            .default_width(300.0)
            .frame(sidebar_frame)
            .show(ctx, |ui| {
                self.render_scenario_panel(ui);
            });
        let input_frame = egui::Frame {
            fill: palette.bg_panel,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.card_rounding),
            inner_margin: egui::Margin::symmetric(16.0, 12.0),
            ..Default::default()
        };
        egui::TopBottomPanel::bottom("chat_input")
            .frame(input_frame)
            .show(ctx, |ui| {
                self.render_input(ui);
            });
        let central_frame = egui::Frame {
            fill: palette.bg_log,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.container_rounding),
            inner_margin: decorations.card_inner_margin,
            ..Default::default()
        };
        egui::CentralPanel::default()
            .frame(central_frame)
            .show(ctx, |ui| {
                self.render_transcript(ui);
            });
    }

    /// 설정 탭 전체 레이아웃을 렌더링한다.
    fn render_settings_view(&mut self, ctx: &egui::Context) {
        let palette = *self.theme.palette();
        let decorations = *self.theme.decorations();
        let frame = egui::Frame {
            fill: palette.bg_main,
            stroke: egui::Stroke::new(1.0, palette.border_soft),
            rounding: egui::Rounding::same(decorations.container_rounding),
            inner_margin: decorations.card_inner_margin,
            ..Default::default()
        };
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.render_settings(ui);
        });
    }
}

impl eframe::App for FluxApp {
    /// egui 메인 루프에서 호출되어 UI를 갱신한다.
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        self.drain_events();
        self.render_tab_selector(ctx);
        match self.active_tab {
            AppTab::Chat => self.render_chat_view(ctx),
            AppTab::Settings => self.render_settings_view(ctx),
        }
        self.render_scenario_dialog(ctx);
        self.schedule_repaint(ctx);
    }
}
