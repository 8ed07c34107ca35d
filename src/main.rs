#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod backend;
mod config;
mod engine;
mod error;
mod scenario;
mod theme;
mod transcript;

use app::FluxApp;
use backend::{HttpBackend, SharedBackend};
use eframe::egui;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// 로깅과 런타임, 설정을 준비하고 egui 애플리케이션을 실행하는 진입점이다.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("flux-worker")
        .build()?;
    let backend: SharedBackend = Arc::new(HttpBackend::new(runtime.handle().clone())?);

    let config_path = config::default_config_path();
    let (config, load_error) = match config::load_config(&config_path) {
        Ok(config) => (config, None),
        Err(err) => {
            warn!(path = %config_path.display(), error = %err, "설정 파일을 읽지 못해 기본값을 사용합니다");
            (config::FluxConfig::default(), Some(err.to_string()))
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_app_id("flux-cockpit")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([880.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Flux Cockpit",
        native_options,
        Box::new(move |cc| {
            Box::new(FluxApp::new(
                cc,
                runtime,
                backend,
                config_path,
                config,
                load_error,
            ))
        }),
    )
    .map_err(|err| anyhow::anyhow!("애플리케이션 실행 실패: {err}"))
}
