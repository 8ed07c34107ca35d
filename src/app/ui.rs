use crate::engine::view::{self, level_tone};
use crate::engine::{ExecutionStatus, ScenarioState, StepStatus};
use eframe::egui::{self, RichText};

use super::state::{AppTab, FluxApp};
use super::widgets::{ButtonTone, PrimaryButton, StepCard, level_badge, solid_section_header};

mod layout;
mod modal;
mod panels;
mod settings;
mod status;
mod toolbar;
