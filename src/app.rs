mod state;
mod ui;
mod widgets;

pub use state::FluxApp;
