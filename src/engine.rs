mod controller;
pub mod events;
mod sse;
mod state;
mod stream;
pub mod view;

pub use controller::ScenarioController;
pub use events::StreamEvent;
pub use sse::SseDecoder;
pub use state::{ANALYSIS_STEPS, ExecutionStatus, ScenarioState, StepStatus};
pub use stream::{StepEventStream, StreamFeed, translate};
