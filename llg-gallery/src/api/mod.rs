//! HTTP API handlers for llg-gallery

pub mod health;
pub mod loras;
pub mod presets;
pub mod preview;
pub mod sync;
pub mod training;
pub mod ui_state;

pub use health::health_routes;
pub use loras::lora_routes;
pub use presets::preset_routes;
pub use preview::preview_routes;
pub use sync::sync_routes;
pub use training::training_routes;
pub use ui_state::ui_state_routes;
