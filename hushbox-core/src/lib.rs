pub mod catalog;
pub mod commands;
pub mod config;
pub mod engine;
pub mod metadata;
pub mod sim;
pub mod slot;
pub mod timer;
pub mod track;
pub mod widget;

pub use catalog::{Catalog, Category, Sound};
pub use commands::{EngineCommand, EngineResponse, EngineSnapshot};
pub use config::Config;
pub use engine::{Engine, EngineHandle};
pub use timer::{FadeOut, TimerPhase};
pub use widget::{LayoutMode, SurfaceId};
