pub mod audio;
pub mod catalog;
pub mod settings;
pub mod timer;

pub use audio::AudioState;
pub use catalog::{CatalogRow, CatalogState};
pub use settings::{SettingsOption, SettingsState};
pub use timer::{TimerPreset, TimerView};
