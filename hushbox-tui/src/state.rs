use hushbox_core::{Config, EngineResponse, TimerPhase};

use crate::states::{AudioState, CatalogState, SettingsState, TimerView};

/// Whether keys go to navigation or to a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a custom track URL
    Editing,
}

/// Application state for the TUI
pub struct AppState {
    pub audio: AudioState,
    pub catalog: CatalogState,
    pub timer: TimerView,
    pub settings: SettingsState,
    pub input_mode: InputMode,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            audio: AudioState::new(
                config.catalog.default_sound().clone(),
                config.player.volume,
                config.player.layout,
            ),
            catalog: CatalogState::new(&config.catalog),
            timer: TimerView::new(config.timer.fade_out),
            settings: SettingsState::new(),
            input_mode: InputMode::Normal,
        }
    }

    /// Handle response from the engine
    pub fn handle_response(&mut self, response: EngineResponse) {
        match response {
            EngineResponse::Ready => {
                self.audio.ready = true;
                self.audio.status_message = "Player ready".to_string();
            }
            EngineResponse::Playing => {
                self.audio.is_playing = true;
                self.audio.error_message = None;
                self.audio.status_message = "Playing".to_string();
            }
            EngineResponse::Paused => {
                self.audio.is_playing = false;
                self.audio.status_message = "Paused".to_string();
            }
            EngineResponse::Finished => {
                self.audio.is_playing = false;
                self.audio.position_ms = 0;
                self.audio.status_message = "Finished".to_string();
            }
            EngineResponse::Progress {
                position_ms,
                duration_ms,
            } => {
                self.audio.position_ms = position_ms;
                self.audio.duration_ms = duration_ms;
            }
            EngineResponse::TrackChanged(sound) => {
                if sound.locator != self.audio.current.locator {
                    self.audio.position_ms = 0;
                    self.audio.duration_ms = 0;
                }
                self.audio.current = sound;
            }
            EngineResponse::Loading(locator) => {
                if locator.is_some() {
                    self.audio.status_message = "Loading...".to_string();
                }
                self.audio.loading = locator;
            }
            EngineResponse::TimerRemaining(remaining) => {
                self.timer.remaining_ms = remaining;
                if remaining.is_none() {
                    self.timer.elapsed = false;
                }
            }
            EngineResponse::TimerPhaseChanged(phase) => {
                self.timer.phase = phase;
                if phase == TimerPhase::Fading {
                    self.audio.status_message = "Fading out...".to_string();
                }
            }
            EngineResponse::TimerElapsed => {
                self.timer.elapsed = true;
                self.audio.status_message = "Sleep timer finished".to_string();
            }
            EngineResponse::VolumeChanged(volume) => self.audio.volume = volume,
            EngineResponse::LayoutChanged(layout) => {
                self.audio.layout = layout;
                self.audio.ready = false;
                self.audio.status_message = format!("Switched to {} player", layout);
            }
            EngineResponse::FadeOutChanged(fade_out) => self.timer.fade_out = fade_out,
            EngineResponse::Rejected(message) => {
                self.audio.status_message = format!("Error: {}", message);
                self.audio.error_message = Some(message);
            }
            EngineResponse::Shutdown => {
                self.audio.status_message = "Engine shutdown".to_string();
            }
        }
    }

    pub fn is_editing(&self) -> bool {
        self.input_mode == InputMode::Editing
    }
}
