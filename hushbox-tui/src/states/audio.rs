use hushbox_core::{LayoutMode, Sound};

/// Playback state mirrored from engine responses
#[derive(Debug, Clone)]
pub struct AudioState {
    /// Whether the bound player instance has signalled readiness
    pub ready: bool,
    pub is_playing: bool,
    /// Locator of the sound being loaded
    pub loading: Option<String>,
    pub position_ms: u64,
    pub duration_ms: u64,
    /// Host volume, 0 to 100
    pub volume: u8,
    pub layout: LayoutMode,
    pub current: Sound,
    /// Status message to display
    pub status_message: String,
    /// Error message if any
    pub error_message: Option<String>,
}

impl AudioState {
    pub fn new(current: Sound, volume: u8, layout: LayoutMode) -> Self {
        Self {
            ready: false,
            is_playing: false,
            loading: None,
            position_ms: 0,
            duration_ms: 0,
            volume,
            layout,
            current,
            status_message: "Waiting for the player...".to_string(),
            error_message: None,
        }
    }

    pub fn volume_up(&self) -> u8 {
        self.volume.saturating_add(5).min(100)
    }

    pub fn volume_down(&self) -> u8 {
        self.volume.saturating_sub(5)
    }

    /// Get the progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration_ms > 0 {
            (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Format milliseconds as MM:SS, or H:MM:SS past the hour
    pub fn format_time(ms: u64) -> String {
        let total = ms / 1000;
        let (hours, mins, secs) = (total / 3600, (total / 60) % 60, total % 60);
        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, mins, secs)
        } else {
            format!("{:02}:{:02}", mins, secs)
        }
    }
}
