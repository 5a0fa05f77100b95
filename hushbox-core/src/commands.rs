use tokio::sync::oneshot;

use crate::catalog::Sound;
use crate::timer::{FadeOut, FadeState, TimerPhase, TimerState};
use crate::widget::{LayoutMode, SurfaceId};

/// Commands sent from the host to the engine
#[derive(Debug)]
pub enum EngineCommand {
    /// Load a different sound, or toggle the current one
    SelectSound(Sound),
    /// Validate and load a user supplied track URL
    AddCustomTrack(String),
    Play,
    Pause,
    Toggle,
    /// Volume 0 to 100
    SetVolume(u8),
    /// Switch surfaces; resets playback
    SetLayout(LayoutMode),
    SetFadeOut(FadeOut),
    /// Start a sleep timer; 0 clears it
    SetTimer(u32),
    ToggleTimerPause,
    RestartTimer,
    ClearTimer,
    /// Ask for a full state snapshot
    Snapshot(oneshot::Sender<EngineSnapshot>),
    /// Shutdown the engine
    Quit,
}

/// Responses sent from the engine to the host
#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    /// The bound player instance is ready
    Ready,
    Playing,
    Paused,
    /// Track played to its end
    Finished,
    Progress { position_ms: u64, duration_ms: u64 },
    TrackChanged(Sound),
    /// Locator of the sound being loaded, `None` once it plays
    Loading(Option<String>),
    /// `None` when no timer is set
    TimerRemaining(Option<u64>),
    TimerPhaseChanged(TimerPhase),
    /// The timer has paused playback
    TimerElapsed,
    VolumeChanged(u8),
    LayoutChanged(LayoutMode),
    FadeOutChanged(FadeOut),
    /// User-facing validation message
    Rejected(String),
    /// Engine is shutting down
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub ready: bool,
    pub surface: Option<SurfaceId>,
    pub layout: LayoutMode,
    pub current: Sound,
    pub playing: bool,
    pub loading: Option<String>,
    pub volume: u8,
    pub timer: TimerState,
    pub phase: TimerPhase,
    pub fade: Option<FadeState>,
}
