//! In-process stand-in for the embeddable player.
//!
//! Behaves like the remote widget as far as the adapter can tell: readiness is
//! signalled after binding, transport calls raise play/pause events, progress
//! is reported every 500 ms while playing, and every call is journalled.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;

use crate::widget::{LayoutMode, LoadOptions, NativeEvent, PlayerRuntime, RemotePlayer, SurfaceId};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_TRACK_DURATION_MS: u64 = 75 * 60 * 1000;

/// A call made on a simulated instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Bind,
    Unbind,
    Load(String),
    Play,
    Pause,
    Toggle,
    SetVolume(u8),
    GetVolume,
    GetDuration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCall {
    pub surface: SurfaceId,
    pub action: PlayerAction,
}

#[derive(Debug, Default)]
struct InstanceState {
    volume: u8,
    playing: bool,
    position_ms: u64,
    loaded: Option<String>,
}

#[derive(Debug, Default)]
struct Shared {
    journal: Vec<PlayerCall>,
    instances: HashMap<SurfaceId, InstanceState>,
}

pub struct SimulatedRuntime {
    surfaces: Vec<SurfaceId>,
    shared: Arc<Mutex<Shared>>,
    track_duration_ms: u64,
    initial_volume: u8,
    preloaded: Option<String>,
    auto_ready: bool,
    read_latency: Duration,
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new([
            LayoutMode::Attached.surface_id(),
            LayoutMode::Floating.surface_id(),
        ])
    }
}

impl SimulatedRuntime {
    pub fn new(surfaces: impl IntoIterator<Item = SurfaceId>) -> Self {
        Self {
            surfaces: surfaces.into_iter().collect(),
            shared: Arc::new(Mutex::new(Shared::default())),
            track_duration_ms: DEFAULT_TRACK_DURATION_MS,
            initial_volume: 100,
            preloaded: None,
            auto_ready: true,
            read_latency: Duration::ZERO,
        }
    }

    pub fn with_track_duration(mut self, duration_ms: u64) -> Self {
        self.track_duration_ms = duration_ms;
        self
    }

    pub fn with_initial_volume(mut self, volume: u8) -> Self {
        self.initial_volume = volume.min(100);
        self
    }

    /// Every new instance starts with `locator` cued, like an embed URL
    pub fn with_preloaded(mut self, locator: impl Into<String>) -> Self {
        self.preloaded = Some(locator.into());
        self
    }

    /// Volume and duration reads answer after `latency` instead of at once
    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = latency;
        self
    }

    /// Instances never signal readiness
    pub fn without_auto_ready(mut self) -> Self {
        self.auto_ready = false;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        lock_shared(&self.shared)
    }

    pub fn journal(&self) -> Vec<PlayerCall> {
        self.lock().journal.clone()
    }

    pub fn actions_on(&self, surface: &SurfaceId) -> Vec<PlayerAction> {
        self.lock()
            .journal
            .iter()
            .filter(|call| &call.surface == surface)
            .map(|call| call.action.clone())
            .collect()
    }

    pub fn volume(&self, surface: &SurfaceId) -> Option<u8> {
        self.lock().instances.get(surface).map(|i| i.volume)
    }

    pub fn is_playing(&self, surface: &SurfaceId) -> bool {
        self.lock().instances.get(surface).is_some_and(|i| i.playing)
    }

    pub fn loaded(&self, surface: &SurfaceId) -> Option<String> {
        self.lock().instances.get(surface).and_then(|i| i.loaded.clone())
    }
}

impl PlayerRuntime for SimulatedRuntime {
    fn attach(&self, surface: &SurfaceId) -> Option<Box<dyn RemotePlayer>> {
        if !self.surfaces.contains(surface) {
            return None;
        }
        self.lock().instances.insert(
            surface.clone(),
            InstanceState {
                volume: self.initial_volume,
                loaded: self.preloaded.clone(),
                ..InstanceState::default()
            },
        );
        Some(Box::new(SimulatedPlayer {
            surface: surface.clone(),
            shared: Arc::clone(&self.shared),
            events: None,
            progress: None,
            track_duration_ms: self.track_duration_ms,
            auto_ready: self.auto_ready,
            read_latency: self.read_latency,
        }))
    }
}

fn lock_shared(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A panicking test thread must not hide the journal from the others.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct SimulatedPlayer {
    surface: SurfaceId,
    shared: Arc<Mutex<Shared>>,
    events: Option<mpsc::UnboundedSender<NativeEvent>>,
    progress: Option<AbortHandle>,
    track_duration_ms: u64,
    auto_ready: bool,
    read_latency: Duration,
}

impl SimulatedPlayer {
    fn record(&self, action: PlayerAction) {
        lock_shared(&self.shared).journal.push(PlayerCall {
            surface: self.surface.clone(),
            action,
        });
    }

    fn with_instance<R>(&self, f: impl FnOnce(&mut InstanceState) -> R) -> Option<R> {
        lock_shared(&self.shared).instances.get_mut(&self.surface).map(f)
    }

    fn emit(&self, event: NativeEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn reply<T: Send + 'static>(&self, value: Option<T>) -> oneshot::Receiver<T> {
        let (tx, rx) = oneshot::channel();
        let Some(value) = value else {
            return rx;
        };
        if self.read_latency.is_zero() {
            let _ = tx.send(value);
        } else {
            let latency = self.read_latency;
            tokio::spawn(async move {
                tokio::time::sleep(latency).await;
                let _ = tx.send(value);
            });
        }
        rx
    }

    fn start(&mut self) {
        let started = self.with_instance(|i| {
            let was_playing = i.playing;
            i.playing = i.loaded.is_some();
            !was_playing && i.playing
        });
        if started != Some(true) {
            return;
        }
        self.emit(NativeEvent::Play);

        let Some(events) = self.events.clone() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        let surface = self.surface.clone();
        let duration_ms = self.track_duration_ms;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + PROGRESS_INTERVAL,
                PROGRESS_INTERVAL,
            );
            loop {
                ticker.tick().await;
                let position = {
                    let mut shared = lock_shared(&shared);
                    let Some(instance) = shared.instances.get_mut(&surface) else {
                        break;
                    };
                    instance.position_ms += PROGRESS_INTERVAL.as_millis() as u64;
                    if instance.position_ms >= duration_ms {
                        instance.playing = false;
                        instance.position_ms = 0;
                        None
                    } else {
                        Some(instance.position_ms)
                    }
                };
                let event = match position {
                    Some(position_ms) => NativeEvent::PlayProgress { position_ms },
                    None => NativeEvent::Finish,
                };
                if events.send(event).is_err() || event == NativeEvent::Finish {
                    break;
                }
            }
        });
        self.stop_progress();
        self.progress = Some(task.abort_handle());
    }

    fn stop(&mut self) {
        self.stop_progress();
        let stopped = self.with_instance(|i| std::mem::replace(&mut i.playing, false));
        if stopped == Some(true) {
            self.emit(NativeEvent::Pause);
        }
    }

    fn stop_progress(&mut self) {
        if let Some(task) = self.progress.take() {
            task.abort();
        }
    }
}

impl RemotePlayer for SimulatedPlayer {
    fn load(&mut self, locator: &str, options: LoadOptions) {
        self.record(PlayerAction::Load(locator.to_string()));
        self.stop();
        self.with_instance(|i| {
            i.loaded = Some(locator.to_string());
            i.position_ms = 0;
        });
        if options.auto_play {
            self.start();
        }
    }

    fn play(&mut self) {
        self.record(PlayerAction::Play);
        self.start();
    }

    fn pause(&mut self) {
        self.record(PlayerAction::Pause);
        self.stop();
    }

    fn toggle(&mut self) {
        self.record(PlayerAction::Toggle);
        if self.with_instance(|i| i.playing).unwrap_or(false) {
            self.stop();
        } else {
            self.start();
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.record(PlayerAction::SetVolume(volume));
        self.with_instance(|i| i.volume = volume.min(100));
    }

    fn get_volume(&self) -> oneshot::Receiver<u8> {
        self.record(PlayerAction::GetVolume);
        self.reply(self.with_instance(|i| i.volume))
    }

    fn get_duration(&self) -> oneshot::Receiver<u64> {
        self.record(PlayerAction::GetDuration);
        let loaded = self.with_instance(|i| i.loaded.is_some()).unwrap_or(false);
        self.reply(Some(if loaded { self.track_duration_ms } else { 0 }))
    }

    fn bind(&mut self, events: mpsc::UnboundedSender<NativeEvent>) {
        self.record(PlayerAction::Bind);
        if self.auto_ready {
            let _ = events.send(NativeEvent::Ready);
        }
        self.events = Some(events);
    }

    fn unbind(&mut self) {
        self.record(PlayerAction::Unbind);
        self.stop_progress();
        self.with_instance(|i| i.playing = false);
        self.events = None;
    }
}

impl Drop for SimulatedPlayer {
    fn drop(&mut self) {
        self.stop_progress();
    }
}
