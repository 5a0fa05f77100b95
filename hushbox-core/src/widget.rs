use std::fmt::{self, Display};
use std::sync::Arc;

use strum::{EnumIter, EnumString};
use tokio::sync::{mpsc, oneshot};

use crate::slot::TaskSlot;

/// Identifier of the embedding point a player instance is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host layout mode. Each mode owns exactly one playback surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum LayoutMode {
    #[default]
    Attached,
    Floating,
}

impl LayoutMode {
    pub fn surface_id(self) -> SurfaceId {
        match self {
            LayoutMode::Attached => SurfaceId::new("widget-attached"),
            LayoutMode::Floating => SurfaceId::new("widget-floating"),
        }
    }

    pub fn toggled(self) -> LayoutMode {
        match self {
            LayoutMode::Attached => LayoutMode::Floating,
            LayoutMode::Floating => LayoutMode::Attached,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub auto_play: bool,
    pub show_artwork: bool,
}

impl LoadOptions {
    pub fn autoplay() -> Self {
        Self {
            auto_play: true,
            show_artwork: true,
        }
    }
}

/// Events raised by a remote player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeEvent {
    Ready,
    Play,
    Pause,
    Finish,
    PlayProgress { position_ms: u64 },
}

/// Remote-control surface of one embedded player instance.
///
/// Requests are fire-and-forget. Reads answer through a oneshot channel at
/// some later point, or never if the instance goes away.
pub trait RemotePlayer: Send {
    fn load(&mut self, locator: &str, options: LoadOptions);
    fn play(&mut self);
    fn pause(&mut self);
    fn toggle(&mut self);
    fn set_volume(&mut self, volume: u8);
    fn get_volume(&self) -> oneshot::Receiver<u8>;
    fn get_duration(&self) -> oneshot::Receiver<u64>;
    /// Route every native event of this instance into `events`.
    fn bind(&mut self, events: mpsc::UnboundedSender<NativeEvent>);
    /// Drop all event subscriptions.
    fn unbind(&mut self);
}

/// The player runtime that creates instances on surfaces
pub trait PlayerRuntime: Send + Sync {
    /// `None` when the surface does not exist
    fn attach(&self, surface: &SurfaceId) -> Option<Box<dyn RemotePlayer>>;
}

/// Messages flowing from bound instances back into the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterSignal {
    Native { epoch: u64, event: NativeEvent },
    Duration { epoch: u64, duration_ms: u64 },
}

/// Normalized events raised to the rest of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterEvent {
    Ready,
    Play,
    Pause,
    Finish,
    Progress { position_ms: u64, duration_ms: u64 },
}

/// One bound player instance
struct PlaybackSession {
    surface: SurfaceId,
    player: Box<dyn RemotePlayer>,
    epoch: u64,
    ready: bool,
    /// Only known while a track is actually playing
    duration_ms: Option<u64>,
    forwarder: TaskSlot,
}

pub struct WidgetAdapter {
    runtime: Option<Arc<dyn PlayerRuntime>>,
    session: Option<PlaybackSession>,
    next_epoch: u64,
    inbox: mpsc::UnboundedSender<AdapterSignal>,
}

impl WidgetAdapter {
    pub fn new(
        runtime: Option<Arc<dyn PlayerRuntime>>,
        inbox: mpsc::UnboundedSender<AdapterSignal>,
    ) -> Self {
        Self {
            runtime,
            session: None,
            next_epoch: 0,
            inbox,
        }
    }

    /// Attach to `surface`, releasing any previous instance first.
    ///
    /// Never fails: without a runtime or surface the adapter stays not ready.
    pub fn bind(&mut self, surface: &SurfaceId) {
        self.unbind();

        let Some(runtime) = self.runtime.as_ref() else {
            log::error!("Player runtime not available; controls stay inert");
            return;
        };
        let Some(mut player) = runtime.attach(surface) else {
            log::warn!("Playback surface {} not found", surface);
            return;
        };

        self.next_epoch += 1;
        let epoch = self.next_epoch;

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let mut forwarder = TaskSlot::new("event forwarder");
        let inbox = self.inbox.clone();
        forwarder.arm(move |_| async move {
            while let Some(event) = events_rx.recv().await {
                if inbox.send(AdapterSignal::Native { epoch, event }).is_err() {
                    break;
                }
            }
        });
        player.bind(events_tx);

        log::info!("Bound player on {} (epoch {})", surface, epoch);
        self.session = Some(PlaybackSession {
            surface: surface.clone(),
            player,
            epoch,
            ready: false,
            duration_ms: None,
            forwarder,
        });
    }

    /// Release the current instance and all of its subscriptions.
    pub fn unbind(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.player.unbind();
            session.forwarder.cancel();
            log::debug!("Released player on {} (epoch {})", session.surface, session.epoch);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.ready)
    }

    /// Epoch of the bound session, whether ready or not
    pub fn epoch(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.epoch)
    }

    pub fn surface(&self) -> Option<&SurfaceId> {
        self.session.as_ref().map(|s| &s.surface)
    }

    pub fn cached_duration(&self) -> Option<u64> {
        self.session.as_ref().and_then(|s| s.duration_ms)
    }

    fn ready_player(&mut self) -> Option<&mut Box<dyn RemotePlayer>> {
        match self.session.as_mut() {
            Some(session) if session.ready => Some(&mut session.player),
            _ => None,
        }
    }

    pub fn load(&mut self, locator: &str, options: LoadOptions) {
        if let Some(player) = self.ready_player() {
            log::info!("Loading {}", locator);
            player.load(locator, options);
        }
    }

    pub fn play(&mut self) {
        if let Some(player) = self.ready_player() {
            player.play();
        }
    }

    pub fn pause(&mut self) {
        if let Some(player) = self.ready_player() {
            player.pause();
        }
    }

    pub fn toggle(&mut self) {
        if let Some(player) = self.ready_player() {
            player.toggle();
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        if let Some(player) = self.ready_player() {
            player.set_volume(volume.min(100));
        }
    }

    pub fn get_volume(&self) -> Option<oneshot::Receiver<u8>> {
        self.session
            .as_ref()
            .filter(|s| s.ready)
            .map(|s| s.player.get_volume())
    }

    pub fn get_duration(&self) -> Option<oneshot::Receiver<u64>> {
        self.session
            .as_ref()
            .filter(|s| s.ready)
            .map(|s| s.player.get_duration())
    }

    /// Fold a signal into session state and translate it for collaborators.
    pub fn handle_signal(&mut self, signal: AdapterSignal) -> Option<AdapterEvent> {
        let inbox = self.inbox.clone();
        let session = self.session.as_mut()?;

        match signal {
            AdapterSignal::Duration { epoch, duration_ms } => {
                if epoch == session.epoch {
                    session.duration_ms = Some(duration_ms);
                }
                None
            }
            AdapterSignal::Native { epoch, .. } if epoch != session.epoch => {
                log::debug!("Dropping event from stale epoch {}", epoch);
                None
            }
            AdapterSignal::Native { event, .. } => match event {
                NativeEvent::Ready => {
                    session.ready = true;
                    log::info!("Player on {} is ready", session.surface);
                    Some(AdapterEvent::Ready)
                }
                NativeEvent::Play => {
                    let epoch = session.epoch;
                    let reply = session.player.get_duration();
                    tokio::spawn(async move {
                        if let Ok(duration_ms) = reply.await {
                            let _ = inbox.send(AdapterSignal::Duration { epoch, duration_ms });
                        }
                    });
                    Some(AdapterEvent::Play)
                }
                NativeEvent::Pause => {
                    session.duration_ms = None;
                    Some(AdapterEvent::Pause)
                }
                NativeEvent::Finish => {
                    session.duration_ms = None;
                    Some(AdapterEvent::Finish)
                }
                NativeEvent::PlayProgress { position_ms } => match session.duration_ms {
                    Some(duration_ms) if duration_ms > 0 => Some(AdapterEvent::Progress {
                        position_ms,
                        duration_ms,
                    }),
                    _ => None,
                },
            },
        }
    }
}

impl Drop for WidgetAdapter {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{PlayerAction, SimulatedRuntime};

    fn adapter_with(
        runtime: Option<Arc<dyn PlayerRuntime>>,
    ) -> (WidgetAdapter, mpsc::UnboundedReceiver<AdapterSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (WidgetAdapter::new(runtime, tx), rx)
    }

    async fn pump(adapter: &mut WidgetAdapter, rx: &mut mpsc::UnboundedReceiver<AdapterSignal>) {
        for _ in 0..4 {
            tokio::task::yield_now().await;
            while let Ok(signal) = rx.try_recv() {
                adapter.handle_signal(signal);
            }
        }
    }

    #[tokio::test]
    async fn missing_runtime_leaves_controls_inert() {
        let (mut adapter, _rx) = adapter_with(None);
        adapter.bind(&LayoutMode::Attached.surface_id());

        assert!(!adapter.is_ready());
        adapter.play();
        adapter.set_volume(40);
        assert!(adapter.get_volume().is_none());
        assert!(adapter.get_duration().is_none());
    }

    #[tokio::test]
    async fn unknown_surface_is_not_bound() {
        let runtime = Arc::new(SimulatedRuntime::default());
        let (mut adapter, _rx) = adapter_with(Some(runtime.clone()));
        adapter.bind(&SurfaceId::new("nowhere"));

        assert!(adapter.surface().is_none());
        assert!(!adapter.is_ready());
        assert!(runtime.journal().is_empty());
    }

    #[tokio::test]
    async fn controls_are_noops_until_ready() {
        let runtime = Arc::new(SimulatedRuntime::default().without_auto_ready());
        let (mut adapter, _rx) = adapter_with(Some(runtime.clone()));
        let surface = LayoutMode::Attached.surface_id();
        adapter.bind(&surface);

        adapter.play();
        adapter.load("https://soundcloud.com/a/b", LoadOptions::autoplay());
        assert_eq!(runtime.actions_on(&surface), vec![PlayerAction::Bind]);
    }

    #[tokio::test]
    async fn progress_is_suppressed_until_duration_is_known() {
        let runtime = Arc::new(SimulatedRuntime::default());
        let (mut adapter, mut rx) = adapter_with(Some(runtime));
        adapter.bind(&LayoutMode::Attached.surface_id());
        pump(&mut adapter, &mut rx).await;
        assert!(adapter.is_ready());

        let epoch = adapter.epoch().unwrap();
        let progress = AdapterSignal::Native {
            epoch,
            event: NativeEvent::PlayProgress { position_ms: 500 },
        };
        assert_eq!(adapter.handle_signal(progress), None);

        adapter.handle_signal(AdapterSignal::Duration { epoch, duration_ms: 60_000 });
        assert_eq!(
            adapter.handle_signal(progress),
            Some(AdapterEvent::Progress { position_ms: 500, duration_ms: 60_000 })
        );

        let pause = AdapterSignal::Native { epoch, event: NativeEvent::Pause };
        assert_eq!(adapter.handle_signal(pause), Some(AdapterEvent::Pause));
        assert_eq!(adapter.cached_duration(), None);
        assert_eq!(adapter.handle_signal(progress), None);
    }

    #[tokio::test]
    async fn play_event_caches_the_track_duration() {
        let runtime = Arc::new(SimulatedRuntime::default().with_track_duration(90_000));
        let (mut adapter, mut rx) = adapter_with(Some(runtime));
        adapter.bind(&LayoutMode::Attached.surface_id());
        pump(&mut adapter, &mut rx).await;

        adapter.load("https://soundcloud.com/a/b", LoadOptions::autoplay());
        pump(&mut adapter, &mut rx).await;
        pump(&mut adapter, &mut rx).await;

        assert_eq!(adapter.cached_duration(), Some(90_000));
    }

    #[tokio::test]
    async fn rebinding_releases_the_previous_instance() {
        let runtime = Arc::new(SimulatedRuntime::default());
        let (mut adapter, mut rx) = adapter_with(Some(runtime.clone()));
        let attached = LayoutMode::Attached.surface_id();
        let floating = LayoutMode::Floating.surface_id();

        adapter.bind(&attached);
        pump(&mut adapter, &mut rx).await;
        let old_epoch = adapter.epoch().unwrap();

        adapter.bind(&floating);
        assert!(!adapter.is_ready());
        assert_eq!(
            runtime.actions_on(&attached),
            vec![PlayerAction::Bind, PlayerAction::Unbind]
        );

        let stale = AdapterSignal::Native { epoch: old_epoch, event: NativeEvent::Ready };
        assert_eq!(adapter.handle_signal(stale), None);
        assert!(!adapter.is_ready());

        pump(&mut adapter, &mut rx).await;
        assert!(adapter.is_ready());
        assert_eq!(adapter.surface(), Some(&floating));
    }
}
