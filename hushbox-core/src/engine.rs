use std::sync::Arc;
use std::thread;

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::mpsc;

use crate::catalog::{Catalog, Sound};
use crate::commands::{EngineCommand, EngineResponse, EngineSnapshot};
use crate::config::Config;
use crate::metadata::{LookupError, TitleResolver};
use crate::timer::{SignalOutcome, SleepTimer, TimerPhase, TimerSignal};
use crate::track;
use crate::widget::{
    AdapterEvent, AdapterSignal, LayoutMode, LoadOptions, PlayerRuntime, WidgetAdapter,
};

/// Host side of the engine channels
pub struct EngineHandle {
    pub cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    pub resp_rx: Receiver<EngineResponse>,
}

/// Result of a background title lookup
#[derive(Debug)]
struct TitleFound {
    locator: String,
    title: String,
}

/// Single-threaded actor owning the player adapter and the sleep timer.
///
/// Host commands, player events and timer signals are handled one at a time
/// on one task, so no state is ever touched concurrently.
pub struct Engine {
    adapter: WidgetAdapter,
    timer: SleepTimer,
    catalog: Catalog,
    resolver: Arc<dyn TitleResolver>,
    custom_track_domain: String,

    layout: LayoutMode,
    current: Sound,
    playing: bool,
    loading: Option<String>,
    volume: u8,

    cmd_rx: mpsc::UnboundedReceiver<EngineCommand>,
    adapter_rx: mpsc::UnboundedReceiver<AdapterSignal>,
    timer_rx: mpsc::UnboundedReceiver<TimerSignal>,
    title_tx: mpsc::UnboundedSender<TitleFound>,
    title_rx: mpsc::UnboundedReceiver<TitleFound>,
    resp_tx: Sender<EngineResponse>,

    reported_remaining: Option<u64>,
    reported_phase: TimerPhase,
}

impl Engine {
    /// `runtime` is `None` when the player runtime could not be loaded; the
    /// engine still runs, with inert transport controls.
    pub fn new(
        runtime: Option<Arc<dyn PlayerRuntime>>,
        resolver: Arc<dyn TitleResolver>,
        config: &Config,
    ) -> (Engine, EngineHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded();
        let (adapter_tx, adapter_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (title_tx, title_rx) = mpsc::unbounded_channel();

        let catalog = config.catalog.clone();
        let engine = Engine {
            adapter: WidgetAdapter::new(runtime, adapter_tx),
            timer: SleepTimer::new(config.timer, timer_tx),
            current: catalog.default_sound().clone(),
            catalog,
            resolver,
            custom_track_domain: config.player.custom_track_domain.clone(),
            layout: config.player.layout,
            playing: false,
            loading: None,
            volume: config.player.volume.min(100),
            cmd_rx,
            adapter_rx,
            timer_rx,
            title_tx,
            title_rx,
            resp_tx,
            reported_remaining: None,
            reported_phase: TimerPhase::Idle,
        };

        (engine, EngineHandle { cmd_tx, resp_rx })
    }

    /// Run the engine on a dedicated thread with its own single-threaded
    /// runtime.
    pub fn spawn(self) -> anyhow::Result<thread::JoinHandle<()>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to build engine runtime")?;
        thread::Builder::new()
            .name("hushbox-engine".to_string())
            .spawn(move || runtime.block_on(self.run()))
            .context("Failed to spawn engine thread")
    }

    pub async fn run(mut self) {
        log::info!("Engine started ({} sounds in catalog)", self.catalog.len());
        self.adapter.bind(&self.layout.surface_id());

        loop {
            tokio::select! {
                biased;

                Some(signal) = self.timer_rx.recv() => self.handle_timer_signal(signal),
                Some(signal) = self.adapter_rx.recv() => self.handle_adapter_signal(signal),
                Some(found) = self.title_rx.recv() => self.handle_title(found),
                command = self.cmd_rx.recv() => {
                    let keep_running = match command {
                        Some(command) => self.handle_command(command),
                        None => false,
                    };
                    if !keep_running {
                        break;
                    }
                }
            }
            self.report_timer();
        }

        self.timer.clear_timer(&mut self.adapter);
        self.adapter.unbind();
        self.emit(EngineResponse::Shutdown);
        log::info!("Engine stopped");
    }

    fn emit(&self, response: EngineResponse) {
        if self.resp_tx.send(response).is_err() {
            log::trace!("Host stopped listening");
        }
    }

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            ready: self.adapter.is_ready(),
            surface: self.adapter.surface().cloned(),
            layout: self.layout,
            current: self.current.clone(),
            playing: self.playing,
            loading: self.loading.clone(),
            volume: self.volume,
            timer: self.timer.state(),
            phase: self.timer.phase(),
            fade: self.timer.fade(),
        }
    }

    /// Returns false when the engine should stop.
    fn handle_command(&mut self, command: EngineCommand) -> bool {
        log::debug!("Command: {:?}", command);
        match command {
            EngineCommand::SelectSound(sound) => self.select_sound(sound),
            EngineCommand::AddCustomTrack(url) => self.add_custom_track(&url),
            EngineCommand::Play => self.adapter.play(),
            EngineCommand::Pause => self.adapter.pause(),
            EngineCommand::Toggle => self.adapter.toggle(),
            EngineCommand::SetVolume(volume) => {
                self.volume = volume.min(100);
                self.adapter.set_volume(self.volume);
                self.emit(EngineResponse::VolumeChanged(self.volume));
            }
            EngineCommand::SetLayout(layout) => self.switch_layout(layout),
            EngineCommand::SetFadeOut(fade_out) => {
                self.timer.set_fade_out(fade_out);
                self.emit(EngineResponse::FadeOutChanged(fade_out));
            }
            EngineCommand::SetTimer(minutes) => {
                let fade_out = self.timer.fade_out();
                self.timer.start_timer(minutes, fade_out, &mut self.adapter);
            }
            EngineCommand::ToggleTimerPause => {
                if self.timer.state().duration_minutes > 0 {
                    if self.timer.state().paused {
                        self.timer.resume_timer();
                    } else {
                        self.timer.pause_timer(&mut self.adapter);
                    }
                }
            }
            EngineCommand::RestartTimer => self.timer.restart_timer(&mut self.adapter),
            EngineCommand::ClearTimer => self.timer.clear_timer(&mut self.adapter),
            EngineCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            EngineCommand::Quit => return false,
        }
        true
    }

    fn select_sound(&mut self, sound: Sound) {
        if sound.locator == self.current.locator {
            self.adapter.toggle();
            return;
        }
        self.load(sound);
    }

    fn load(&mut self, sound: Sound) {
        self.loading = Some(sound.locator.clone());
        self.adapter.load(&sound.locator, LoadOptions::autoplay());
        self.current = sound;
        self.emit(EngineResponse::Loading(self.loading.clone()));
        self.emit(EngineResponse::TrackChanged(self.current.clone()));
    }

    fn add_custom_track(&mut self, input: &str) {
        let locator = match track::validate_custom_track(input, &self.custom_track_domain) {
            Ok(locator) => locator,
            Err(e) => {
                log::warn!("Rejected custom track {:?}: {}", input, e);
                self.emit(EngineResponse::Rejected(e.to_string()));
                return;
            }
        };

        self.load(track::custom_sound(locator.clone()));

        let resolver = Arc::clone(&self.resolver);
        let title_tx = self.title_tx.clone();
        tokio::spawn(async move {
            match resolver.resolve(&locator).await {
                Ok(title) => {
                    let _ = title_tx.send(TitleFound { locator, title });
                }
                Err(LookupError::Disabled) => log::debug!("Title lookup disabled"),
                Err(e) => log::warn!("Title lookup for {} failed: {}", locator, e),
            }
        });
    }

    fn handle_title(&mut self, found: TitleFound) {
        if found.locator != self.current.locator {
            return;
        }
        log::info!("Resolved title: {}", found.title);
        self.current.name = found.title;
        self.emit(EngineResponse::TrackChanged(self.current.clone()));
    }

    fn switch_layout(&mut self, layout: LayoutMode) {
        if layout == self.layout {
            return;
        }
        log::info!("Switching layout {} -> {}", self.layout, layout);

        self.adapter.pause();
        self.timer.on_surface_changed();
        self.adapter.bind(&layout.surface_id());

        self.layout = layout;
        self.current = self.catalog.default_sound().clone();
        self.playing = false;
        self.loading = None;

        self.emit(EngineResponse::LayoutChanged(layout));
        self.emit(EngineResponse::TrackChanged(self.current.clone()));
        self.emit(EngineResponse::Paused);
        self.emit(EngineResponse::Loading(None));
    }

    fn handle_adapter_signal(&mut self, signal: AdapterSignal) {
        let Some(event) = self.adapter.handle_signal(signal) else {
            return;
        };
        match event {
            AdapterEvent::Ready => {
                self.adapter.set_volume(self.volume);
                self.emit(EngineResponse::Ready);
            }
            AdapterEvent::Play => {
                self.playing = true;
                self.emit(EngineResponse::Playing);
                if self.loading.take().is_some() {
                    self.emit(EngineResponse::Loading(None));
                }
            }
            AdapterEvent::Pause => {
                self.playing = false;
                self.emit(EngineResponse::Paused);
            }
            AdapterEvent::Finish => {
                self.playing = false;
                self.emit(EngineResponse::Finished);
            }
            AdapterEvent::Progress {
                position_ms,
                duration_ms,
            } => self.emit(EngineResponse::Progress {
                position_ms,
                duration_ms,
            }),
        }
    }

    fn handle_timer_signal(&mut self, signal: TimerSignal) {
        if self.timer.on_signal(signal, &mut self.adapter) == SignalOutcome::FadeCompleted {
            self.emit(EngineResponse::TimerElapsed);
        }
    }

    fn report_timer(&mut self) {
        let remaining = self.timer.remaining_ms();
        if remaining != self.reported_remaining {
            self.reported_remaining = remaining;
            self.emit(EngineResponse::TimerRemaining(remaining));
        }
        let phase = self.timer.phase();
        if phase != self.reported_phase {
            self.reported_phase = phase;
            self.emit(EngineResponse::TimerPhaseChanged(phase));
        }
    }
}
