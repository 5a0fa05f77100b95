use std::time::Duration;

use strum::{EnumIter, IntoEnumIterator};
use tokio::sync::mpsc;

use crate::slot::{TaskSlot, fire_after, fire_every};
use crate::widget::WidgetAdapter;

/// Length of the fade before the timer stops playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, strum::Display)]
pub enum FadeOut {
    #[strum(serialize = "Off")]
    Off,
    #[strum(serialize = "5 s")]
    Secs5,
    #[default]
    #[strum(serialize = "10 s")]
    Secs10,
    #[strum(serialize = "15 s")]
    Secs15,
    #[strum(serialize = "20 s")]
    Secs20,
    #[strum(serialize = "30 s")]
    Secs30,
    #[strum(serialize = "60 s")]
    Secs60,
}

impl FadeOut {
    pub fn seconds(self) -> u32 {
        match self {
            FadeOut::Off => 0,
            FadeOut::Secs5 => 5,
            FadeOut::Secs10 => 10,
            FadeOut::Secs15 => 15,
            FadeOut::Secs20 => 20,
            FadeOut::Secs30 => 30,
            FadeOut::Secs60 => 60,
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<FadeOut> {
        FadeOut::iter().find(|f| f.seconds() == seconds)
    }

    pub fn as_millis(self) -> u64 {
        u64::from(self.seconds()) * 1000
    }

    /// Next value in the enumerated set, wrapping around
    pub fn next(self) -> FadeOut {
        let all: Vec<FadeOut> = FadeOut::iter().collect();
        let pos = all.iter().position(|f| *f == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum TimerPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Fading,
}

/// Tick lengths and delays used by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub fade_out: FadeOut,
    pub countdown_tick: Duration,
    pub ramp_tick: Duration,
    /// Wait between the fade's pause and the volume restore
    pub restore_grace: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            fade_out: FadeOut::default(),
            countdown_tick: Duration::from_secs(1),
            ramp_tick: Duration::from_millis(250),
            restore_grace: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    /// 0 means no timer
    pub duration_minutes: u32,
    pub remaining_ms: Option<u64>,
    pub paused: bool,
    pub fade_out: FadeOut,
}

/// A volume ramp in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeState {
    pub initial_volume: u8,
    pub steps_remaining: u32,
    pub decrement: f64,
    /// Adapter epoch the ramp was sampled on
    pub epoch: u64,
}

impl FadeState {
    pub fn level(&self) -> f64 {
        self.decrement * f64::from(self.steps_remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    CountdownTick(u64),
    FadeTrigger(u64),
    VolumeSampled { generation: u64, epoch: u64, volume: u8 },
    /// The volume read was dropped without an answer
    VolumeUnavailable(u64),
    RampTick(u64),
    RestoreVolume(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Ignored,
    Applied,
    /// Playback was paused by the timer
    FadeCompleted,
}

/// Sleep timer with a fade-out ramp.
///
/// All waiting happens in tasks held by [`TaskSlot`]s; the tasks only send
/// [`TimerSignal`]s back, and all state changes happen in [`SleepTimer::on_signal`]
/// on the owner's loop.
pub struct SleepTimer {
    config: TimerConfig,
    state: TimerState,
    fade: Option<FadeState>,
    /// Volume and epoch to put back once the grace delay has passed
    pending_restore: Option<(u8, u64)>,
    elapsed: bool,
    countdown: TaskSlot,
    trigger: TaskSlot,
    probe: TaskSlot,
    ramp: TaskSlot,
    restore: TaskSlot,
    signals: mpsc::UnboundedSender<TimerSignal>,
}

impl SleepTimer {
    pub fn new(config: TimerConfig, signals: mpsc::UnboundedSender<TimerSignal>) -> Self {
        Self {
            config,
            state: TimerState {
                fade_out: config.fade_out,
                paused: true,
                ..TimerState::default()
            },
            fade: None,
            pending_restore: None,
            elapsed: false,
            countdown: TaskSlot::new("countdown"),
            trigger: TaskSlot::new("fade trigger"),
            probe: TaskSlot::new("volume probe"),
            ramp: TaskSlot::new("fade ramp"),
            restore: TaskSlot::new("volume restore"),
            signals,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn fade(&self) -> Option<FadeState> {
        self.fade
    }

    pub fn remaining_ms(&self) -> Option<u64> {
        self.state.remaining_ms
    }

    pub fn fade_out(&self) -> FadeOut {
        self.state.fade_out
    }

    /// True once a fade has paused playback, until the next start or clear
    pub fn is_elapsed(&self) -> bool {
        self.elapsed
    }

    pub fn phase(&self) -> TimerPhase {
        if self.state.duration_minutes == 0 {
            TimerPhase::Idle
        } else if self.state.paused {
            TimerPhase::Paused
        } else if self.fade.is_some() || self.probe.is_armed() {
            TimerPhase::Fading
        } else {
            TimerPhase::Running
        }
    }

    /// Takes effect at the next start or resume.
    pub fn set_fade_out(&mut self, fade_out: FadeOut) {
        self.state.fade_out = fade_out;
    }

    pub fn start_timer(&mut self, minutes: u32, fade_out: FadeOut, adapter: &mut WidgetAdapter) {
        self.clear_timer(adapter);
        if minutes == 0 {
            return;
        }

        let total_ms = u64::from(minutes) * 60_000;
        self.state = TimerState {
            duration_minutes: minutes,
            remaining_ms: Some(total_ms),
            paused: false,
            fade_out,
        };
        log::info!("Sleep timer set: {} min, fade {}", minutes, fade_out);
        self.run(total_ms);
    }

    pub fn pause_timer(&mut self, adapter: &mut WidgetAdapter) {
        if self.state.duration_minutes == 0 || self.state.paused {
            return;
        }
        self.state.paused = true;
        self.countdown.cancel();
        self.trigger.cancel();
        self.cancel_fade(adapter, true);
        log::info!("Sleep timer paused at {:?} ms", self.state.remaining_ms);
    }

    pub fn resume_timer(&mut self) {
        if self.state.duration_minutes == 0 || !self.state.paused {
            return;
        }
        self.state.paused = false;
        let remaining = self.state.remaining_ms.unwrap_or(0);
        if self.elapsed || remaining == 0 {
            return;
        }
        log::info!("Sleep timer resumed with {} ms left", remaining);
        self.run(remaining);
    }

    pub fn clear_timer(&mut self, adapter: &mut WidgetAdapter) {
        self.countdown.cancel();
        self.trigger.cancel();
        self.cancel_fade(adapter, true);
        if self.state.duration_minutes > 0 {
            log::info!("Sleep timer cleared");
        }
        self.state = TimerState {
            fade_out: self.state.fade_out,
            paused: true,
            ..TimerState::default()
        };
        self.elapsed = false;
    }

    /// Start again with the configured duration; no-op without one.
    pub fn restart_timer(&mut self, adapter: &mut WidgetAdapter) {
        let minutes = self.state.duration_minutes;
        if minutes > 0 {
            let fade_out = self.state.fade_out;
            self.start_timer(minutes, fade_out, adapter);
        }
    }

    /// The adapter moved to another instance: anything aimed at the old one
    /// is dropped without touching it.
    pub fn on_surface_changed(&mut self) {
        if self.fade.is_some() || self.probe.is_armed() || self.pending_restore.is_some() {
            log::warn!("Surface changed during fade; abandoning the ramp");
        }
        self.probe.cancel();
        self.ramp.cancel();
        self.restore.cancel();
        self.fade = None;
        self.pending_restore = None;
    }

    fn run(&mut self, remaining_ms: u64) {
        let tick = self.config.countdown_tick;
        let tx = self.signals.clone();
        self.countdown
            .arm(move |g| fire_every(tick, tx, move || TimerSignal::CountdownTick(g)));

        let offset_ms = remaining_ms.saturating_sub(self.state.fade_out.as_millis());
        let tx = self.signals.clone();
        self.trigger.arm(move |g| {
            fire_after(Duration::from_millis(offset_ms), tx, TimerSignal::FadeTrigger(g))
        });
        log::debug!("Fade starts in {} ms", offset_ms);
    }

    /// Stop the ramp. With `restore`, the sampled volume goes back on the
    /// instance right away.
    fn cancel_fade(&mut self, adapter: &mut WidgetAdapter, restore: bool) {
        self.probe.cancel();
        self.ramp.cancel();
        self.restore.cancel();

        let target = self
            .fade
            .take()
            .map(|f| (f.initial_volume, f.epoch))
            .or(self.pending_restore.take());
        self.pending_restore = None;

        if let Some((volume, epoch)) = target {
            if restore && adapter.epoch() == Some(epoch) {
                log::debug!("Fade cancelled; restoring volume {}", volume);
                adapter.set_volume(volume);
            }
        }
    }

    pub fn on_signal(&mut self, signal: TimerSignal, adapter: &mut WidgetAdapter) -> SignalOutcome {
        match signal {
            TimerSignal::CountdownTick(g) => {
                if !self.countdown.is_current(g) || self.state.paused {
                    return SignalOutcome::Ignored;
                }
                let tick_ms = self.config.countdown_tick.as_millis() as u64;
                let remaining = self.state.remaining_ms.unwrap_or(0).saturating_sub(tick_ms);
                self.state.remaining_ms = Some(remaining);
                if remaining == 0 {
                    self.countdown.cancel();
                    log::debug!("Countdown reached zero");
                }
                SignalOutcome::Applied
            }
            TimerSignal::FadeTrigger(g) => {
                if !self.trigger.take_fired(g) {
                    return SignalOutcome::Ignored;
                }
                self.begin_fade(adapter)
            }
            TimerSignal::VolumeSampled { generation, epoch, volume } => {
                if !self.probe.take_fired(generation) || adapter.epoch() != Some(epoch) {
                    return SignalOutcome::Ignored;
                }
                self.begin_ramp(volume, epoch);
                SignalOutcome::Applied
            }
            TimerSignal::VolumeUnavailable(g) => {
                if !self.probe.take_fired(g) {
                    return SignalOutcome::Ignored;
                }
                log::warn!("Volume read went unanswered; stopping without a fade");
                adapter.pause();
                self.elapsed = true;
                SignalOutcome::FadeCompleted
            }
            TimerSignal::RampTick(g) => {
                if !self.ramp.is_current(g) {
                    return SignalOutcome::Ignored;
                }
                self.step_ramp(adapter)
            }
            TimerSignal::RestoreVolume(g) => {
                if !self.restore.take_fired(g) {
                    return SignalOutcome::Ignored;
                }
                if let Some((volume, epoch)) = self.pending_restore.take() {
                    if adapter.epoch() == Some(epoch) {
                        log::debug!("Restoring volume {} after fade", volume);
                        adapter.set_volume(volume);
                    }
                }
                SignalOutcome::Applied
            }
        }
    }

    fn begin_fade(&mut self, adapter: &mut WidgetAdapter) -> SignalOutcome {
        if self.state.fade_out == FadeOut::Off {
            log::info!("Timer done; stopping playback");
            adapter.pause();
            self.elapsed = true;
            return SignalOutcome::FadeCompleted;
        }

        let (Some(reply), Some(epoch)) = (adapter.get_volume(), adapter.epoch()) else {
            log::warn!("Player not ready; skipping fade");
            return SignalOutcome::Ignored;
        };

        let tx = self.signals.clone();
        self.probe.arm(move |generation| async move {
            let signal = match reply.await {
                Ok(volume) => TimerSignal::VolumeSampled { generation, epoch, volume },
                Err(_) => TimerSignal::VolumeUnavailable(generation),
            };
            let _ = tx.send(signal);
        });
        SignalOutcome::Applied
    }

    fn begin_ramp(&mut self, initial_volume: u8, epoch: u64) {
        let tick_ms = self.config.ramp_tick.as_millis().max(1) as u64;
        let steps = (self.state.fade_out.as_millis() / tick_ms).max(1) as u32;
        let decrement = f64::from(initial_volume) / f64::from(steps);

        log::info!(
            "Fading out from volume {} over {} steps of {:.2}",
            initial_volume,
            steps,
            decrement
        );
        self.fade = Some(FadeState {
            initial_volume,
            steps_remaining: steps,
            decrement,
            epoch,
        });

        let period = self.config.ramp_tick;
        let tx = self.signals.clone();
        self.ramp
            .arm(move |g| fire_every(period, tx, move || TimerSignal::RampTick(g)));
    }

    fn step_ramp(&mut self, adapter: &mut WidgetAdapter) -> SignalOutcome {
        let Some(fade) = self.fade.as_mut() else {
            self.ramp.cancel();
            return SignalOutcome::Ignored;
        };
        if adapter.epoch() != Some(fade.epoch) {
            self.on_surface_changed();
            return SignalOutcome::Ignored;
        }

        fade.steps_remaining = fade.steps_remaining.saturating_sub(1);
        let level = fade.level();
        if fade.steps_remaining > 0 && level > 0.0 {
            adapter.set_volume(level.round().clamp(0.0, 100.0) as u8);
            return SignalOutcome::Applied;
        }

        let FadeState { initial_volume, epoch, .. } = *fade;
        self.fade = None;
        self.ramp.cancel();
        adapter.pause();
        self.pending_restore = Some((initial_volume, epoch));
        let grace = self.config.restore_grace;
        let tx = self.signals.clone();
        self.restore
            .arm(move |g| fire_after(grace, tx, TimerSignal::RestoreVolume(g)));
        self.elapsed = true;
        log::info!("Fade complete; playback paused");
        SignalOutcome::FadeCompleted
    }
}
