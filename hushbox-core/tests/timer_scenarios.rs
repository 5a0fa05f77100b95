mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use common::Harness;
use hushbox_core::metadata::NoLookup;
use hushbox_core::sim::{PlayerAction, SimulatedRuntime};
use hushbox_core::{Config, Engine, EngineCommand, EngineResponse, FadeOut, LayoutMode, TimerPhase};

fn ramp_from_80() -> Vec<u8> {
    (1..40u8).rev().map(|step| step * 2).collect()
}

async fn playing_harness() -> Harness {
    let h = Harness::start().await;
    h.send(EngineCommand::Play);
    assert!(h.snapshot().await.playing);
    h
}

#[tokio::test(start_paused = true)]
async fn one_minute_timer_fades_over_the_last_ten_seconds() {
    let h = playing_harness().await;
    let surface = LayoutMode::Attached.surface_id();
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_millis(49_500)).await;
    let snap = h.snapshot().await;
    assert_eq!(snap.phase, TimerPhase::Running);
    assert_eq!(snap.timer.remaining_ms, Some(11_000));
    assert_eq!(h.volume_writes(&surface), vec![80]);

    sleep(Duration::from_millis(1_100)).await;
    let snap = h.snapshot().await;
    assert_eq!(snap.phase, TimerPhase::Fading);
    assert_eq!(snap.fade.map(|f| f.initial_volume), Some(80));
    assert!(snap.playing);

    sleep(Duration::from_secs(10)).await;
    let snap = h.snapshot().await;
    assert!(!snap.playing);
    assert_eq!(snap.timer.remaining_ms, Some(0));
    assert_eq!(snap.fade, None);

    let mut expected = vec![80];
    expected.extend(ramp_from_80());
    expected.push(80);
    assert_eq!(h.volume_writes(&surface), expected);
    assert_eq!(h.count(&surface, &PlayerAction::Pause), 1);
    assert_eq!(h.runtime.volume(&surface), Some(80));

    let responses = h.responses();
    assert!(responses.contains(&EngineResponse::TimerElapsed));
    assert!(responses.contains(&EngineResponse::TimerPhaseChanged(TimerPhase::Fading)));
    assert!(responses.contains(&EngineResponse::Paused));
}

#[tokio::test(start_paused = true)]
async fn countdown_reports_every_second() {
    let h = playing_harness().await;
    h.responses();
    h.send(EngineCommand::SetTimer(1));
    sleep(Duration::from_millis(3_500)).await;
    h.settle().await;

    let remaining: Vec<Option<u64>> = h
        .responses()
        .into_iter()
        .filter_map(|r| match r {
            EngineResponse::TimerRemaining(ms) => Some(ms),
            _ => None,
        })
        .collect();
    assert_eq!(
        remaining,
        vec![Some(60_000), Some(59_000), Some(58_000), Some(57_000)]
    );
}

#[tokio::test(start_paused = true)]
async fn paused_timer_holds_and_resumed_timer_defers_the_fade() {
    let h = playing_harness().await;
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_millis(10_500)).await;
    h.send(EngineCommand::ToggleTimerPause);
    let snap = h.snapshot().await;
    assert_eq!(snap.phase, TimerPhase::Paused);
    assert_eq!(snap.timer.remaining_ms, Some(50_000));

    sleep(Duration::from_secs(20)).await;
    assert_eq!(h.snapshot().await.timer.remaining_ms, Some(50_000));

    h.send(EngineCommand::ToggleTimerPause);
    sleep(Duration::from_millis(39_500)).await;
    assert_eq!(h.snapshot().await.phase, TimerPhase::Running);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(h.snapshot().await.phase, TimerPhase::Fading);
}

#[tokio::test(start_paused = true)]
async fn fade_longer_than_the_timer_starts_at_once() {
    let h = playing_harness().await;
    h.send(EngineCommand::SetFadeOut(FadeOut::Secs60));
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_millis(100)).await;
    let snap = h.snapshot().await;
    assert_eq!(snap.phase, TimerPhase::Fading);
    assert_eq!(snap.timer.fade_out, FadeOut::Secs60);
    assert!(h.responses().contains(&EngineResponse::FadeOutChanged(FadeOut::Secs60)));
}

#[tokio::test(start_paused = true)]
async fn zero_fade_pauses_without_touching_volume() {
    let h = playing_harness().await;
    let surface = LayoutMode::Attached.surface_id();
    h.send(EngineCommand::SetFadeOut(FadeOut::Off));
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_millis(60_500)).await;
    let snap = h.snapshot().await;
    assert!(!snap.playing);
    assert_eq!(h.volume_writes(&surface), vec![80]);
    assert!(h.responses().contains(&EngineResponse::TimerElapsed));
}

#[tokio::test(start_paused = true)]
async fn clearing_mid_fade_restores_volume_and_keeps_playing() {
    let h = playing_harness().await;
    let surface = LayoutMode::Attached.surface_id();
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_secs(55)).await;
    assert_eq!(h.snapshot().await.phase, TimerPhase::Fading);

    h.send(EngineCommand::ClearTimer);
    let snap = h.snapshot().await;
    assert_eq!(snap.phase, TimerPhase::Idle);
    assert_eq!(snap.timer.remaining_ms, None);
    assert_eq!(snap.fade, None);
    assert_eq!(h.volume_writes(&surface).last(), Some(&80));

    let writes = h.volume_writes(&surface).len();
    sleep(Duration::from_secs(10)).await;
    let snap = h.snapshot().await;
    assert!(snap.playing);
    assert_eq!(h.volume_writes(&surface).len(), writes);
    assert_eq!(h.count(&surface, &PlayerAction::Pause), 0);
}

#[tokio::test(start_paused = true)]
async fn restart_resets_the_countdown() {
    let h = playing_harness().await;
    h.send(EngineCommand::SetTimer(2));
    sleep(Duration::from_millis(30_500)).await;
    assert_eq!(h.snapshot().await.timer.remaining_ms, Some(90_000));

    h.send(EngineCommand::RestartTimer);
    let snap = h.snapshot().await;
    assert_eq!(snap.timer.remaining_ms, Some(120_000));
    assert_eq!(snap.timer.duration_minutes, 2);
}

#[tokio::test(start_paused = true)]
async fn switching_layout_mid_fade_leaves_the_old_instance_alone() {
    let h = playing_harness().await;
    let attached = LayoutMode::Attached.surface_id();
    let floating = LayoutMode::Floating.surface_id();
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_secs(55)).await;
    assert_eq!(h.snapshot().await.phase, TimerPhase::Fading);

    h.send(EngineCommand::SetLayout(LayoutMode::Floating));
    let snap = h.snapshot().await;
    assert_eq!(snap.layout, LayoutMode::Floating);
    assert_eq!(snap.surface, Some(floating.clone()));
    assert!(!snap.playing);
    assert_eq!(snap.loading, None);
    assert_eq!(snap.fade, None);

    sleep(Duration::from_secs(10)).await;
    let attached_actions = h.runtime.actions_on(&attached);
    assert_eq!(attached_actions.last(), Some(&PlayerAction::Unbind));
    assert_eq!(h.volume_writes(&floating), vec![80]);
    assert_eq!(h.count(&floating, &PlayerAction::Pause), 0);
}

#[tokio::test(start_paused = true)]
async fn pending_fade_follows_the_new_instance() {
    let h = playing_harness().await;
    let floating = LayoutMode::Floating.surface_id();
    h.send(EngineCommand::SetTimer(1));

    sleep(Duration::from_millis(10_500)).await;
    h.send(EngineCommand::SetLayout(LayoutMode::Floating));
    h.settle().await;
    h.send(EngineCommand::Play);
    assert!(h.snapshot().await.playing);

    sleep(Duration::from_secs(51)).await;
    let snap = h.snapshot().await;
    assert!(!snap.playing);

    let mut expected = vec![80];
    expected.extend(ramp_from_80());
    expected.push(80);
    assert_eq!(h.volume_writes(&floating), expected);
}

#[tokio::test(start_paused = true)]
async fn timer_runs_without_a_player_runtime() {
    common::init_logger();
    let config = Config::default();
    let (engine, handle) = Engine::new(None, Arc::new(NoLookup), &config);
    let task = tokio::spawn(engine.run());

    handle.cmd_tx.send(EngineCommand::Play).unwrap();
    handle.cmd_tx.send(EngineCommand::SetVolume(30)).unwrap();
    handle.cmd_tx.send(EngineCommand::SetTimer(1)).unwrap();
    sleep(Duration::from_millis(60_500)).await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    handle.cmd_tx.send(EngineCommand::Snapshot(tx)).unwrap();
    let snap = rx.await.unwrap();
    assert!(!snap.ready);
    assert_eq!(snap.surface, None);
    assert!(!snap.playing);
    assert_eq!(snap.volume, 30);
    assert_eq!(snap.timer.remaining_ms, Some(0));

    handle.cmd_tx.send(EngineCommand::Quit).unwrap();
    task.await.unwrap();
    let responses: Vec<_> = handle.resp_rx.try_iter().collect();
    assert!(!responses.contains(&EngineResponse::TimerElapsed));
    assert_eq!(responses.last(), Some(&EngineResponse::Shutdown));
}

#[tokio::test(start_paused = true)]
async fn missing_surface_leaves_controls_inert() {
    let runtime = SimulatedRuntime::new([LayoutMode::Floating.surface_id()]);
    let h = Harness::with(Config::default(), runtime, Arc::new(NoLookup)).await;
    h.send(EngineCommand::Play);
    let snap = h.snapshot().await;
    assert!(!snap.ready);
    assert!(!snap.playing);
    assert!(h.runtime.journal().is_empty());
}
