mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use common::{FixedTitle, Harness, SlowTitle};
use hushbox_core::metadata::NoLookup;
use hushbox_core::sim::{PlayerAction, SimulatedRuntime};
use hushbox_core::track::{CUSTOM_TRACK_DURATION, CUSTOM_TRACK_TITLE};
use hushbox_core::widget::PlayerRuntime;
use hushbox_core::{Config, Engine, EngineCommand, EngineResponse, LayoutMode, Sound};

const CUSTOM_URL: &str = "https://soundcloud.com/someone/night-rain";

async fn harness_with(resolver: Arc<dyn hushbox_core::metadata::TitleResolver>) -> Harness {
    let config = Config::default();
    let runtime =
        SimulatedRuntime::default().with_preloaded(&config.catalog.default_sound().locator);
    Harness::with(config, runtime, resolver).await
}

fn second_sound(config: &Config) -> Sound {
    config
        .catalog
        .sounds()
        .find(|s| s.locator != config.catalog.default_sound().locator)
        .cloned()
        .expect("catalog has more than one sound")
}

#[tokio::test(start_paused = true)]
async fn ready_instance_gets_the_host_volume() {
    let h = Harness::start().await;
    let surface = LayoutMode::Attached.surface_id();
    let snap = h.snapshot().await;
    assert!(snap.ready);
    assert_eq!(snap.volume, 80);
    assert_eq!(h.runtime.volume(&surface), Some(80));
    assert!(h.responses().contains(&EngineResponse::Ready));
}

#[tokio::test(start_paused = true)]
async fn selecting_another_sound_loads_it_with_autoplay() {
    let h = Harness::start().await;
    let surface = LayoutMode::Attached.surface_id();
    let sound = second_sound(&Config::default());

    h.send(EngineCommand::SelectSound(sound.clone()));
    let snap = h.snapshot().await;
    assert_eq!(snap.current, sound);
    assert!(snap.playing);
    assert_eq!(snap.loading, None);
    assert_eq!(h.runtime.loaded(&surface), Some(sound.locator.clone()));

    let responses = h.responses();
    let loading = responses
        .iter()
        .position(|r| *r == EngineResponse::Loading(Some(sound.locator.clone())));
    let playing = responses.iter().position(|r| *r == EngineResponse::Playing);
    let loaded = responses.iter().position(|r| *r == EngineResponse::Loading(None));
    assert!(loading < playing && playing < loaded);
}

#[tokio::test(start_paused = true)]
async fn selecting_the_current_sound_toggles() {
    let h = Harness::start().await;
    let surface = LayoutMode::Attached.surface_id();
    let current = Config::default().catalog.default_sound().clone();

    h.send(EngineCommand::SelectSound(current.clone()));
    assert!(h.snapshot().await.playing);
    h.send(EngineCommand::SelectSound(current));
    assert!(!h.snapshot().await.playing);

    assert_eq!(h.count(&surface, &PlayerAction::Toggle), 2);
    assert!(
        !h.runtime
            .actions_on(&surface)
            .iter()
            .any(|a| matches!(a, PlayerAction::Load(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn volume_is_clamped_and_forwarded() {
    let h = Harness::start().await;
    let surface = LayoutMode::Attached.surface_id();
    h.send(EngineCommand::SetVolume(35));
    h.send(EngineCommand::SetVolume(140));
    let snap = h.snapshot().await;
    assert_eq!(snap.volume, 100);
    assert_eq!(h.volume_writes(&surface), vec![80, 35, 100]);

    let responses = h.responses();
    assert!(responses.contains(&EngineResponse::VolumeChanged(35)));
    assert!(responses.contains(&EngineResponse::VolumeChanged(100)));
}

#[tokio::test(start_paused = true)]
async fn progress_is_reported_while_playing() {
    let h = Harness::start().await;
    h.send(EngineCommand::Play);
    h.settle().await;
    sleep(Duration::from_millis(1_200)).await;
    h.settle().await;

    let progress: Vec<u64> = h
        .responses()
        .into_iter()
        .filter_map(|r| match r {
            EngineResponse::Progress { position_ms, .. } => Some(position_ms),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![500, 1_000]);
}

#[tokio::test(start_paused = true)]
async fn finished_track_clears_playing() {
    let config = Config::default();
    let runtime = SimulatedRuntime::default()
        .with_preloaded(&config.catalog.default_sound().locator)
        .with_track_duration(2_000);
    let h = Harness::with(config, runtime, Arc::new(NoLookup)).await;

    h.send(EngineCommand::Play);
    assert!(h.snapshot().await.playing);
    sleep(Duration::from_millis(2_200)).await;
    assert!(!h.snapshot().await.playing);
    assert!(h.responses().contains(&EngineResponse::Finished));
}

#[tokio::test(start_paused = true)]
async fn layout_switch_resets_playback_to_the_default_sound() {
    let h = Harness::start().await;
    let config = Config::default();
    h.send(EngineCommand::SelectSound(second_sound(&config)));
    assert!(h.snapshot().await.playing);

    h.send(EngineCommand::SetLayout(LayoutMode::Floating));
    let snap = h.snapshot().await;
    assert_eq!(snap.layout, LayoutMode::Floating);
    assert_eq!(snap.current, *config.catalog.default_sound());
    assert!(!snap.playing);
    assert!(snap.ready);
    assert!(!h.runtime.is_playing(&LayoutMode::Attached.surface_id()));

    let responses = h.responses();
    assert!(responses.contains(&EngineResponse::LayoutChanged(LayoutMode::Floating)));

    h.send(EngineCommand::SetLayout(LayoutMode::Floating));
    h.settle().await;
    assert!(h.responses().is_empty());
}

#[tokio::test(start_paused = true)]
async fn foreign_links_are_rejected() {
    let h = harness_with(Arc::new(FixedTitle("Never"))).await;
    let surface = LayoutMode::Attached.surface_id();
    let before = h.snapshot().await.current;
    h.responses();

    h.send(EngineCommand::AddCustomTrack("https://example.com/track".to_string()));
    h.send(EngineCommand::AddCustomTrack("   ".to_string()));
    let snap = h.snapshot().await;
    assert_eq!(snap.current, before);
    assert_eq!(snap.loading, None);
    assert_eq!(
        h.responses(),
        vec![
            EngineResponse::Rejected("Please enter a valid soundcloud.com link.".to_string()),
            EngineResponse::Rejected("Please enter a link.".to_string()),
        ]
    );
    assert!(
        !h.runtime
            .actions_on(&surface)
            .iter()
            .any(|a| matches!(a, PlayerAction::Load(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn custom_track_plays_and_picks_up_its_title() {
    let h = harness_with(Arc::new(FixedTitle("Night Rain"))).await;
    let surface = LayoutMode::Attached.surface_id();

    h.send(EngineCommand::AddCustomTrack(format!("  {}  ", CUSTOM_URL)));
    let snap = h.snapshot().await;
    assert_eq!(snap.current.locator, CUSTOM_URL);
    assert_eq!(snap.current.name, "Night Rain");
    assert_eq!(snap.current.duration.as_deref(), Some(CUSTOM_TRACK_DURATION));
    assert!(snap.playing);
    assert_eq!(h.runtime.loaded(&surface), Some(CUSTOM_URL.to_string()));

    let titles: Vec<String> = h
        .responses()
        .into_iter()
        .filter_map(|r| match r {
            EngineResponse::TrackChanged(sound) => Some(sound.name),
            _ => None,
        })
        .collect();
    assert_eq!(titles, vec![CUSTOM_TRACK_TITLE.to_string(), "Night Rain".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_lookup_keeps_the_placeholder_title() {
    let h = harness_with(Arc::new(NoLookup)).await;
    h.send(EngineCommand::AddCustomTrack(CUSTOM_URL.to_string()));
    sleep(Duration::from_secs(1)).await;
    let snap = h.snapshot().await;
    assert_eq!(snap.current.name, CUSTOM_TRACK_TITLE);
    assert!(snap.playing);
}

#[tokio::test(start_paused = true)]
async fn late_title_does_not_rename_a_newer_track() {
    let h = harness_with(Arc::new(SlowTitle("Night Rain", Duration::from_secs(2)))).await;
    let sound = second_sound(&Config::default());

    h.send(EngineCommand::AddCustomTrack(CUSTOM_URL.to_string()));
    h.settle().await;
    h.send(EngineCommand::SelectSound(sound.clone()));
    sleep(Duration::from_secs(3)).await;

    let snap = h.snapshot().await;
    assert_eq!(snap.current, sound);
}

#[tokio::test(start_paused = true)]
async fn quit_unbinds_and_reports_shutdown() {
    let h = Harness::start().await;
    let runtime = Arc::clone(&h.runtime);
    let responses = h.quit().await;
    assert_eq!(responses.last(), Some(&EngineResponse::Shutdown));
    assert_eq!(
        runtime.actions_on(&LayoutMode::Attached.surface_id()).last(),
        Some(&PlayerAction::Unbind)
    );
}

#[test]
fn default_runtime_exposes_both_layout_surfaces() {
    let runtime = SimulatedRuntime::default();
    for layout in [LayoutMode::Attached, LayoutMode::Floating] {
        assert!(runtime.attach(&layout.surface_id()).is_some());
    }
}

#[test]
fn spawned_engine_runs_on_its_own_thread() {
    common::init_logger();
    let config = Config::default();
    let runtime: Arc<dyn PlayerRuntime> = Arc::new(
        SimulatedRuntime::default().with_preloaded(&config.catalog.default_sound().locator),
    );
    let (engine, handle) = Engine::new(Some(runtime), Arc::new(NoLookup), &config);
    let thread = engine.spawn().expect("engine starts");

    handle.cmd_tx.send(EngineCommand::SetVolume(40)).unwrap();
    handle.cmd_tx.send(EngineCommand::Quit).unwrap();
    thread.join().expect("engine thread exits cleanly");

    let responses: Vec<_> = handle.resp_rx.try_iter().collect();
    assert!(responses.contains(&EngineResponse::VolumeChanged(40)));
    assert_eq!(responses.last(), Some(&EngineResponse::Shutdown));
}
