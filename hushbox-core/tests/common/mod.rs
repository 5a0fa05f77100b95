#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crossbeam_channel::Receiver;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use hushbox_core::metadata::{LookupError, NoLookup, TitleResolver};
use hushbox_core::sim::{PlayerAction, SimulatedRuntime};
use hushbox_core::widget::PlayerRuntime;
use hushbox_core::{Config, Engine, EngineCommand, EngineResponse, EngineSnapshot, SurfaceId};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Resolver answering every lookup with the same title
pub struct FixedTitle(pub &'static str);

#[async_trait]
impl TitleResolver for FixedTitle {
    async fn resolve(&self, _locator: &str) -> Result<String, LookupError> {
        Ok(self.0.to_string())
    }
}

/// Resolver that answers after `delay`
pub struct SlowTitle(pub &'static str, pub Duration);

#[async_trait]
impl TitleResolver for SlowTitle {
    async fn resolve(&self, _locator: &str) -> Result<String, LookupError> {
        tokio::time::sleep(self.1).await;
        Ok(self.0.to_string())
    }
}

pub struct Harness {
    pub runtime: Arc<SimulatedRuntime>,
    pub cmd_tx: mpsc::UnboundedSender<EngineCommand>,
    pub resp_rx: Receiver<EngineResponse>,
    task: JoinHandle<()>,
}

impl Harness {
    /// Engine on the default config with the default sound cued
    pub async fn start() -> Self {
        let config = Config::default();
        let runtime =
            SimulatedRuntime::default().with_preloaded(&config.catalog.default_sound().locator);
        Self::with(config, runtime, Arc::new(NoLookup)).await
    }

    pub async fn with(
        config: Config,
        runtime: SimulatedRuntime,
        resolver: Arc<dyn TitleResolver>,
    ) -> Self {
        init_logger();
        let runtime = Arc::new(runtime);
        let shared: Arc<dyn PlayerRuntime> = runtime.clone();
        let (engine, handle) = Engine::new(Some(shared), resolver, &config);
        let task = tokio::spawn(engine.run());
        let harness = Self {
            runtime,
            cmd_tx: handle.cmd_tx,
            resp_rx: handle.resp_rx,
            task,
        };
        harness.settle().await;
        harness
    }

    pub fn send(&self, command: EngineCommand) {
        self.cmd_tx.send(command).expect("engine stopped");
    }

    /// Let the engine and the player tasks drain their queues.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.settle().await;
        let (tx, rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot(tx));
        rx.await.expect("engine dropped the snapshot request")
    }

    pub fn responses(&self) -> Vec<EngineResponse> {
        self.resp_rx.try_iter().collect()
    }

    pub fn volume_writes(&self, surface: &SurfaceId) -> Vec<u8> {
        self.runtime
            .actions_on(surface)
            .into_iter()
            .filter_map(|a| match a {
                PlayerAction::SetVolume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, surface: &SurfaceId, action: &PlayerAction) -> usize {
        self.runtime
            .actions_on(surface)
            .iter()
            .filter(|a| *a == action)
            .count()
    }

    pub async fn quit(self) -> Vec<EngineResponse> {
        self.send(EngineCommand::Quit);
        self.task.await.expect("engine task panicked");
        self.resp_rx.try_iter().collect()
    }
}
