mod animation; // clip playback behind the `Animator` seam
mod assets; // background glTF loading
mod blackboard; // shared telemetry
mod bus; // input topic
mod config; // layered settings
mod game; // per-frame scene state
mod graphics; // macroquad drawing and the frame loop
mod input; // pointer/keyboard port
mod picking; // camera unprojection and tile picking

use anyhow::Context;
use blackboard::{Blackboard, LoadStatus, snapshot};
use bus::Topic;
use crate::config::Settings;
use game::Game;
use input::{InputEvent, InputPump};

use macroquad::prelude::*;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const INPUT_CAPACITY: usize = 64;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Settings are needed before the window exists, so logging starts here too.
fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
            .try_init();

        crate::config::load_settings().unwrap_or_else(|e| {
            warn!("Falling back to default settings: {}", e);
            Settings::default()
        })
    })
}

fn window_conf() -> Conf {
    graphics::window_conf(&settings().window)
}

#[macroquad::main(window_conf)]
async fn main() {
    info!("Tilewalk started. Setting up Tokio runtime and loading assets...");

    match run(settings()).await {
        Ok(()) => info!("Tilewalk exited cleanly."),
        Err(e) => error!("Tilewalk stopped: {:#}", e),
    }
}

async fn run(settings: &Settings) -> anyhow::Result<()> {
    let tokio_rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let bb: Blackboard = Arc::default();

    let input_topic: Topic<InputEvent> = Topic::new(INPUT_CAPACITY);
    let inbox = input_topic.subscribe();

    let model_rx = assets::spawn_model_load(
        tokio_rt.handle(),
        settings.player.model_path.clone(),
        settings.player.model_scale,
    );

    let interval = Duration::from_millis(settings.telemetry.status_interval_ms.max(1));
    tokio_rt.spawn(status_task(bb.clone(), interval));

    let mut game = Game::new(settings, model_rx, inbox, bb)?;
    let floor = graphics::load_floor(&settings.level.floor_texture).await;
    let mut pump = InputPump::new(input_topic);

    graphics::run_frame_loop(&mut game, &mut pump, floor.as_ref()).await
}

async fn status_task(bb: Blackboard, period: Duration) {
    info!(?period, "Status task started.");
    let mut tick = tokio::time::interval(period);
    let mut last_frames = 0;
    loop {
        tick.tick().await;
        let t = snapshot(&bb);
        if t.load == LoadStatus::Loaded && t.frames == last_frames {
            warn!(since = ?t.last_frame_ts.elapsed(), "No frames rendered since last status");
        }
        last_frames = t.frames;
        info!(
            position = %t.position,
            yaw = t.yaw,
            action = ?t.action,
            target = ?t.target,
            load = ?t.load,
            frames = t.frames,
            faults = t.faults.len(),
            "Status"
        );
    }
}
