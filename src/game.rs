//! Per-frame scene state: the grid, the player and everything the frame loop
//! feeds into them.

use anyhow::Context;
use macroquad::input::KeyCode;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, error, info};

use tilewalk_grid::{Grid, GridPoint};
use tilewalk_motion::{AnimationTable, Avatar, ChatBubble, Player, Step};

use crate::animation::ClipMixer;
use crate::assets::{LoadedModel, ModelReceiver};
use crate::blackboard::{Blackboard, LoadStatus, raise_fault, set_load_status};
use crate::bus::Inbox;
use crate::config::Settings;
use crate::input::InputEvent;
use crate::picking::{ViewCamera, pick_tile, to_motion};

enum LoadState {
    Pending(ModelReceiver),
    Ready(LoadedModel),
    Failed,
}

pub struct Game {
    grid: Grid,
    camera: ViewCamera,
    player: Player<ClipMixer>,
    tile_thickness: f32,
    chat_text: String,
    chat_height: f32,
    highlighted: Option<GridPoint>,
    load: LoadState,
    inbox: Inbox<InputEvent>,
    blackboard: Blackboard,
    quit_requested: bool,
}

impl Game {
    pub fn new(
        settings: &Settings,
        model: ModelReceiver,
        inbox: Inbox<InputEvent>,
        blackboard: Blackboard,
    ) -> anyhow::Result<Self> {
        let level = &settings.level;
        let grid = Grid::new(level.width, level.height, level.tile_size).context("invalid level grid")?;
        let player = Player::new(tilewalk_motion::Vec3::ZERO, settings.player.velocity)
            .context("invalid player settings")?;
        info!(%grid, velocity = player.velocity(), "Scene created");

        set_load_status(&blackboard, LoadStatus::Loading);
        Ok(Game {
            grid,
            camera: ViewCamera::from_settings(&settings.camera),
            player,
            tile_thickness: level.tile_thickness,
            chat_text: settings.player.chat_text.clone(),
            chat_height: settings.player.chat_height,
            highlighted: None,
            load: LoadState::Pending(model),
            inbox,
            blackboard,
            quit_requested: false,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn camera(&self) -> &ViewCamera {
        &self.camera
    }

    pub fn player(&self) -> &Player<ClipMixer> {
        &self.player
    }

    pub fn tile_thickness(&self) -> f32 {
        self.tile_thickness
    }

    /// Tile currently under the pointer.
    pub fn highlighted(&self) -> Option<GridPoint> {
        self.highlighted
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        match &self.load {
            LoadState::Ready(model) => Some(model),
            _ => None,
        }
    }

    pub fn load_failed(&self) -> bool {
        matches!(self.load, LoadState::Failed)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Applies every queued input event. `aspect` is the viewport's width over height.
    pub fn handle_input(&mut self, aspect: f32) {
        for event in self.inbox.drain() {
            match *event {
                InputEvent::PointerMove { ndc } => {
                    self.highlighted =
                        pick_tile(&self.grid, &self.camera, ndc, aspect, self.tile_thickness).map(|hit| hit.cell);
                }
                InputEvent::PointerDown { ndc } => {
                    let Some(hit) = pick_tile(&self.grid, &self.camera, ndc, aspect, self.tile_thickness) else {
                        continue;
                    };
                    self.highlighted = Some(hit.cell);
                    if self.player.set_target(to_motion(hit.point)) {
                        info!(cell = %hit.cell, target = %to_motion(hit.point), "New walk target");
                    } else {
                        debug!(cell = %hit.cell, "Target ignored; player not loaded");
                    }
                }
                InputEvent::Key(KeyCode::Escape) => {
                    info!("Quit requested");
                    self.quit_requested = true;
                }
                InputEvent::Key(_) => {}
            }
        }
    }

    /// Checks whether the background model load has finished.
    pub fn poll_load(&mut self) {
        let LoadState::Pending(rx) = &mut self.load else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(anyhow::anyhow!("model loader exited without a result")),
        };

        match result.and_then(|model| self.install_model(model)) {
            Ok(()) => set_load_status(&self.blackboard, LoadStatus::Loaded),
            Err(e) => {
                error!("Player model load failed: {:#}", e);
                raise_fault(&self.blackboard, &format!("model load failed: {e:#}"));
                set_load_status(&self.blackboard, LoadStatus::Failed);
                self.load = LoadState::Failed;
            }
        }
    }

    fn install_model(&mut self, model: LoadedModel) -> anyhow::Result<()> {
        let mixer = ClipMixer::new(model.clips.iter().map(|clip| (clip.name.clone(), clip.duration)));
        let table = AnimationTable::from_clips(mixer.handles())
            .with_context(|| format!("'{}' is missing a required clip", model.path.display()))?;
        self.player.finish_loading(mixer, table)?;
        self.player
            .attach_chat_bubble(ChatBubble::new(self.chat_text.clone(), self.chat_height));

        info!(path = %model.path.display(), clips = model.clips.len(), "Player ready");
        self.load = LoadState::Ready(model);
        Ok(())
    }

    /// One frame of simulation. `dt` is the frame time in seconds and only
    /// drives clip playback; movement is per tick.
    pub fn tick(&mut self, dt: f32) -> anyhow::Result<Step> {
        if let Some(mixer) = self.player.animator_mut() {
            mixer.update(dt);
        }
        let step = self.player.advance()?;
        match step {
            Step::Arrived { at } => info!(%at, "Arrived"),
            Step::Moving { remaining } => debug!(remaining, "Walking"),
            Step::Inactive | Step::Holding => {}
        }
        self.publish_telemetry();
        Ok(step)
    }

    fn publish_telemetry(&self) {
        let transform = self.player.transform();
        let mut t = self.blackboard.write();
        t.position = transform.position;
        t.yaw = transform.yaw;
        t.action = self.player.current_action();
        t.target = self.player.target();
        t.frames += 1;
        t.last_frame_ts = std::time::Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ClipInfo;
    use crate::blackboard::snapshot;
    use crate::bus::Topic;
    use macroquad::math::Vec2;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tilewalk_motion::Action;
    use tokio::sync::oneshot;

    const ASPECT: f32 = 1280.0 / 800.0;
    const EPSILON: f32 = 1e-3;

    struct Harness {
        game: Game,
        input: Topic<InputEvent>,
        bb: Blackboard,
        loader: Option<oneshot::Sender<anyhow::Result<LoadedModel>>>,
    }

    fn harness() -> Harness {
        let input = Topic::new(16);
        let bb: Blackboard = Arc::default();
        let (tx, rx) = oneshot::channel();
        let game = Game::new(&Settings::default(), rx, input.subscribe(), bb.clone()).unwrap();
        Harness {
            game,
            input,
            bb,
            loader: Some(tx),
        }
    }

    fn model(names: &[&str]) -> LoadedModel {
        LoadedModel {
            path: PathBuf::from("models/test.glb"),
            scale: 25.0,
            clips: names
                .iter()
                .map(|name| ClipInfo {
                    name: name.to_string(),
                    duration: 1.0,
                })
                .collect(),
        }
    }

    fn finish(h: &mut Harness, result: anyhow::Result<LoadedModel>) {
        h.loader.take().unwrap().send(result).unwrap();
        h.game.poll_load();
    }

    #[test]
    fn test_pending_load_is_left_alone() {
        let mut h = harness();
        h.game.poll_load();
        assert!(!h.game.player().is_loaded());
        assert_eq!(snapshot(&h.bb).load, LoadStatus::Loading);
    }

    #[test]
    fn test_load_success_starts_idle_with_bubble() {
        let mut h = harness();
        finish(&mut h, Ok(model(&["CharacterArmature|Idle", "CharacterArmature|Run", "CharacterArmature|Wave"])));

        assert!(h.game.player().is_loaded());
        assert_eq!(h.game.player().current_action(), Some(Action::Idle));
        assert_eq!(h.game.player().chat_bubble().unwrap().text, "Hello! world");
        assert_eq!(h.game.model().unwrap().clips.len(), 3);
        assert_eq!(snapshot(&h.bb).load, LoadStatus::Loaded);
    }

    #[test]
    fn test_load_error_records_fault() {
        let mut h = harness();
        finish(&mut h, Err(anyhow::anyhow!("file not found")));

        assert!(!h.game.player().is_loaded());
        let t = snapshot(&h.bb);
        assert_eq!(t.load, LoadStatus::Failed);
        assert_eq!(t.faults.len(), 1);
        assert!(t.faults[0].contains("file not found"));
    }

    #[test]
    fn test_missing_run_clip_keeps_player_unloaded() {
        let mut h = harness();
        finish(&mut h, Ok(model(&["CharacterArmature|Idle"])));

        assert!(!h.game.player().is_loaded());
        assert!(h.game.model().is_none());
        assert!(h.game.load_failed());
        assert_eq!(snapshot(&h.bb).load, LoadStatus::Failed);
    }

    #[test]
    fn test_dropped_loader_fails() {
        let mut h = harness();
        drop(h.loader.take());
        h.game.poll_load();
        assert_eq!(snapshot(&h.bb).load, LoadStatus::Failed);
    }

    #[test]
    fn test_hover_highlights_tile() {
        let mut h = harness();
        h.input.publish(InputEvent::PointerMove { ndc: Vec2::ZERO });
        h.game.handle_input(ASPECT);
        assert_eq!(h.game.highlighted(), Some(GridPoint::new(5, 5)));

        h.input.publish(InputEvent::PointerMove { ndc: Vec2::new(0.0, 0.99) });
        h.game.handle_input(ASPECT);
        assert_eq!(h.game.highlighted(), None);
    }

    #[test]
    fn test_click_before_load_is_ignored() {
        let mut h = harness();
        h.input.publish(InputEvent::PointerDown { ndc: Vec2::new(0.3, -0.2) });
        h.game.handle_input(ASPECT);
        assert_eq!(h.game.tick(0.016).unwrap(), Step::Inactive);
        assert!(h.game.player().target().is_none());
        assert_eq!(h.game.player().position(), tilewalk_motion::Vec3::ZERO);
    }

    #[test]
    fn test_click_walks_player_to_hit_point() {
        let mut h = harness();
        finish(&mut h, Ok(model(&["CharacterArmature|Idle", "CharacterArmature|Run"])));

        let cell = h.game.grid().cell(GridPoint::new(7, 5)).unwrap().center();
        let top = macroquad::math::Vec3::new(cell.x, 0.5, cell.z);
        let ndc = h.game.camera().world_to_ndc(top, ASPECT).unwrap();
        h.input.publish(InputEvent::PointerDown { ndc });
        h.game.handle_input(ASPECT);

        let target = h.game.player().target().unwrap();
        assert!((target.x - cell.x).abs() < 0.5);
        assert!((target.z - cell.z).abs() < 0.5);

        assert!(matches!(h.game.tick(0.016).unwrap(), Step::Moving { .. }));
        assert_eq!(h.game.player().current_action(), Some(Action::Run));

        let mut arrived = false;
        for _ in 0..100 {
            if let Step::Arrived { at } = h.game.tick(0.016).unwrap() {
                assert!((at.x - target.x).abs() < EPSILON);
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert_eq!(h.game.player().current_action(), Some(Action::Idle));

        let t = snapshot(&h.bb);
        assert!(t.target.is_none());
        assert_eq!(t.action, Some(Action::Idle));
        assert!(t.frames >= 2);
    }

    #[test]
    fn test_escape_requests_quit() {
        let mut h = harness();
        h.input.publish(InputEvent::Key(KeyCode::Space));
        h.game.handle_input(ASPECT);
        assert!(!h.game.quit_requested());
        h.input.publish(InputEvent::Key(KeyCode::Escape));
        h.game.handle_input(ASPECT);
        assert!(h.game.quit_requested());
    }
}
