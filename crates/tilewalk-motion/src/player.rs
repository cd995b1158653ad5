//! The player state machine.
//!
//! A [`Player`] starts out unloaded: it has a position but no clips, and both
//! [`Player::set_target`] and [`Player::advance`] do nothing. Once the model
//! loader hands over an animator and a complete [`AnimationTable`],
//! [`Player::finish_loading`] starts the Idle clip and the player begins to
//! respond to targets.
//!
//! Each call to [`Player::advance`] is one tick:
//!
//! ```text
//!   no target ──────────────────────────────▶ Holding
//!   distance <= ARRIVAL_THRESHOLD ──────────▶ snap, Idle, Arrived
//!   velocity >= distance (would overshoot) ─▶ snap, Idle, Arrived
//!   otherwise ──────────────────────────────▶ step by velocity, Run, Moving
//! ```

use alloc::string::String;

use crate::animation::{Action, AnimationTable, Animator};
use crate::entity::{Avatar, Entity};
use crate::error::MotionError;
use crate::{ARRIVAL_THRESHOLD, DEFAULT_VELOCITY, Transform, Vec3};

/// Text that floats above the player and follows it horizontally.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatBubble {
    /// Text shown in the bubble.
    pub text: String,
    /// World anchor of the bubble.
    pub position: Vec3,
    /// Height of the anchor above the player's feet.
    pub height: f32,
}

impl ChatBubble {
    /// A bubble showing `text`, anchored `height` units above its owner.
    pub fn new(text: impl Into<String>, height: f32) -> Self {
        ChatBubble {
            text: text.into(),
            position: Vec3::new(0.0, height, 0.0),
            height,
        }
    }

    fn follow(&mut self, owner: Vec3) {
        self.position.x = owner.x;
        self.position.z = owner.z;
    }
}

/// Outcome of one [`Player::advance`] tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The model has not loaded yet; nothing happened.
    Inactive,
    /// Loaded, but there is no target.
    Holding,
    /// Took one step; `remaining` is the distance still left to the target.
    Moving {
        /// Distance left after this step.
        remaining: f32,
    },
    /// Reached the target this tick and switched to Idle.
    Arrived {
        /// The point the player snapped to.
        at: Vec3,
    },
}

/// A click-to-move player.
pub struct Player<A: Animator> {
    entity: Entity<A::Handle>,
    animator: Option<A>,
    velocity: f32,
    target: Option<Vec3>,
    chat_bubble: Option<ChatBubble>,
}

impl<A: Animator> Player<A> {
    /// Construct an unloaded player at `position` that moves `velocity` world
    /// units per tick.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::InvalidVelocity)` if `velocity` is not
    /// positive and finite.
    pub fn new(position: Vec3, velocity: f32) -> Result<Self, MotionError> {
        if !(velocity > 0.0 && velocity.is_finite()) {
            return Err(MotionError::InvalidVelocity("must be positive and finite"));
        }
        Ok(Player {
            entity: Entity::new(Transform::new(position, 0.0)),
            animator: None,
            velocity,
            target: None,
            chat_bubble: None,
        })
    }

    /// An unloaded player at the origin with [`DEFAULT_VELOCITY`].
    pub fn with_default_velocity() -> Self {
        Player {
            entity: Entity::new(Transform::default()),
            animator: None,
            velocity: DEFAULT_VELOCITY,
            target: None,
            chat_bubble: None,
        }
    }

    /// Complete the one-time `Unloaded → Loaded{Idle}` transition: take
    /// ownership of the animator, install the clip table and start Idle.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::AlreadyLoaded)` if called a second time; the
    /// existing animator and clips are kept.
    pub fn finish_loading(&mut self, animator: A, clips: AnimationTable<A::Handle>) -> Result<(), MotionError> {
        if self.animator.is_some() {
            return Err(MotionError::AlreadyLoaded("load transition fires once"));
        }
        self.entity.install_clips(clips);
        let animator = self.animator.insert(animator);
        self.entity.transition(animator, Action::Idle)?;
        Ok(())
    }

    /// Whether the load transition has happened.
    pub fn is_loaded(&self) -> bool {
        self.animator.is_some()
    }

    /// Set the point to walk to, replacing any previous target.
    ///
    /// Ignored while unloaded. Returns whether the target was recorded.
    pub fn set_target(&mut self, point: Vec3) -> bool {
        if !self.is_loaded() {
            return false;
        }
        self.target = Some(point);
        true
    }

    /// Current target, if walking.
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Step length per tick.
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// World position.
    pub fn position(&self) -> Vec3 {
        self.entity.transform.position
    }

    /// Attach a chat bubble; it is placed over the player immediately.
    pub fn attach_chat_bubble(&mut self, mut bubble: ChatBubble) {
        bubble.follow(self.position());
        self.chat_bubble = Some(bubble);
    }

    /// The attached chat bubble.
    pub fn chat_bubble(&self) -> Option<&ChatBubble> {
        self.chat_bubble.as_ref()
    }

    /// The animator, once loaded.
    pub fn animator(&self) -> Option<&A> {
        self.animator.as_ref()
    }

    /// Mutable access to the animator, for advancing clip time.
    pub fn animator_mut(&mut self) -> Option<&mut A> {
        self.animator.as_mut()
    }

    /// Advance one tick.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::NotLoaded)` if an animator is present but the
    /// clip table is not, which indicates a broken load transition.
    pub fn advance(&mut self) -> Result<Step, MotionError> {
        let Some(animator) = self.animator.as_mut() else {
            return Ok(Step::Inactive);
        };
        let Some(target) = self.target else {
            return Ok(Step::Holding);
        };

        let position = self.entity.transform.position;
        let distance = position.distance(target);

        if distance <= ARRIVAL_THRESHOLD {
            return self.arrive(target);
        }

        let Some(direction) = (target - position).normalize() else {
            return self.arrive(target);
        };
        self.entity.transform.face(direction);

        if self.velocity >= distance {
            return self.arrive(target);
        }

        self.entity.transform.position = position + direction * self.velocity;
        self.entity.transition(animator, Action::Run)?;
        self.sync_bubble();

        Ok(Step::Moving {
            remaining: self.entity.transform.position.distance(target),
        })
    }

    fn arrive(&mut self, target: Vec3) -> Result<Step, MotionError> {
        self.entity.transform.position = target;
        self.target = None;
        if let Some(animator) = self.animator.as_mut() {
            self.entity.transition(animator, Action::Idle)?;
        }
        self.sync_bubble();
        Ok(Step::Arrived { at: target })
    }

    fn sync_bubble(&mut self) {
        let position = self.entity.transform.position;
        if let Some(bubble) = self.chat_bubble.as_mut() {
            bubble.follow(position);
        }
    }
}

impl<A: Animator> Avatar for Player<A> {
    fn transform(&self) -> Transform {
        self.entity.transform
    }

    fn current_action(&self) -> Option<Action> {
        self.entity.playing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f32 = 1e-4;

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<(&'static str, &'static str)>,
    }

    impl Animator for Recorder {
        type Handle = &'static str;
        fn play(&mut self, handle: &&'static str) {
            self.events.push(("play", handle));
        }
        fn stop(&mut self, handle: &&'static str) {
            self.events.push(("stop", handle));
        }
        fn fade_out(&mut self, handle: &&'static str, _seconds: f32) {
            self.events.push(("fade", handle));
        }
    }

    fn loaded_player(position: Vec3, velocity: f32) -> Player<Recorder> {
        let mut player = Player::new(position, velocity).unwrap();
        let clips = AnimationTable::from_clips([
            ("CharacterArmature|Idle", "idle"),
            ("CharacterArmature|Run", "run"),
        ])
        .unwrap();
        player.finish_loading(Recorder::default(), clips).unwrap();
        player
    }

    fn events(player: &Player<Recorder>) -> &[(&'static str, &'static str)] {
        &player.animator().unwrap().events
    }

    #[test]
    fn test_invalid_velocity() {
        for v in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                Player::<Recorder>::new(Vec3::ZERO, v),
                Err(MotionError::InvalidVelocity(_))
            ));
        }
        assert_eq!(Player::<Recorder>::with_default_velocity().velocity(), DEFAULT_VELOCITY);
    }

    #[test]
    fn test_unloaded_guard() {
        let mut player = Player::<Recorder>::new(Vec3::ZERO, 5.0).unwrap();
        assert!(!player.set_target(Vec3::new(0.0, 0.0, 100.0)));
        assert_eq!(player.advance(), Ok(Step::Inactive));
        assert_eq!(player.position(), Vec3::ZERO);
        assert_eq!(player.target(), None);
        assert_eq!(player.current_action(), None);
    }

    #[test]
    fn test_finish_loading_plays_idle() {
        let player = loaded_player(Vec3::ZERO, 5.0);
        assert!(player.is_loaded());
        assert_eq!(player.current_action(), Some(Action::Idle));
        assert_eq!(events(&player), &[("play", "idle")]);
    }

    #[test]
    fn test_finish_loading_twice() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        let clips = AnimationTable::new("other-idle", "other-run");
        assert!(matches!(
            player.finish_loading(Recorder::default(), clips),
            Err(MotionError::AlreadyLoaded(_))
        ));
        assert_eq!(events(&player), &[("play", "idle")]);
    }

    #[test]
    fn test_advance_without_target_is_noop() {
        let mut player = loaded_player(Vec3::new(3.0, 0.0, -2.0), 5.0);
        let before = player.transform();
        for _ in 0..3 {
            assert_eq!(player.advance(), Ok(Step::Holding));
        }
        assert_eq!(player.transform(), before);
        assert_eq!(player.current_action(), Some(Action::Idle));
        assert_eq!(events(&player).len(), 1);
    }

    #[test]
    fn test_approach_moves_by_velocity() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(30.0, 0.0, 40.0));

        let step = player.advance().unwrap();
        let p = player.position();
        assert!((p.x - 3.0).abs() < EPSILON);
        assert!((p.y - 0.0).abs() < EPSILON);
        assert!((p.z - 4.0).abs() < EPSILON);
        assert!(matches!(step, Step::Moving { remaining } if (remaining - 45.0).abs() < EPSILON));
        assert_eq!(player.current_action(), Some(Action::Run));
        assert!((player.transform().yaw - libm::atan2f(0.6, 0.8)).abs() < EPSILON);
        assert_eq!(events(&player), &[("play", "idle"), ("stop", "idle"), ("play", "run")]);
    }

    #[test]
    fn test_run_clip_started_once() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(-100.0, 0.0, 0.0));
        for _ in 0..5 {
            player.advance().unwrap();
        }
        assert_eq!(events(&player).iter().filter(|e| **e == ("play", "run")).count(), 1);
    }

    #[test]
    fn test_arrival_within_threshold() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(0.0, 0.0, 40.0));
        player.advance().unwrap();
        assert_eq!(player.current_action(), Some(Action::Run));

        player.set_target(Vec3::new(3.0, 0.0, 9.0)); // 5 units from (0,0,5)
        let step = player.advance().unwrap();
        assert_eq!(step, Step::Arrived { at: Vec3::new(3.0, 0.0, 9.0) });
        assert_eq!(player.target(), None);
        assert_eq!(player.current_action(), Some(Action::Idle));
        assert_eq!(events(&player).last(), Some(&("play", "idle")));
    }

    #[test]
    fn test_arrival_while_idle_does_not_restart_clip() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(player.advance(), Ok(Step::Arrived { .. })));
        assert_eq!(events(&player), &[("play", "idle")]);
    }

    #[test]
    fn test_overshoot_snaps_to_target() {
        let mut player = loaded_player(Vec3::ZERO, 20.0);
        let target = Vec3::new(12.0, 0.0, 0.0);
        player.set_target(target);

        assert_eq!(player.advance(), Ok(Step::Arrived { at: target }));
        assert_eq!(player.position(), target);
        assert_eq!(player.target(), None);
        assert_eq!(player.current_action(), Some(Action::Idle));
        assert!((player.transform().yaw - core::f32::consts::FRAC_PI_2).abs() < EPSILON);
    }

    #[test]
    fn test_new_target_replaces_old() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(100.0, 0.0, 0.0));
        player.advance().unwrap();
        player.set_target(Vec3::new(5.0, 0.0, 50.0));
        player.advance().unwrap();
        assert_eq!(player.target(), Some(Vec3::new(5.0, 0.0, 50.0)));
        let p = player.position();
        assert!((p.x - 5.0).abs() < EPSILON);
        assert!((p.z - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_walk_hundred_units() {
        let mut player = loaded_player(Vec3::ZERO, 5.0);
        player.set_target(Vec3::new(0.0, 0.0, 100.0));

        for _ in 0..19 {
            assert!(matches!(player.advance(), Ok(Step::Moving { .. })));
        }
        let p = player.position();
        assert!((p.x - 0.0).abs() < EPSILON);
        assert!((p.z - 95.0).abs() < EPSILON);
        assert_eq!(player.current_action(), Some(Action::Run));

        assert!(matches!(player.advance(), Ok(Step::Arrived { .. })));
        assert_eq!(player.position(), Vec3::new(0.0, 0.0, 100.0));
        assert_eq!(player.current_action(), Some(Action::Idle));

        assert_eq!(player.advance(), Ok(Step::Holding));
    }

    #[test]
    fn test_chat_bubble_follows_horizontally() {
        let mut player = loaded_player(Vec3::new(10.0, 0.0, 10.0), 5.0);
        player.attach_chat_bubble(ChatBubble::new("Hello! world", 60.0));
        assert_eq!(player.chat_bubble().unwrap().position, Vec3::new(10.0, 60.0, 10.0));

        player.set_target(Vec3::new(10.0, 0.0, 50.0));
        player.advance().unwrap();
        let bubble = player.chat_bubble().unwrap();
        assert!((bubble.position.z - 15.0).abs() < EPSILON);
        assert!((bubble.position.x - 10.0).abs() < EPSILON);
        assert_eq!(bubble.position.y, 60.0);
        assert_eq!(bubble.text, "Hello! world");
    }
}
