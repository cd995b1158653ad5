//! Positioned, animated entities.

use crate::animation::{Action, AnimationTable, Animator};
use crate::error::MotionError;
use crate::Transform;

/// Read access shared by everything the renderer draws as an animated body.
pub trait Avatar {
    /// Current world transform.
    fn transform(&self) -> Transform;

    /// The action whose clip is currently playing, if any.
    fn current_action(&self) -> Option<Action>;
}

/// Transform plus animation bookkeeping.
///
/// The clip table is absent until the owning model has loaded. While it is
/// absent, [`Entity::transition`] refuses to touch the animator.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity<H> {
    /// World transform.
    pub transform: Transform,
    clips: Option<AnimationTable<H>>,
    playing: Option<Action>,
}

impl<H: Clone> Entity<H> {
    /// An entity at `transform` with no clips loaded.
    pub const fn new(transform: Transform) -> Self {
        Entity {
            transform,
            clips: None,
            playing: None,
        }
    }

    /// Whether a clip table has been installed.
    pub fn has_clips(&self) -> bool {
        self.clips.is_some()
    }

    /// The installed clip table.
    pub fn clips(&self) -> Option<&AnimationTable<H>> {
        self.clips.as_ref()
    }

    /// The action currently playing.
    pub fn playing(&self) -> Option<Action> {
        self.playing
    }

    /// Install the clip table. Any previous table is replaced and nothing is
    /// playing afterwards.
    pub fn install_clips(&mut self, clips: AnimationTable<H>) {
        self.clips = Some(clips);
        self.playing = None;
    }

    /// Stop whatever is playing and start `action`.
    ///
    /// Switching to the action that is already playing does nothing, so the
    /// clip is not restarted. Returns whether the animator was touched.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::NotLoaded)` if no clip table is installed.
    pub fn transition<A>(&mut self, animator: &mut A, action: Action) -> Result<bool, MotionError>
    where
        A: Animator<Handle = H>,
    {
        let clips = self
            .clips
            .as_ref()
            .ok_or(MotionError::NotLoaded("no clip table installed"))?;

        if self.playing == Some(action) {
            return Ok(false);
        }
        if let Some(current) = self.playing {
            animator.stop(clips.get(current));
        }
        animator.play(clips.get(action));
        self.playing = Some(action);
        Ok(true)
    }

    /// Fade out the playing clip over `seconds` and mark nothing as playing.
    pub fn fade_out<A>(&mut self, animator: &mut A, seconds: f32)
    where
        A: Animator<Handle = H>,
    {
        if let (Some(clips), Some(current)) = (self.clips.as_ref(), self.playing.take()) {
            animator.fade_out(clips.get(current), seconds);
        }
    }
}

impl<H: Clone> Avatar for Entity<H> {
    fn transform(&self) -> Transform {
        self.transform
    }

    fn current_action(&self) -> Option<Action> {
        self.playing
    }
}
