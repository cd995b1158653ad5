//! Animation labels and the enum-keyed clip table.
//!
//! Model files name their clips `Armature|Label` (for example
//! `CharacterArmature|Idle`). Only the segment after the last `|` is used as
//! the label, and only the labels in [`Action`] are kept.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Animation states the player can be in.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Standing still.
    Idle,
    /// Walking toward a target.
    Run,
}

impl Action {
    /// Every action, in table order.
    pub const ALL: [Action; 2] = [Action::Idle, Action::Run];

    /// The clip label this action is bound to.
    pub const fn label(self) -> &'static str {
        match self {
            Action::Idle => "Idle",
            Action::Run => "Run",
        }
    }

    /// Look up an action by its exact, case-sensitive label.
    pub fn from_label(label: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|action| action.label() == label)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returns the label part of a clip name: everything after the last `|`, or
/// the whole name when there is no delimiter.
pub fn clip_label(name: &str) -> &str {
    name.rsplit('|').next().unwrap_or(name)
}

/// Play/stop/fade capability of whatever owns the actual animation clips.
///
/// The state machine only ever hands back handles it received at load time.
pub trait Animator {
    /// Opaque reference to one clip.
    type Handle: Clone;

    /// Start (or restart) playback of a clip.
    fn play(&mut self, handle: &Self::Handle);

    /// Stop a clip immediately.
    fn stop(&mut self, handle: &Self::Handle);

    /// Fade a clip out over `seconds`.
    fn fade_out(&mut self, handle: &Self::Handle, seconds: f32);
}

/// One clip handle per [`Action`], validated to be complete at construction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTable<H> {
    idle: H,
    run: H,
}

impl<H> AnimationTable<H> {
    /// Construct a table from explicit handles.
    pub const fn new(idle: H, run: H) -> Self {
        AnimationTable { idle, run }
    }

    /// Build a table from `(clip name, handle)` pairs as delivered by a model
    /// loader.
    ///
    /// Clip names are reduced with [`clip_label`] and matched exactly against
    /// [`Action::label`]. The first clip for a label wins; unrelated clips are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `Err(MotionError::MissingAnimation(action))` for the first
    /// action that has no matching clip.
    pub fn from_clips<I, S>(clips: I) -> Result<Self, MotionError>
    where
        I: IntoIterator<Item = (S, H)>,
        S: AsRef<str>,
    {
        let mut idle = None;
        let mut run = None;

        for (name, handle) in clips {
            let slot = match Action::from_label(clip_label(name.as_ref())) {
                Some(Action::Idle) => &mut idle,
                Some(Action::Run) => &mut run,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(handle);
            }
        }

        let idle = idle.ok_or(MotionError::MissingAnimation(Action::Idle))?;
        let run = run.ok_or(MotionError::MissingAnimation(Action::Run))?;
        Ok(AnimationTable { idle, run })
    }

    /// The handle bound to `action`.
    pub fn get(&self, action: Action) -> &H {
        match action {
            Action::Idle => &self.idle,
            Action::Run => &self.run,
        }
    }
}
