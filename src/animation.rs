//! Clip playback for the loaded player model.
//!
//! [`ClipMixer`] is the concrete [`Animator`] the player state machine drives.
//! It keeps one playback slot per clip in the model, loops clip time, and
//! handles fade-outs. The renderer reads [`ClipMixer::dominant`] to animate
//! the avatar body.

use tilewalk_motion::Animator;

/// Index of a clip inside a [`ClipMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(usize);

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    /// Clip length in seconds; zero for single-pose clips
    duration: f32,
    time: f32,
    weight: f32,
    playing: bool,
    /// Weight lost per second while fading out
    fade_rate: Option<f32>,
}

/// The clip with the highest weight, as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveClip<'a> {
    pub name: &'a str,
    /// Position within the loop, in `[0, 1)`
    pub phase: f32,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub struct ClipMixer {
    slots: Vec<Slot>,
}

impl ClipMixer {
    /// Build a mixer from `(clip name, duration in seconds)` pairs. Nothing
    /// plays until asked.
    pub fn new<I>(clips: I) -> Self
    where
        I: IntoIterator<Item = (String, f32)>,
    {
        let slots = clips
            .into_iter()
            .map(|(name, duration)| Slot {
                name,
                duration: duration.max(0.0),
                time: 0.0,
                weight: 0.0,
                playing: false,
                fade_rate: None,
            })
            .collect();
        ClipMixer { slots }
    }

    /// Every clip name with its handle, in model order.
    pub fn handles(&self) -> impl Iterator<Item = (&str, ClipId)> + '_ {
        self.slots.iter().enumerate().map(|(i, slot)| (slot.name.as_str(), ClipId(i)))
    }

    pub fn is_playing(&self, id: ClipId) -> bool {
        self.slots.get(id.0).is_some_and(|slot| slot.playing)
    }

    /// Advance clip time by `dt` seconds and apply fades.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        for slot in self.slots.iter_mut().filter(|slot| slot.playing) {
            slot.time += dt;
            if slot.duration > 0.0 {
                slot.time %= slot.duration;
            }
            if let Some(rate) = slot.fade_rate {
                slot.weight -= rate * dt;
                if slot.weight <= 0.0 {
                    slot.weight = 0.0;
                    slot.playing = false;
                    slot.fade_rate = None;
                }
            }
        }
    }

    /// The playing clip with the highest weight.
    pub fn dominant(&self) -> Option<ActiveClip<'_>> {
        self.slots
            .iter()
            .filter(|slot| slot.playing)
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
            .map(|slot| ActiveClip {
                name: &slot.name,
                phase: if slot.duration > 0.0 { slot.time / slot.duration } else { 0.0 },
                weight: slot.weight,
            })
    }
}

impl Animator for ClipMixer {
    type Handle = ClipId;

    fn play(&mut self, handle: &ClipId) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.time = 0.0;
            slot.weight = 1.0;
            slot.playing = true;
            slot.fade_rate = None;
        }
    }

    fn stop(&mut self, handle: &ClipId) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.weight = 0.0;
            slot.playing = false;
            slot.fade_rate = None;
        }
    }

    fn fade_out(&mut self, handle: &ClipId, seconds: f32) {
        if seconds <= 0.0 {
            self.stop(handle);
            return;
        }
        if let Some(slot) = self.slots.get_mut(handle.0).filter(|slot| slot.playing) {
            slot.fade_rate = Some(slot.weight / seconds);
        }
    }
}
