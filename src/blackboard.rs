use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use tilewalk_motion::{Action, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Loaded,
    /// Load failed; the player stays unloaded for the rest of the session.
    Failed,
}

#[derive(Clone, Debug)]
pub struct Telemetry {
    pub position: Vec3,
    pub yaw: f32,
    pub action: Option<Action>,
    pub target: Option<Vec3>,
    pub load: LoadStatus,
    pub frames: u64,
    pub last_frame_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for Telemetry {
    fn default() -> Self {
        Telemetry {
            position: Vec3::ZERO,
            yaw: 0.0,
            action: None,
            target: None,
            load: LoadStatus::Loading,
            frames: 0,
            last_frame_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<Telemetry>>;

pub fn snapshot(bb: &Blackboard) -> Telemetry {
    (*bb.read()).clone()
}

pub fn set_load_status(bb: &Blackboard, status: LoadStatus) {
    bb.write().load = status;
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
