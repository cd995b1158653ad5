//! Ray picking against grid tiles.
//!
//! Each tile is treated as an axis-aligned box `cell_size` wide and deep and
//! `thickness` tall, centered on the cell center. A ray is tested against
//! every tile with the slab method and hits come back nearest first.

use crate::map::{Grid, GridPoint, WorldPoint};

/// Below this magnitude a direction component is treated as parallel to the slab.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: WorldPoint,
    direction: WorldPoint,
}

impl Ray {
    /// Creates a ray, normalizing `direction`. Returns `None` when the
    /// direction has zero or non-finite length.
    pub fn new(origin: WorldPoint, direction: WorldPoint) -> Option<Self> {
        let len = direction.length();
        if !(len > 0.0 && len.is_finite()) {
            return None;
        }
        Some(Ray {
            origin,
            direction: direction * (1.0 / len),
        })
    }

    /// Creates a ray from `from` through `through`.
    pub fn through(from: WorldPoint, through: WorldPoint) -> Option<Self> {
        Ray::new(from, through - from)
    }

    /// Ray origin.
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Unit direction.
    pub fn direction(&self) -> WorldPoint {
        self.direction
    }

    /// Point `distance` units along the ray.
    pub fn point_at(&self, distance: f32) -> WorldPoint {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to the first surface of the box `[min, max]`,
    /// or `None` if the ray misses it. A ray starting inside the box reports
    /// the exit distance.
    pub fn intersect_box(&self, min: WorldPoint, max: WorldPoint) -> Option<f32> {
        let inv = |d: f32| if d.abs() > PARALLEL_EPSILON { 1.0 / d } else { f32::MAX };
        let inv_dir = WorldPoint::new(inv(self.direction.x), inv(self.direction.y), inv(self.direction.z));

        let t1 = (min.x - self.origin.x) * inv_dir.x;
        let t2 = (max.x - self.origin.x) * inv_dir.x;
        let t3 = (min.y - self.origin.y) * inv_dir.y;
        let t4 = (max.y - self.origin.y) * inv_dir.y;
        let t5 = (min.z - self.origin.z) * inv_dir.z;
        let t6 = (max.z - self.origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        if tmax < 0.0 || tmin > tmax {
            return None;
        }
        Some(if tmin >= 0.0 { tmin } else { tmax })
    }
}

/// One tile hit by a pick ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The tile that was hit.
    pub cell: GridPoint,
    /// Where the ray entered the tile.
    pub point: WorldPoint,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

impl Grid {
    /// All tiles the ray passes through, nearest first. Empty when the ray
    /// misses the floor.
    ///
    /// # Arguments
    /// * `ray` - Pick ray, usually from the camera through the pointer
    /// * `thickness` - Height of each tile box, centered on `y = 0`
    pub fn pick(&self, ray: &Ray, thickness: f32) -> Vec<PickHit> {
        let half = WorldPoint::new(self.cell_size() / 2.0, thickness.max(0.0) / 2.0, self.cell_size() / 2.0);

        let mut hits: Vec<PickHit> = self
            .cells()
            .filter_map(|cell| {
                let center = cell.center();
                let distance = ray.intersect_box(center - half, center + half)?;
                Some(PickHit {
                    cell: cell.point(),
                    point: ray.point_at(distance),
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// The nearest tile hit by the ray.
    pub fn pick_nearest(&self, ray: &Ray, thickness: f32) -> Option<PickHit> {
        self.pick(ray, thickness).into_iter().next()
    }
}
