//! Ground detection: gathers nearby surface candidates and picks the one the body
//! should stand on.

use crate::prelude::*;

/// Maximum number of overlapping colliders considered per probe.
pub const MAX_PROBE_HITS: usize = 16;

/// A collider overlapping the probe sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    pub entity: Entity,
    /// Point on the collider's surface closest to the probe center.
    pub closest_point: Vec3,
}

/// Fixed-capacity scratch buffer filled by a [`SurfaceQuery`].
#[derive(Clone, Debug)]
pub struct ProbeHits {
    hits: Vec<SurfaceHit>,
}

impl Default for ProbeHits {
    fn default() -> Self {
        Self {
            hits: Vec::with_capacity(MAX_PROBE_HITS),
        }
    }
}

impl ProbeHits {
    /// Records a hit. Returns `false` once the buffer is full, at which point the
    /// query should stop producing candidates.
    pub fn push(&mut self, hit: SurfaceHit) -> bool {
        if self.hits.len() < MAX_PROBE_HITS {
            self.hits.push(hit);
        }
        !self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.hits.len() >= MAX_PROBE_HITS
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SurfaceHit> {
        self.hits.iter()
    }
}

/// Geometry backend used by [`GroundProbe`].
///
/// Implementations push every collider overlapping the sphere into `hits`, along
/// with the point on that collider closest to `center`, and stop as soon as
/// [`ProbeHits::push`] returns `false`. Results must be deterministic for a static
/// scene.
pub trait SurfaceQuery {
    fn overlap_sphere(&self, center: Vec3, radius: f32, hits: &mut ProbeHits);
}

/// The surface chosen as ground for this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceContact {
    pub entity: Entity,
    pub point: Vec3,
    /// Unit vector from the contact point toward the probe center.
    pub normal: Vec3,
    /// Distance between the probe center and the contact point lifted by half the
    /// probe radius along the normal.
    pub distance: f32,
}

#[derive(Clone, Debug, Default)]
pub struct GroundProbe {
    hits: ProbeHits,
}

impl GroundProbe {
    /// Finds the best ground contact around `position`, or `None` if nothing overlaps.
    ///
    /// The normal is taken from the closest point toward `position` rather than
    /// from the collider's faces, which gives smooth normals over rounded edges.
    pub fn probe(
        &mut self,
        query: &impl SurfaceQuery,
        position: Vec3,
        radius: f32,
    ) -> Option<SurfaceContact> {
        self.hits.clear();
        query.overlap_sphere(position, radius, &mut self.hits);

        let lift = radius * 0.5;
        self.hits
            .iter()
            .filter_map(|hit| {
                // the center sits on the surface, no direction to derive a normal from
                let normal = (position - hit.closest_point).try_normalize()?;
                Some(SurfaceContact {
                    entity: hit.entity,
                    point: hit.closest_point,
                    normal,
                    distance: position.distance(hit.closest_point + normal * lift),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Candidates gathered by the last call to [`Self::probe`].
    pub fn hits(&self) -> &ProbeHits {
        &self.hits
    }
}
