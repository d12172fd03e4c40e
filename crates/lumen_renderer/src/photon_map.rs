//! Photon map: a balanced k-d tree over stored photons.
//!
//! Photons live in an arena in insertion order. The tree is a separate array
//! of nodes that index into the arena; balancing permutes the nodes so that
//! the median of every subrange sits at the subrange's middle. Children of
//! the node covering `[lo, hi)` are the ranges on either side of it, so no
//! child pointers are stored.
//!
//! Lifecycle during a render: photons are stored, the map is balanced once
//! and power-scaled once, then it is only read.

use crate::{Color, Photon};
use lumen_math::Vec3;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::PI;

/// Fewer qualifying photons than this and the estimate is reported as zero.
pub const MIN_ESTIMATE_PHOTONS: usize = 8;

/// Subtrees larger than this are balanced on the rayon pool.
const PARALLEL_BALANCE_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct KdNode {
    photon: u32,
    axis: u8,
}

/// A photon found by a nearest-neighbor query.
#[derive(Debug, Clone, Copy)]
pub struct NearPhoton<'a> {
    pub photon: &'a Photon,
    /// Squared distance from the query point.
    pub dist2: f32,
}

/// Max-heap entry ordered by distance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist2: f32,
    photon: u32,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then(self.photon.cmp(&other.photon))
    }
}

/// Spatial index of photons supporting k-nearest-neighbor density estimates.
#[derive(Debug, Clone)]
pub struct PhotonMap {
    photons: Vec<Photon>,
    tree: Vec<KdNode>,
    capacity: usize,
    /// Photons before this index have already been power-scaled.
    scaled: usize,
}

impl PhotonMap {
    /// Create an empty map holding at most `capacity` photons.
    pub fn new(capacity: usize) -> Self {
        Self {
            photons: Vec::with_capacity(capacity),
            tree: Vec::new(),
            capacity,
            scaled: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.photons.len() >= self.capacity
    }

    /// True once every stored photon is part of the k-d tree.
    pub fn is_balanced(&self) -> bool {
        self.tree.len() == self.photons.len()
    }

    /// Stored photons in insertion order.
    pub fn photons(&self) -> &[Photon] {
        &self.photons
    }

    /// Drop all photons, keeping the capacity.
    pub fn clear(&mut self) {
        self.photons.clear();
        self.tree.clear();
        self.scaled = 0;
    }

    /// Store a photon. Returns false, storing nothing, once the map is full.
    pub fn store(&mut self, power: Color, position: Vec3, direction: Vec3) -> bool {
        if self.is_full() {
            return false;
        }
        self.photons.push(Photon::new(position, power, direction));
        true
    }

    /// Multiply the power of every photon stored since the previous call.
    ///
    /// Photons are scaled exactly once no matter how often this is called.
    pub fn scale_power(&mut self, factor: f32) {
        for photon in &mut self.photons[self.scaled..] {
            photon.power *= factor;
        }
        self.scaled = self.photons.len();
    }

    /// Rebuild the k-d tree over all stored photons.
    pub fn balance(&mut self) {
        let photons = &self.photons;
        self.tree.clear();
        self.tree.extend((0..photons.len() as u32).map(|photon| KdNode { photon, axis: 0 }));
        build_subtree(&mut self.tree, photons);
    }

    /// Up to `k` photons nearest to `position` within `max_dist2`, closest first.
    ///
    /// An unbalanced map is searched exhaustively.
    pub fn nearest(&self, position: Vec3, k: usize, max_dist2: f32) -> Vec<NearPhoton<'_>> {
        if k == 0 || self.photons.is_empty() {
            return Vec::new();
        }

        let mut heap = BinaryHeap::with_capacity(k + 1);
        if self.is_balanced() {
            self.search(0, self.tree.len(), position, k, max_dist2, &mut heap);
        } else {
            for index in 0..self.photons.len() {
                self.consider(index as u32, position, k, max_dist2, &mut heap);
            }
        }

        heap.into_sorted_vec()
            .into_iter()
            .map(|c| NearPhoton {
                photon: &self.photons[c.photon as usize],
                dist2: c.dist2,
            })
            .collect()
    }

    /// Irradiance at a surface point from the `k` nearest photons.
    ///
    /// Only photons arriving against `normal` count. The summed power is
    /// divided by the disc area `π r²`, with `r` either the fixed `radius`
    /// (which also bounds the search) or the distance to the farthest
    /// counted photon.
    pub fn irradiance_estimate(
        &self,
        position: Vec3,
        normal: Vec3,
        radius: Option<f32>,
        k: usize,
    ) -> Color {
        let max_dist2 = radius.map_or(f32::INFINITY, |r| r * r);

        let mut flux = Color::ZERO;
        let mut found = 0;
        let mut farthest2 = 0.0_f32;
        for near in self.nearest(position, k, max_dist2) {
            if near.photon.direction().dot(normal) < 0.0 {
                flux += near.photon.power;
                found += 1;
                farthest2 = farthest2.max(near.dist2);
            }
        }

        if found < MIN_ESTIMATE_PHOTONS {
            return Color::ZERO;
        }

        let r2 = radius.map_or(farthest2, |r| r * r);
        if r2 <= 0.0 {
            return Color::ZERO;
        }
        flux / (PI * r2)
    }

    fn search(
        &self,
        lo: usize,
        hi: usize,
        query: Vec3,
        k: usize,
        max_dist2: f32,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let node = self.tree[mid];
        let axis = node.axis as usize;
        let delta = query[axis] - self.photons[node.photon as usize].position[axis];

        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };

        self.search(near.0, near.1, query, k, max_dist2, heap);
        self.consider(node.photon, query, k, max_dist2, heap);
        if delta * delta < search_bound(heap, k, max_dist2) {
            self.search(far.0, far.1, query, k, max_dist2, heap);
        }
    }

    #[inline]
    fn consider(
        &self,
        photon: u32,
        query: Vec3,
        k: usize,
        max_dist2: f32,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        let dist2 = (self.photons[photon as usize].position - query).length_squared();
        if dist2 > search_bound(heap, k, max_dist2) {
            return;
        }
        heap.push(Candidate { dist2, photon });
        if heap.len() > k {
            heap.pop();
        }
    }
}

/// Current squared search radius: the k-th best distance once k photons are
/// known, the caller's limit before that.
#[inline]
fn search_bound(heap: &BinaryHeap<Candidate>, k: usize, max_dist2: f32) -> f32 {
    match heap.peek() {
        Some(worst) if heap.len() >= k => worst.dist2.min(max_dist2),
        _ => max_dist2,
    }
}

/// Median-split the nodes on the axis of largest spread and recurse.
fn build_subtree(nodes: &mut [KdNode], photons: &[Photon]) {
    if nodes.len() <= 1 {
        return;
    }

    let axis = widest_axis(nodes, photons);
    let mid = nodes.len() / 2;
    nodes.select_nth_unstable_by(mid, |a, b| {
        let pa = photons[a.photon as usize].position[axis];
        let pb = photons[b.photon as usize].position[axis];
        pa.total_cmp(&pb)
    });
    nodes[mid].axis = axis as u8;

    let (left, rest) = nodes.split_at_mut(mid);
    let right = &mut rest[1..];
    if left.len() + right.len() > PARALLEL_BALANCE_THRESHOLD {
        rayon::join(|| build_subtree(left, photons), || build_subtree(right, photons));
    } else {
        build_subtree(left, photons);
        build_subtree(right, photons);
    }
}

fn widest_axis(nodes: &[KdNode], photons: &[Photon]) -> usize {
    let (min, max) = nodes.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), node| {
            let p = photons[node.photon as usize].position;
            (min.min(p), max.max(p))
        },
    );
    let extent = max - min;

    if extent.x > extent.y && extent.x > extent.z {
        0
    } else if extent.y > extent.z {
        1
    } else {
        2
    }
}
