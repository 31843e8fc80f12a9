use crate::constants::{
    FLOATING_ELEMENT_COUNT, FLOATING_SEED, HELIX_HEIGHT, HELIX_PULSE_AMPLITUDE, HELIX_RADIUS,
    HELIX_TURNS, KNOT_NOISE_AMPLITUDE, KNOT_P, KNOT_Q, KNOT_RADIUS, KNOT_TUBE, MORPH_CYCLE_SEC,
    MORPH_GRID_SIZE, MORPH_GRID_SPACING, TERRAIN_AMPLITUDE,
};
use crate::noise::wave_noise;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use rand::prelude::*;
use std::f32::consts::{PI, TAU};

/// Named stretches of the repeating morph cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphPhase {
    Rise,
    HoldTerrain,
    MorphToKnot,
    HoldKnot,
    MorphToHelix,
    HoldHelix,
    Collapse,
    Pause,
}

/// Phase table: each phase ends at the given offset into the cycle.
pub const MORPH_SCHEDULE: [(MorphPhase, f32); 8] = [
    (MorphPhase::Rise, 1.0),
    (MorphPhase::HoldTerrain, 5.0),
    (MorphPhase::MorphToKnot, 8.0),
    (MorphPhase::HoldKnot, 14.0),
    (MorphPhase::MorphToHelix, 17.0),
    (MorphPhase::HoldHelix, 25.0),
    (MorphPhase::Collapse, 28.0),
    (MorphPhase::Pause, MORPH_CYCLE_SEC),
];

#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

#[inline]
fn mix(a: Vec3, b: Vec3, s: f32) -> Vec3 {
    a + (b - a) * s
}

/// Blend factors for one instant. `knot` moves the terrain toward shape A,
/// `helix` moves that result toward shape B; all three stay in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blend {
    pub phase: MorphPhase,
    pub terrain: f32,
    pub knot: f32,
    pub helix: f32,
}

impl Blend {
    pub const FLAT: Self = Self {
        phase: MorphPhase::Pause,
        terrain: 0.0,
        knot: 0.0,
        helix: 0.0,
    };

    pub fn at(time: f32) -> Self {
        let ct = if time.is_finite() {
            time.max(0.0) % MORPH_CYCLE_SEC
        } else {
            0.0
        };
        let mut start = 0.0;
        let mut phase = MorphPhase::Pause;
        for &(p, end) in MORPH_SCHEDULE.iter() {
            if ct < end {
                phase = p;
                break;
            }
            start = end;
        }
        let end = MORPH_SCHEDULE
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, e)| *e)
            .unwrap_or(MORPH_CYCLE_SEC);
        let local = ease_in_out_cubic((ct - start) / (end - start));
        let (terrain, knot, helix) = match phase {
            MorphPhase::Rise => (local, 0.0, 0.0),
            MorphPhase::HoldTerrain => (1.0, 0.0, 0.0),
            MorphPhase::MorphToKnot => (1.0, local, 0.0),
            MorphPhase::HoldKnot => (1.0, 1.0, 0.0),
            MorphPhase::MorphToHelix => (1.0, 1.0, local),
            MorphPhase::HoldHelix => (1.0, 1.0, 1.0),
            MorphPhase::Collapse => (1.0 - local, 1.0 - local, 1.0 - local),
            MorphPhase::Pause => (0.0, 0.0, 0.0),
        };
        Self {
            phase,
            terrain,
            knot,
            helix,
        }
    }

    /// Euler angles (XYZ) presenting the shape; the helix gets an extra tilt.
    pub fn rotation(&self, time: f32) -> Vec3 {
        let helix_tilt = if self.helix > 0.5 { 0.3 } else { 0.0 };
        Vec3::new(
            -0.8 + self.knot * 0.5 + helix_tilt,
            time * 0.08,
            self.knot * (time * 0.1).sin() * 0.1,
        )
    }
}

/// Precomputed vertex sets for the flat grid, the torus knot and the helix.
#[derive(Clone, Debug)]
pub struct MorphField {
    grid: usize,
    base: Vec<Vec3>,
    knot: Vec<Vec3>,
    helix: Vec<Vec3>,
}

impl Default for MorphField {
    fn default() -> Self {
        Self::new(MORPH_GRID_SIZE)
    }
}

impl MorphField {
    pub fn new(grid: usize) -> Self {
        let grid = grid.max(2);
        let n = grid as f32;
        let count = (grid + 1) * (grid + 1);
        let mut base = Vec::with_capacity(count);
        let mut knot = Vec::with_capacity(count);
        let mut helix = Vec::with_capacity(count);
        for i in 0..=grid {
            for j in 0..=grid {
                let fi = i as f32;
                let fj = j as f32;
                base.push(Vec3::new(
                    (fi - n / 2.0) * MORPH_GRID_SPACING,
                    0.0,
                    (fj - n / 2.0) * MORPH_GRID_SPACING,
                ));

                let u = (fi / n) * TAU * KNOT_P;
                let v = (fj / n) * TAU;
                let r = KNOT_RADIUS + KNOT_TUBE * ((KNOT_Q * u) / KNOT_P + v).cos();
                knot.push(Vec3::new(
                    r * u.cos(),
                    r * u.sin(),
                    KNOT_TUBE * ((KNOT_Q * u) / KNOT_P + v).sin(),
                ));

                let hu = (fi / n) * TAU * HELIX_TURNS;
                let hv = (fj / n) * TAU;
                // second half of the columns forms the opposite strand
                let strand = (j / (grid / 2).max(1)) as f32 * PI;
                let swell = 1.0 + 0.3 * hv.cos();
                helix.push(Vec3::new(
                    HELIX_RADIUS * (hu + strand).cos() * swell,
                    (fi / n - 0.5) * HELIX_HEIGHT,
                    HELIX_RADIUS * (hu + strand).sin() * swell,
                ));
            }
        }
        Self {
            grid,
            base,
            knot,
            helix,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    pub fn base(&self) -> &[Vec3] {
        &self.base
    }

    pub fn knot(&self) -> &[Vec3] {
        &self.knot
    }

    pub fn helix(&self) -> &[Vec3] {
        &self.helix
    }

    /// Position of vertex `index` at `time` for the given blend.
    pub fn vertex(&self, index: usize, time: f32, blend: &Blend) -> Vec3 {
        let base = self.base[index];
        let row = (index / (self.grid + 1)) as f32;

        let terrain_y =
            wave_noise(base.x * 3.0, base.z * 3.0, time * 0.5) * TERRAIN_AMPLITUDE * blend.terrain;
        let terrain = Vec3::new(base.x, terrain_y, base.z);

        let k = self.knot[index];
        let wobble =
            wave_noise(k.x * 3.0, k.y * 3.0, time * 0.3) * KNOT_NOISE_AMPLITUDE * blend.terrain;
        let knot = k * (1.0 + wobble);

        let h = self.helix[index];
        let pulse = 1.0 + (time * 2.0 + row * 0.1).sin() * HELIX_PULSE_AMPLITUDE;
        let helix = Vec3::new(h.x * pulse, h.y, h.z * pulse);

        mix(mix(terrain, knot, blend.knot), helix, blend.helix)
    }

    /// Overwrite `out` in place with every vertex for `time`.
    pub fn write_positions(&self, time: f32, out: &mut [Vec3]) -> Blend {
        let blend = Blend::at(time);
        for (i, slot) in out.iter_mut().enumerate().take(self.base.len()) {
            *slot = self.vertex(i, time, &blend);
        }
        blend
    }

    /// Line-list indices: every row segment, then every column segment.
    pub fn line_indices(&self) -> Vec<u16> {
        let g = self.grid;
        let stride = g + 1;
        let mut idx = Vec::with_capacity(4 * g * stride);
        for i in 0..=g {
            for j in 0..g {
                let a = i * stride + j;
                idx.push(a as u16);
                idx.push((a + 1) as u16);
            }
        }
        for i in 0..g {
            for j in 0..=g {
                let a = i * stride + j;
                idx.push(a as u16);
                idx.push((a + stride) as u16);
            }
        }
        idx
    }

    /// Model transform: offset right of the hero text, scaled to the viewport.
    pub fn model_matrix(viewport: Vec2, rotation: Vec3) -> Mat4 {
        let scale = viewport.x.min(viewport.y) * 0.22;
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z),
            Vec3::new(viewport.x * 0.22, 0.0, -1.0),
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct FloatingElement {
    position: Vec3,
    rotation: f32,
    speed: f32,
    size: f32,
    phase: f32,
}

/// Small wireframe octahedra drifting across the whole viewport.
#[derive(Clone, Debug)]
pub struct FloatingElements {
    elements: Vec<FloatingElement>,
}

pub const OCTAHEDRON_EDGES: [[u16; 2]; 12] = [
    [0, 2],
    [0, 3],
    [0, 4],
    [0, 5],
    [1, 2],
    [1, 3],
    [1, 4],
    [1, 5],
    [2, 4],
    [4, 3],
    [3, 5],
    [5, 2],
];

impl Default for FloatingElements {
    fn default() -> Self {
        Self::new(FLOATING_ELEMENT_COUNT, FLOATING_SEED)
    }
}

impl FloatingElements {
    pub fn new(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let elements = (0..count)
            .map(|_| FloatingElement {
                position: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 8.0,
                    (rng.gen::<f32>() - 0.5) * 5.0,
                    (rng.gen::<f32>() - 0.5) * 2.0,
                ),
                rotation: rng.gen::<f32>() * PI,
                speed: 0.2 + rng.gen::<f32>() * 0.3,
                size: 0.03 + rng.gen::<f32>() * 0.04,
                phase: rng.gen::<f32>() * TAU,
            })
            .collect();
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.elements.len() * 6
    }

    /// Write six octahedron corners per element, bobbing and spinning about Z.
    pub fn write_vertices(&self, time: f32, out: &mut [Vec3]) {
        for (el, corners) in self.elements.iter().zip(out.chunks_exact_mut(6)) {
            let centre = Vec3::new(
                el.position.x,
                el.position.y + (time * el.speed + el.phase).sin() * 0.3,
                el.position.z,
            );
            let spin = Quat::from_rotation_z(time * 0.2 + el.rotation);
            let s = el.size;
            let local = [
                Vec3::new(s, 0.0, 0.0),
                Vec3::new(-s, 0.0, 0.0),
                Vec3::new(0.0, s, 0.0),
                Vec3::new(0.0, -s, 0.0),
                Vec3::new(0.0, 0.0, s),
                Vec3::new(0.0, 0.0, -s),
            ];
            for (dst, l) in corners.iter_mut().zip(local.iter()) {
                *dst = centre + spin * *l;
            }
        }
    }

    pub fn line_indices(&self) -> Vec<u16> {
        let mut idx = Vec::with_capacity(self.elements.len() * OCTAHEDRON_EDGES.len() * 2);
        for e in 0..self.elements.len() {
            let base = (e * 6) as u16;
            for [a, b] in OCTAHEDRON_EDGES {
                idx.push(base + a);
                idx.push(base + b);
            }
        }
        idx
    }

    pub fn model_matrix(viewport: Vec2) -> Mat4 {
        Mat4::from_scale(Vec3::splat(viewport.x.min(viewport.y) * 0.25))
    }
}
