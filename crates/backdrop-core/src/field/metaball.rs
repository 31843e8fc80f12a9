use super::ScalarField;
use crate::constants::{
    MAX_DIST, METABALL_COUNT, METABALL_EPSILON, METABALL_OFFSET, METABALL_THRESHOLD,
    METABALL_TIME_SCALE,
};
use glam::{Vec2, Vec3};

/// Sum-of-sinusoids path of one centre. Per-axis frequencies are distinct
/// irrational multiples so the combined motion has no short period.
#[derive(Clone, Copy, Debug)]
pub struct Orbit {
    pub base: Vec3,
    pub amplitude: Vec3,
    pub frequency: Vec3,
    pub phase: Vec3,
    /// Fraction of the pointer bias applied to this centre.
    pub pointer_gain: Vec3,
    pub radius: RadiusWave,
}

#[derive(Clone, Copy, Debug)]
pub struct RadiusWave {
    pub base: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub phase: f32,
}

impl RadiusWave {
    #[inline]
    pub fn at(&self, t: f32) -> f32 {
        self.base + (t * self.frequency + self.phase).sin() * self.amplitude
    }
}

impl Orbit {
    #[inline]
    pub fn center(&self, t: f32, bias: Vec3) -> Vec3 {
        let w = self.frequency * t + self.phase;
        self.base
            + self.amplitude * Vec3::new(w.x.sin(), w.y.sin(), w.z.sin())
            + bias * self.pointer_gain
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ball {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Clone, Debug)]
pub struct MetaballField {
    pub orbits: [Orbit; METABALL_COUNT],
    pub threshold: f32,
    pub offset: f32,
    pub epsilon: f32,
    pub time_scale: f32,
}

const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;

fn orbit(
    base: [f32; 3],
    amplitude: [f32; 3],
    frequency: [f32; 3],
    cos_axes: [bool; 3],
    pointer_gain: [f32; 3],
    radius: (f32, f32, f32, bool),
) -> Orbit {
    let ph = |c: bool| if c { HALF_PI } else { 0.0 };
    Orbit {
        base: Vec3::from(base),
        amplitude: Vec3::from(amplitude),
        frequency: Vec3::from(frequency),
        phase: Vec3::new(ph(cos_axes[0]), ph(cos_axes[1]), ph(cos_axes[2])),
        pointer_gain: Vec3::from(pointer_gain),
        radius: RadiusWave {
            base: radius.0,
            amplitude: radius.1,
            frequency: radius.2,
            phase: ph(radius.3),
        },
    }
}

impl Default for MetaballField {
    fn default() -> Self {
        let orbits = [
            orbit(
                [0.2, 1.0, 0.0],
                [0.6, 0.8, 0.5],
                [0.7071, 0.5257, 0.3183],
                [false, true, false],
                [0.3, 0.3, 0.2],
                (0.8, 0.2, 1.4427, false),
            ),
            orbit(
                [1.2, -0.5, 0.0],
                [0.5, 0.7, 0.6],
                [1.3247, 0.9129, 0.7937],
                [true, false, true],
                [0.2, 0.4, 0.2],
                (0.6, 0.15, 1.7725, true),
            ),
            orbit(
                [-0.3, -0.8, 0.0],
                [0.7, 0.6, 0.8],
                [1.8171, 1.4142, 1.1180],
                [false, true, false],
                [0.4, 0.3, 0.3],
                (0.7, 0.18, 2.2361, false),
            ),
            orbit(
                [0.8, 0.3, 0.0],
                [0.8, 0.9, 0.4],
                [0.4142, 2.1180, 1.5708],
                [true, false, true],
                [0.3, 0.5, 0.4],
                (0.9, 0.25, 1.2599, true),
            ),
            orbit(
                [-0.8, 0.8, 0.0],
                [0.4, 1.1, 0.9],
                [2.4142, 1.7321, 0.6180],
                [false, true, false],
                [0.4, 0.2, 0.3],
                (0.5, 0.12, 2.5066, false),
            ),
        ];
        Self {
            orbits,
            threshold: METABALL_THRESHOLD,
            offset: METABALL_OFFSET,
            epsilon: METABALL_EPSILON,
            time_scale: METABALL_TIME_SCALE,
        }
    }
}

/// Pointer in [0, 1]^2 (y down) mapped to a world-space bias.
#[inline]
pub fn pointer_bias(pointer: Vec2) -> Vec3 {
    let m = (pointer - Vec2::splat(0.5)) * 2.0;
    Vec3::new(m.x * 1.5, -m.y, m.x * 0.3)
}

impl MetaballField {
    /// Centres and radii for one frame; evaluated once, then reused per pixel.
    pub fn balls(&self, time: f32, pointer: Vec2) -> [Ball; METABALL_COUNT] {
        let t = time * self.time_scale;
        let bias = pointer_bias(pointer);
        let mut out = [Ball::default(); METABALL_COUNT];
        for (ball, orbit) in out.iter_mut().zip(self.orbits.iter()) {
            ball.center = orbit.center(t, bias);
            ball.radius = orbit.radius.at(t);
        }
        out
    }

    /// Sum of `r / (|p - c| + eps)` over all balls.
    #[inline]
    pub fn influence(&self, p: Vec3, balls: &[Ball]) -> f32 {
        balls
            .iter()
            .map(|b| b.radius / (p.distance(b.center) + self.epsilon))
            .sum()
    }

    /// Signed distance estimate whose zero set is the blob surface.
    #[inline]
    pub fn distance_from_influence(&self, influence: f32) -> f32 {
        if influence <= f32::EPSILON {
            return MAX_DIST * 2.0;
        }
        self.threshold / influence - self.offset
    }

    #[inline]
    pub fn distance(&self, p: Vec3, balls: &[Ball]) -> f32 {
        self.distance_from_influence(self.influence(p, balls))
    }

    /// Influence level at which the surface sits.
    pub fn surface_influence(&self) -> f32 {
        self.threshold / self.offset
    }
}

impl ScalarField for MetaballField {
    type Point = Vec3;

    fn value(&self, p: Vec3, time: f32, pointer: Vec2, _quality: f32) -> f32 {
        self.influence(p, &self.balls(time, pointer))
    }
}
