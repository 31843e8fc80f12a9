//! Implicit fields driving the three backdrop variants.

pub mod gradient;
pub mod metaball;
pub mod morph;

use glam::Vec2;

pub use gradient::{BlobSpec, GradientField, GradientFrame};
pub use metaball::{Ball, MetaballField, Orbit, RadiusWave};
pub use morph::{ease_in_out_cubic, Blend, FloatingElements, MorphField, MorphPhase};

/// Scalar field sampled at a point for a given clock, pointer and quality.
pub trait ScalarField {
    type Point;

    fn value(&self, p: Self::Point, time: f32, pointer: Vec2, quality: f32) -> f32;
}
