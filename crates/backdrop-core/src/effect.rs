//! The backdrop as one polymorphic effect with three variants, plus CPU
//! reference renderers for each.
//!
//! The web front-end implements [`BackgroundEffect`] on the GPU; the types
//! here render the same frames on the CPU for the snapshot tool and tests.

use crate::constants::METABALL_COUNT;
use crate::driver::RenderParameters;
use crate::envmap::EnvironmentMap;
use crate::field::{
    Ball, Blend, FloatingElements, GradientField, GradientFrame, MetaballField, MorphField,
};
use crate::palette::linear_to_srgb;
use crate::raymarch::{
    camera_ray, estimate_normal, march, shade_hit, MarchOutcome, MarchSettings, ShadeInputs,
    TRANSPARENT,
};
use crate::state::Camera;
use glam::{Mat4, UVec2, Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    RayMarch,
    Morph,
    Gradient,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [EffectKind::RayMarch, EffectKind::Morph, EffectKind::Gradient];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::RayMarch => "raymarch",
            EffectKind::Morph => "morph",
            EffectKind::Gradient => "gradient",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Camera the variant is framed with.
    pub fn camera(self, aspect: f32) -> Camera {
        match self {
            EffectKind::Morph => Camera::for_morph(aspect),
            EffectKind::RayMarch | EffectKind::Gradient => Camera::for_raymarch(aspect),
        }
    }

    pub fn uses_environment(self) -> bool {
        self == EffectKind::RayMarch
    }
}

/// Contract shared by every backdrop variant.
pub trait BackgroundEffect {
    fn kind(&self) -> EffectKind;

    /// Allocate size-dependent state. Called once before the first frame.
    fn mount(&mut self, resolution: UVec2);

    /// Pull this frame's parameters. Must not allocate.
    fn update_frame(&mut self, params: &RenderParameters);

    /// Install a captured environment map. Ignored after disposal.
    fn set_environment(&mut self, _map: Rc<EnvironmentMap>) {}

    fn has_environment(&self) -> bool {
        false
    }

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Draw the current frame into a non-premultiplied sRGB image.
pub trait Rasterize {
    fn rasterize(&self, target: &mut RgbaImage);
}

pub trait CpuEffect: BackgroundEffect + Rasterize {}

impl<T: BackgroundEffect + Rasterize> CpuEffect for T {}

pub fn cpu_effect(kind: EffectKind) -> Box<dyn CpuEffect> {
    match kind {
        EffectKind::RayMarch => Box::new(RayMarchEffect::default()),
        EffectKind::Morph => Box::new(MorphEffect::default()),
        EffectKind::Gradient => Box::new(GradientEffect::default()),
    }
}

fn to_rgba8(c: [f32; 4]) -> Rgba<u8> {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgba([q(c[0]), q(c[1]), q(c[2]), q(c[3])])
}

/// Pixel centre to screen UV with y up.
#[inline]
fn pixel_uv(x: u32, y: u32, size: UVec2) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / size.x.max(1) as f32,
        1.0 - (y as f32 + 0.5) / size.y.max(1) as f32,
    )
}

fn rasterize_per_pixel(target: &mut RgbaImage, pixel: impl Fn(Vec2) -> [f32; 4]) {
    let size = UVec2::new(target.width(), target.height());
    for (x, y, px) in target.enumerate_pixels_mut() {
        *px = to_rgba8(pixel(pixel_uv(x, y, size)));
    }
}

/// Sphere-traced glass metaballs.
#[derive(Clone, Debug)]
pub struct RayMarchEffect {
    field: MetaballField,
    balls: [Ball; METABALL_COUNT],
    camera: Camera,
    resolution: UVec2,
    settings: MarchSettings,
    time: f32,
    rim: Vec3,
    glow: Vec3,
    intensity: f32,
    environment: Option<Rc<EnvironmentMap>>,
    disposed: bool,
}

impl Default for RayMarchEffect {
    fn default() -> Self {
        Self::new(MetaballField::default())
    }
}

impl RayMarchEffect {
    pub fn new(field: MetaballField) -> Self {
        let balls = field.balls(0.0, Vec2::splat(0.5));
        Self {
            field,
            balls,
            camera: Camera::for_raymarch(1.0),
            resolution: UVec2::ONE,
            settings: MarchSettings::for_quality(1.0),
            time: 0.0,
            rim: Vec3::ONE,
            glow: Vec3::ONE,
            intensity: 1.0,
            environment: None,
            disposed: false,
        }
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn settings(&self) -> &MarchSettings {
        &self.settings
    }

    pub fn field(&self) -> &MetaballField {
        &self.field
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn rim_color(&self) -> Vec3 {
        self.rim
    }

    /// Glow colour already scaled by the frame's glow amount.
    pub fn glow_color(&self) -> Vec3 {
        self.glow
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn march_pixel(&self, uv: Vec2) -> MarchOutcome {
        let (ro, rd) = camera_ray(&self.camera, uv, self.resolution.as_vec2());
        march(ro, rd, &self.settings, |p| self.field.distance(p, &self.balls))
    }

    /// Shaded RGBA for a screen position; misses are fully transparent.
    pub fn render_pixel(&self, uv: Vec2) -> [f32; 4] {
        let (ro, rd) = camera_ray(&self.camera, uv, self.resolution.as_vec2());
        let sdf = |p: Vec3| self.field.distance(p, &self.balls);
        match march(ro, rd, &self.settings, sdf) {
            MarchOutcome::Hit { distance, .. } => {
                let p = ro + rd * distance;
                let n = estimate_normal(p, self.settings.normal_eps, sdf);
                let inputs = ShadeInputs {
                    time: self.time,
                    rim_color: self.rim,
                    glow_color: self.glow,
                    intensity: self.intensity,
                    environment: self.environment.as_deref(),
                };
                shade_hit(p, n, rd, distance, &inputs)
            }
            MarchOutcome::Miss { .. } => TRANSPARENT,
        }
    }
}

impl BackgroundEffect for RayMarchEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::RayMarch
    }

    fn mount(&mut self, resolution: UVec2) {
        self.resolution = resolution.max(UVec2::ONE);
        self.camera.set_aspect_from(self.resolution);
    }

    fn update_frame(&mut self, params: &RenderParameters) {
        if self.disposed {
            return;
        }
        self.time = params.time;
        self.resolution = params.resolution.max(UVec2::ONE);
        self.camera = params.camera;
        self.settings = MarchSettings::for_quality(params.quality);
        self.balls = self.field.balls(params.time, params.pointer);
        self.rim = params.palette.rim();
        self.glow = params.palette.glow() * params.glow;
        self.intensity = params.intensity;
    }

    fn set_environment(&mut self, map: Rc<EnvironmentMap>) {
        if !self.disposed {
            self.environment = Some(map);
        }
    }

    fn has_environment(&self) -> bool {
        self.environment.is_some()
    }

    fn dispose(&mut self) {
        self.environment = None;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Rasterize for RayMarchEffect {
    fn rasterize(&self, target: &mut RgbaImage) {
        rasterize_per_pixel(target, |uv| self.render_pixel(uv));
    }
}

/// Wireframe grid morphing between terrain, torus knot and double helix,
/// with floating octahedra around it.
#[derive(Clone, Debug)]
pub struct MorphEffect {
    field: MorphField,
    floating: FloatingElements,
    positions: Vec<Vec3>,
    floating_vertices: Vec<Vec3>,
    grid_indices: Vec<u16>,
    floating_indices: Vec<u16>,
    blend: Blend,
    model: Mat4,
    floating_model: Mat4,
    view_proj: Mat4,
    line_color: Vec3,
    floating_color: Vec3,
    disposed: bool,
}

impl Default for MorphEffect {
    fn default() -> Self {
        Self::new(MorphField::default(), FloatingElements::default())
    }
}

pub const GRID_LINE_ALPHA: f32 = 0.6;
pub const FLOATING_LINE_ALPHA: f32 = 0.35;

impl MorphEffect {
    pub fn new(field: MorphField, floating: FloatingElements) -> Self {
        let positions = field.base().to_vec();
        let floating_vertices = vec![Vec3::ZERO; floating.vertex_count()];
        let grid_indices = field.line_indices();
        let floating_indices = floating.line_indices();
        Self {
            field,
            floating,
            positions,
            floating_vertices,
            grid_indices,
            floating_indices,
            blend: Blend::FLAT,
            model: Mat4::IDENTITY,
            floating_model: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            line_color: Vec3::ONE,
            floating_color: Vec3::ONE,
            disposed: false,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn field(&self) -> &MorphField {
        &self.field
    }

    pub fn blend(&self) -> &Blend {
        &self.blend
    }

    pub fn floating_vertices(&self) -> &[Vec3] {
        &self.floating_vertices
    }

    pub fn grid_indices(&self) -> &[u16] {
        &self.grid_indices
    }

    pub fn floating_indices(&self) -> &[u16] {
        &self.floating_indices
    }

    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn floating_model(&self) -> Mat4 {
        self.floating_model
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn line_color(&self) -> Vec3 {
        self.line_color
    }

    pub fn floating_color(&self) -> Vec3 {
        self.floating_color
    }
}

impl BackgroundEffect for MorphEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Morph
    }

    fn mount(&mut self, _resolution: UVec2) {}

    fn update_frame(&mut self, params: &RenderParameters) {
        if self.disposed {
            return;
        }
        let t = params.time;
        self.blend = self.field.write_positions(t, &mut self.positions);
        self.floating.write_vertices(t, &mut self.floating_vertices);
        let cam = &params.camera;
        let viewport = cam.viewport_at_distance(cam.eye.z + 1.0);
        self.model = MorphField::model_matrix(viewport, self.blend.rotation(t));
        self.floating_model = FloatingElements::model_matrix(viewport);
        self.view_proj = cam.projection_matrix() * cam.view_matrix();
        self.line_color = params.palette.primary() * params.intensity;
        self.floating_color = params.palette.accent() * params.intensity;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

fn blend_over(px: &mut Rgba<u8>, color: Vec3, alpha: f32) {
    let dst_a = px.0[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return;
    }
    for (i, s) in color.to_array().into_iter().enumerate() {
        let s = linear_to_srgb(s).min(1.0);
        let d = px.0[i] as f32 / 255.0;
        let c = (s * alpha + d * dst_a * (1.0 - alpha)) / out_a;
        px.0[i] = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    px.0[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
}

fn to_screen(clip: Vec4, size: Vec2) -> Option<Vec2> {
    if clip.w <= 1e-4 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x * 0.5 + 0.5) * size.x,
        (1.0 - (ndc.y * 0.5 + 0.5)) * size.y,
    ))
}

fn draw_lines(
    target: &mut RgbaImage,
    mvp: Mat4,
    vertices: &[Vec3],
    indices: &[u16],
    color: Vec3,
    alpha: f32,
) {
    let size = Vec2::new(target.width() as f32, target.height() as f32);
    let max_steps = 2.0 * (size.x + size.y);
    for pair in indices.chunks_exact(2) {
        let (Some(a), Some(b)) = (
            vertices.get(pair[0] as usize),
            vertices.get(pair[1] as usize),
        ) else {
            continue;
        };
        let (Some(p0), Some(p1)) = (
            to_screen(mvp * a.extend(1.0), size),
            to_screen(mvp * b.extend(1.0), size),
        ) else {
            continue;
        };
        let d = p1 - p0;
        let steps = d.abs().max_element().ceil().min(max_steps).max(1.0);
        for i in 0..=(steps as u32) {
            let p = p0 + d * (i as f32 / steps);
            if p.x < 0.0 || p.y < 0.0 || p.x >= size.x || p.y >= size.y {
                continue;
            }
            blend_over(target.get_pixel_mut(p.x as u32, p.y as u32), color, alpha);
        }
    }
}

impl Rasterize for MorphEffect {
    fn rasterize(&self, target: &mut RgbaImage) {
        for px in target.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
        draw_lines(
            target,
            self.view_proj * self.floating_model,
            &self.floating_vertices,
            &self.floating_indices,
            self.floating_color,
            FLOATING_LINE_ALPHA,
        );
        draw_lines(
            target,
            self.view_proj * self.model,
            &self.positions,
            &self.grid_indices,
            self.line_color,
            GRID_LINE_ALPHA,
        );
    }
}

/// Four soft colour blobs drifting over a transparent page.
#[derive(Clone, Debug, Default)]
pub struct GradientEffect {
    field: GradientField,
    frame: GradientFrame,
    colors: [Vec3; 4],
    disposed: bool,
}

impl GradientEffect {
    pub fn new(field: GradientField) -> Self {
        Self {
            field,
            ..Default::default()
        }
    }

    pub fn field(&self) -> &GradientField {
        &self.field
    }

    pub fn frame(&self) -> &GradientFrame {
        &self.frame
    }

    pub fn colors(&self) -> &[Vec3; 4] {
        &self.colors
    }

    pub fn intensity(&self) -> f32 {
        self.field.intensity
    }

    pub fn render_pixel(&self, uv: Vec2) -> [f32; 4] {
        self.field.shade(uv, &self.frame, &self.colors)
    }
}

impl BackgroundEffect for GradientEffect {
    fn kind(&self) -> EffectKind {
        EffectKind::Gradient
    }

    fn mount(&mut self, _resolution: UVec2) {}

    fn update_frame(&mut self, params: &RenderParameters) {
        if self.disposed {
            return;
        }
        self.frame = self.field.frame(params.time, params.pointer, params.quality);
        self.colors = params.palette.blob_colors();
        self.field.intensity = params.intensity;
    }

    fn dispose(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Rasterize for GradientEffect {
    fn rasterize(&self, target: &mut RgbaImage) {
        rasterize_per_pixel(target, |uv| self.render_pixel(uv));
    }
}
