//! Theme palettes and the static fallback gradient.

use glam::Vec3;
use image::{Rgba, RgbaImage};
use smallvec::SmallVec;

pub const PALETTE_MAX: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn from_is_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

/// Decode a `0xRRGGBB` sRGB literal into linear RGB.
pub fn hex_rgb(hex: u32) -> Vec3 {
    let c = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
    Vec3::new(c(16), c(8), c(0))
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.max(0.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

// Swatch slots, in order.
const PRIMARY: usize = 0;
const SECONDARY: usize = 1;
const ACCENT: usize = 2;
const RIM: usize = 3;
const GLOW: usize = 4;

/// Active colour palette; lives inline so swapping themes never allocates.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub swatches: SmallVec<[Vec3; PALETTE_MAX]>,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        let swatches: SmallVec<[Vec3; PALETTE_MAX]> = match theme {
            Theme::Dark => [
                hex_rgb(0x7B5CFF),
                hex_rgb(0xFF5EDB),
                hex_rgb(0x5EC8FF),
                Vec3::new(0.8, 0.9, 1.0),
                Vec3::new(0.6, 0.8, 1.0),
            ]
            .into_iter()
            .collect(),
            Theme::Light => [
                hex_rgb(0x3B82F6),
                hex_rgb(0x0891B2),
                hex_rgb(0x0EA5E9),
                hex_rgb(0x1D4ED8),
                hex_rgb(0x60A5FA),
            ]
            .into_iter()
            .collect(),
        };
        Self { swatches }
    }

    fn swatch(&self, slot: usize) -> Vec3 {
        self.swatches
            .get(slot)
            .or_else(|| self.swatches.first())
            .copied()
            .unwrap_or(Vec3::ONE)
    }

    pub fn primary(&self) -> Vec3 {
        self.swatch(PRIMARY)
    }
    pub fn secondary(&self) -> Vec3 {
        self.swatch(SECONDARY)
    }
    pub fn accent(&self) -> Vec3 {
        self.swatch(ACCENT)
    }
    pub fn rim(&self) -> Vec3 {
        self.swatch(RIM)
    }
    pub fn glow(&self) -> Vec3 {
        self.swatch(GLOW)
    }

    /// Per-blob base colours for the gradient variant.
    pub fn blob_colors(&self) -> [Vec3; 4] {
        let a = self.primary();
        let b = self.secondary();
        [a, b, self.accent(), a.lerp(b, 0.5)]
    }

    /// Overwrite in place; the inline storage is reused.
    pub fn assign(&mut self, other: &Palette) {
        self.swatches.clear();
        self.swatches.extend(other.swatches.iter().copied());
    }
}

/// Static 135 degree gradient shown instead of the animated backdrop.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticGradient {
    pub from: Vec3,
    pub to: Vec3,
    pub opacity: f32,
}

impl StaticGradient {
    pub fn for_theme(theme: Theme) -> Self {
        let p = Palette::for_theme(theme);
        Self {
            from: p.primary(),
            to: p.secondary(),
            opacity: match theme {
                Theme::Dark => 0.10,
                Theme::Light => 0.14,
            },
        }
    }

    fn css_rgba(c: Vec3, a: f32) -> String {
        let to8 = |v: f32| (linear_to_srgb(v) * 255.0).round().clamp(0.0, 255.0) as u8;
        format!("rgba({}, {}, {}, {:.2})", to8(c.x), to8(c.y), to8(c.z), a)
    }

    /// CSS `background` value for hosts that paint the fallback with CSS.
    pub fn css(&self) -> String {
        format!(
            "linear-gradient(135deg, {} 0%, {} 100%)",
            Self::css_rgba(self.from, self.opacity),
            Self::css_rgba(self.to, self.opacity)
        )
    }

    /// Rasterise the gradient once (non-premultiplied sRGB).
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let w = width.max(1);
        let h = height.max(1);
        let span = (w + h).saturating_sub(2).max(1) as f32;
        let alpha = (self.opacity * 255.0).round().clamp(0.0, 255.0) as u8;
        RgbaImage::from_fn(w, h, |x, y| {
            let t = (x + y) as f32 / span;
            let c = self.from.lerp(self.to, t);
            let to8 = |v: f32| (linear_to_srgb(v) * 255.0).round().clamp(0.0, 255.0) as u8;
            Rgba([to8(c.x), to8(c.y), to8(c.z), alpha])
        })
    }
}
