//! Panorama decoding and cube-map projection.
//!
//! The cube faces follow the WebGPU/GL layer order and texel orientation.
//! The web renderer projects on the GPU from the same face bases.

use crate::capture::CaptureError;
use glam::Vec3;
use image::codecs::hdr::HdrDecoder;
use std::f32::consts::{PI, TAU};
use std::io::Cursor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosY,
        CubeFace::NegY,
        CubeFace::PosZ,
        CubeFace::NegZ,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// `(centre, s axis, t axis)` spanning this face: the unnormalised
    /// direction through face coordinates `s, t` in [-1, 1] is
    /// `centre + s * s_axis + t * t_axis`.
    pub fn basis(self) -> (Vec3, Vec3, Vec3) {
        match self {
            CubeFace::PosX => (Vec3::X, Vec3::NEG_Z, Vec3::NEG_Y),
            CubeFace::NegX => (Vec3::NEG_X, Vec3::Z, Vec3::NEG_Y),
            CubeFace::PosY => (Vec3::Y, Vec3::X, Vec3::Z),
            CubeFace::NegY => (Vec3::NEG_Y, Vec3::X, Vec3::NEG_Z),
            CubeFace::PosZ => (Vec3::Z, Vec3::X, Vec3::NEG_Y),
            CubeFace::NegZ => (Vec3::NEG_Z, Vec3::NEG_X, Vec3::NEG_Y),
        }
    }

    /// Direction through texel coordinates `(u, v)` in [0, 1] on this face
    /// (v grows downward).
    pub fn direction(self, u: f32, v: f32) -> Vec3 {
        let (centre, s_axis, t_axis) = self.basis();
        (centre + (2.0 * u - 1.0) * s_axis + (2.0 * v - 1.0) * t_axis).normalize()
    }

    /// Face and `(u, v)` hit by direction `dir` (major-axis selection).
    pub fn locate(dir: Vec3) -> (CubeFace, f32, f32) {
        let a = dir.abs();
        let (face, sc, tc, ma) = if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 {
                (CubeFace::PosX, -dir.z, -dir.y, a.x)
            } else {
                (CubeFace::NegX, dir.z, -dir.y, a.x)
            }
        } else if a.y >= a.z {
            if dir.y >= 0.0 {
                (CubeFace::PosY, dir.x, dir.z, a.y)
            } else {
                (CubeFace::NegY, dir.x, -dir.z, a.y)
            }
        } else if dir.z >= 0.0 {
            (CubeFace::PosZ, dir.x, -dir.y, a.z)
        } else {
            (CubeFace::NegZ, -dir.x, -dir.y, a.z)
        };
        let ma = ma.max(f32::EPSILON);
        (face, 0.5 * (sc / ma + 1.0), 0.5 * (tc / ma + 1.0))
    }
}

/// Linear HDR panorama in equirectangular layout, row 0 at the zenith.
#[derive(Clone, Debug)]
pub struct EquirectImage {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<Vec3>,
}

impl EquirectImage {
    pub fn new(width: u32, height: u32, texels: Vec<Vec3>) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 || texels.len() != (width as usize) * (height as usize) {
            return Err(CaptureError::EmptyImage);
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Decode a Radiance `.hdr` file.
    pub fn decode_hdr(bytes: &[u8]) -> Result<Self, CaptureError> {
        let decoder =
            HdrDecoder::new(Cursor::new(bytes)).map_err(|e| CaptureError::Decode(e.to_string()))?;
        let meta = decoder.metadata();
        let pixels = decoder
            .read_image_hdr()
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        let texels = pixels
            .into_iter()
            .map(|p| Vec3::new(p.0[0], p.0[1], p.0[2]))
            .collect();
        Self::new(meta.width, meta.height, texels)
    }

    /// Texels packed for GPU upload, see [`pack_rgba8`].
    pub fn rgba8(&self) -> Vec<u8> {
        pack_rgba8(&self.texels)
    }

    fn texel(&self, x: i64, y: i64) -> Vec3 {
        let w = self.width as i64;
        let h = self.height as i64;
        let x = x.rem_euclid(w);
        let y = y.clamp(0, h - 1);
        self.texels[(y * w + x) as usize]
    }

    /// Bilinear lookup along a world direction.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        let d = dir.normalize_or_zero();
        let u = 0.5 + d.z.atan2(d.x) / TAU;
        let v = 0.5 - d.y.clamp(-1.0, 1.0).asin() / PI;
        let fx = u * self.width as f32 - 0.5;
        let fy = v * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);
        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }
}

/// Directionally indexed colour lookup built once from a panorama.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    face_size: u32,
    faces: [Vec<Vec3>; 6],
}

impl EnvironmentMap {
    /// Capture the panorama from the six axis directions.
    pub fn from_equirect(image: &EquirectImage, face_size: u32) -> Self {
        let n = face_size.max(1);
        let capture = |face: CubeFace| {
            let mut texels = Vec::with_capacity((n * n) as usize);
            for y in 0..n {
                for x in 0..n {
                    let u = (x as f32 + 0.5) / n as f32;
                    let v = (y as f32 + 0.5) / n as f32;
                    texels.push(image.sample(face.direction(u, v)));
                }
            }
            texels
        };
        Self {
            face_size: n,
            faces: CubeFace::ALL.map(capture),
        }
    }

    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    pub fn face(&self, face: CubeFace) -> &[Vec3] {
        &self.faces[face.index()]
    }

    /// Nearest-texel lookup; the renderer only needs soft reflections.
    pub fn sample(&self, dir: Vec3) -> Vec3 {
        if dir == Vec3::ZERO || !dir.is_finite() {
            return Vec3::ZERO;
        }
        let (face, u, v) = CubeFace::locate(dir);
        let n = self.face_size;
        let x = ((u * n as f32) as u32).min(n - 1);
        let y = ((v * n as f32) as u32).min(n - 1);
        self.faces[face.index()][(y * n + x) as usize]
    }
}

/// Pack linear HDR colour as RGBA8. Values are compressed with `c / (1 + c)`;
/// the shaders expand them with `c / (1 - c)`.
pub fn pack_rgba8(texels: &[Vec3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(texels.len() * 4);
    for c in texels {
        let m = c.max(Vec3::ZERO);
        let m = m / (m + Vec3::ONE);
        out.extend_from_slice(&[
            (m.x * 255.0).round() as u8,
            (m.y * 255.0).round() as u8,
            (m.z * 255.0).round() as u8,
            255,
        ]);
    }
    out
}
