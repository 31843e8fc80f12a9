use super::helpers;

pub(crate) const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Offscreen colour targets for the post chain.
///
/// - `scene_*` holds the layer output (premultiplied) at full resolution.
/// - `bloom_*` are half-res ping-pong buffers for the bright pass and blur.
pub(crate) struct RenderTargets {
    pub(crate) scene_view: wgpu::TextureView,
    pub(crate) bloom_a_view: wgpu::TextureView,
    pub(crate) bloom_b_view: wgpu::TextureView,
    _textures: [wgpu::Texture; 3],
}

impl RenderTargets {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (scene, scene_view) =
            helpers::create_color_texture(device, "scene_tex", width, height, SCENE_FORMAT);
        let bw = (width.max(1) / 2).max(1);
        let bh = (height.max(1) / 2).max(1);
        let (bloom_a, bloom_a_view) =
            helpers::create_color_texture(device, "bloom_a", bw, bh, SCENE_FORMAT);
        let (bloom_b, bloom_b_view) =
            helpers::create_color_texture(device, "bloom_b", bw, bh, SCENE_FORMAT);
        Self {
            scene_view,
            bloom_a_view,
            bloom_b_view,
            _textures: [scene, bloom_a, bloom_b],
        }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        *self = Self::new(device, width, height);
    }
}

/// Half-resolution size used by the bloom passes.
pub(crate) fn bloom_resolution(width: u32, height: u32) -> [f32; 2] {
    [
        (width.max(1) / 2).max(1) as f32,
        (height.max(1) / 2).max(1) as f32,
    ]
}
