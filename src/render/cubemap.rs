use super::helpers;
use crate::constants::ENV_PLACEHOLDER_TEXEL;
use crate::uniforms::CubeFaceUniforms;
use backdrop_core::{CubeFace, EquirectImage};
use wgpu::util::DeviceExt;

const CUBE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Cube texture sampled by the ray-march shader.
pub(crate) struct EnvironmentCube {
    texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) face_size: u32,
}

impl EnvironmentCube {
    /// 1x1 black cube bound until a capture lands, so the bind group layout
    /// never changes.
    pub(crate) fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let cube = Self::allocate(device, "env_placeholder", 1, wgpu::TextureUsages::COPY_DST);
        for face in CubeFace::ALL {
            cube.write_face(queue, face, &ENV_PLACEHOLDER_TEXEL);
        }
        cube
    }

    /// Upload the panorama once and render the six faces from it on the GPU.
    pub(crate) fn from_panorama(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        panorama: &EquirectImage,
        face_size: u32,
    ) -> Self {
        let cube = Self::allocate(
            device,
            "env_cube",
            face_size,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let source = upload_panorama(device, queue, panorama);
        let source_view = source.create_view(&wgpu::TextureViewDescriptor::default());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("env_project_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::EQUIRECT_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("env_project_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                helpers::texture_entry(1, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(2),
            ],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("env_project_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_fullscreen_pipeline(
            device,
            "env_project_pipeline",
            &pl,
            &shader,
            "fs_project",
            CUBE_FORMAT,
            None,
        );
        // Longitude wraps, latitude clamps at the poles.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("env_panorama_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let passes: Vec<(wgpu::BindGroup, wgpu::TextureView)> = CubeFace::ALL
            .into_iter()
            .map(|face| {
                let record = CubeFaceUniforms::for_face(face, cube.face_size);
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("env_face_uniforms"),
                    contents: bytemuck::bytes_of(&record),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("env_project_bg"),
                    layout: &bgl,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&source_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });
                let view = cube.texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("env_face"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: face.index() as u32,
                    array_layer_count: Some(1),
                    ..Default::default()
                });
                (bind_group, view)
            })
            .collect();

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("env_project_encoder"),
        });
        for (bind_group, view) in &passes {
            let mut rpass = helpers::clear_pass(&mut encoder, "env_project_pass", view);
            rpass.set_pipeline(&pipeline);
            rpass.set_bind_group(0, bind_group, &[]);
            rpass.draw(0..3, 0..1);
        }
        queue.submit(Some(encoder.finish()));
        cube
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        face_size: u32,
        extra_usage: wgpu::TextureUsages,
    ) -> Self {
        let face_size = face_size.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: face_size,
                height: face_size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CUBE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | extra_usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self {
            texture,
            view,
            face_size,
        }
    }

    fn write_face(&self, queue: &wgpu::Queue, face: CubeFace, rgba: &[u8]) {
        let n = self.face_size;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: face.index() as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * n),
                rows_per_image: Some(n),
            },
            wgpu::Extent3d {
                width: n,
                height: n,
                depth_or_array_layers: 1,
            },
        );
    }
}

fn upload_panorama(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    panorama: &EquirectImage,
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width: panorama.width,
        height: panorama.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("env_panorama"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: CUBE_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &panorama.rgba8(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * panorama.width),
            rows_per_image: Some(panorama.height),
        },
        size,
    );
    texture
}
