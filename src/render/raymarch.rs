use super::cubemap::EnvironmentCube;
use super::helpers;
use super::targets::SCENE_FORMAT;
use super::SceneLayer;
use crate::uniforms::RaymarchUniforms;
use backdrop_core::{BackgroundEffect, EffectKind, EquirectImage, RayMarchEffect, RenderParameters};
use glam::UVec2;

/// GPU ray-march variant. Frame state (ball centres, camera, march budget)
/// comes from the core effect; the shader only walks the rays.
pub(crate) struct RayMarchLayer {
    effect: RayMarchEffect,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    cube: EnvironmentCube,
    bind_group: wgpu::BindGroup,
    uniforms: RaymarchUniforms,
    env_ready: bool,
}

impl RayMarchLayer {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("raymarch_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::RAYMARCH_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("raymarch_bgl"),
            entries: &[
                helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
                helpers::texture_entry(1, wgpu::TextureViewDimension::Cube),
                helpers::sampler_entry(2),
            ],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("raymarch_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_fullscreen_pipeline(
            device,
            "raymarch_pipeline",
            &pl,
            &shader,
            "fs_raymarch",
            SCENE_FORMAT,
            None,
        );
        let uniform_buffer = helpers::uniform_buffer(
            device,
            "raymarch_uniforms",
            std::mem::size_of::<RaymarchUniforms>(),
        );
        let sampler = helpers::linear_sampler(device, "env_sampler");
        let cube = EnvironmentCube::placeholder(device, queue);
        let bind_group = bind(device, &bgl, &uniform_buffer, &cube, &sampler);

        Self {
            effect: RayMarchEffect::default(),
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            bgl,
            sampler,
            uniform_buffer,
            cube,
            bind_group,
            uniforms: RaymarchUniforms::default(),
            env_ready: false,
        }
    }
}

fn bind(
    device: &wgpu::Device,
    bgl: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    cube: &EnvironmentCube,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("raymarch_bg"),
        layout: bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&cube.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

impl BackgroundEffect for RayMarchLayer {
    fn kind(&self) -> EffectKind {
        self.effect.kind()
    }

    fn mount(&mut self, resolution: UVec2) {
        self.effect.mount(resolution);
    }

    fn update_frame(&mut self, params: &RenderParameters) {
        if self.effect.is_disposed() {
            return;
        }
        self.effect.update_frame(params);
        self.uniforms.write(&self.effect, self.env_ready);
    }

    fn has_environment(&self) -> bool {
        self.env_ready
    }

    fn dispose(&mut self) {
        self.effect.dispose();
        self.env_ready = false;
    }

    fn is_disposed(&self) -> bool {
        self.effect.is_disposed()
    }
}

impl SceneLayer for RayMarchLayer {
    fn set_panorama(&mut self, panorama: &EquirectImage, face_size: u32) {
        if self.effect.is_disposed() {
            return;
        }
        self.cube = EnvironmentCube::from_panorama(&self.device, &self.queue, panorama, face_size);
        self.bind_group = bind(
            &self.device,
            &self.bgl,
            &self.uniform_buffer,
            &self.cube,
            &self.sampler,
        );
        self.env_ready = true;
        log::info!("[raymarch] environment cube bound ({}px faces)", self.cube.face_size);
    }

    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        if self.effect.is_disposed() {
            return;
        }
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        let mut rpass = helpers::clear_pass(encoder, "raymarch_pass", target);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
