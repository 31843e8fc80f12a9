use super::helpers;
use super::targets::SCENE_FORMAT;
use super::SceneLayer;
use crate::uniforms::GradientUniforms;
use backdrop_core::{BackgroundEffect, EffectKind, GradientEffect, RenderParameters};
use glam::UVec2;

/// GPU gradient-blob variant; blob centres and pulses are evaluated once per
/// frame by the core effect.
pub(crate) struct GradientLayer {
    effect: GradientEffect,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: GradientUniforms,
}

impl GradientLayer {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gradient_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::GRADIENT_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gradient_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("gradient_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = helpers::make_fullscreen_pipeline(
            device,
            "gradient_pipeline",
            &pl,
            &shader,
            "fs_gradient",
            SCENE_FORMAT,
            None,
        );
        let uniform_buffer = helpers::uniform_buffer(
            device,
            "gradient_uniforms",
            std::mem::size_of::<GradientUniforms>(),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gradient_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            effect: GradientEffect::default(),
            queue: queue.clone(),
            pipeline,
            uniform_buffer,
            bind_group,
            uniforms: GradientUniforms::default(),
        }
    }
}

impl BackgroundEffect for GradientLayer {
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
        self.uniforms.write(&self.effect);
    }

    fn dispose(&mut self) {
        self.effect.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.effect.is_disposed()
    }
}

impl SceneLayer for GradientLayer {
    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        if self.effect.is_disposed() {
            return;
        }
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        let mut rpass = helpers::clear_pass(encoder, "gradient_pass", target);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}
