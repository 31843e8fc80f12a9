use super::helpers;
use super::targets::{bloom_resolution, RenderTargets, SCENE_FORMAT};
use crate::uniforms::{PostSettings, PostUniforms};

struct PostBindGroups {
    bright: wgpu::BindGroup,    // scene -> bloom_a
    blur_h: wgpu::BindGroup,    // bloom_a -> bloom_b
    blur_v: wgpu::BindGroup,    // bloom_b -> bloom_a
    composite: wgpu::BindGroup, // scene, group 0
    bloom: wgpu::BindGroup,     // bloom_a, group 1
}

/// One uniform buffer per pass: `write_buffer` lands before the submit, so
/// passes sharing a buffer would all see the last value.
struct PassUniforms {
    bright: wgpu::Buffer,
    blur_h: wgpu::Buffer,
    blur_v: wgpu::Buffer,
    composite: wgpu::Buffer,
}

pub(crate) struct PostResources {
    bgl0: wgpu::BindGroupLayout, // tex+sampler+uniform
    bgl1: wgpu::BindGroupLayout, // tex+sampler
    sampler: wgpu::Sampler,
    uniforms: PassUniforms,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    groups: PostBindGroups,
    settings: PostSettings,
}

impl PostResources {
    pub(crate) fn new(
        device: &wgpu::Device,
        swap_format: wgpu::TextureFormat,
        targets: &RenderTargets,
        settings: PostSettings,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("post_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::POST_WGSL.into()),
        });
        let bgl0 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl0"),
            entries: &[
                helpers::texture_entry(0, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(1),
                helpers::uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
            ],
        });
        let bgl1 = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("post_bgl1"),
            entries: &[
                helpers::texture_entry(0, wgpu::TextureViewDimension::D2),
                helpers::sampler_entry(1),
            ],
        });
        let size = std::mem::size_of::<PostUniforms>();
        let uniforms = PassUniforms {
            bright: helpers::uniform_buffer(device, "post_bright_uniforms", size),
            blur_h: helpers::uniform_buffer(device, "post_blur_h_uniforms", size),
            blur_v: helpers::uniform_buffer(device, "post_blur_v_uniforms", size),
            composite: helpers::uniform_buffer(device, "post_composite_uniforms", size),
        };
        let pl_single = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_0"),
            bind_group_layouts: &[&bgl0],
            push_constant_ranges: &[],
        });
        let pl_composite = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pl_post_comp"),
            bind_group_layouts: &[&bgl0, &bgl1],
            push_constant_ranges: &[],
        });
        let bright_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "bright_pipeline",
            &pl_single,
            &shader,
            "fs_bright",
            SCENE_FORMAT,
            None,
        );
        let blur_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "blur_pipeline",
            &pl_single,
            &shader,
            "fs_blur",
            SCENE_FORMAT,
            None,
        );
        let composite_pipeline = helpers::make_fullscreen_pipeline(
            device,
            "composite_pipeline",
            &pl_composite,
            &shader,
            "fs_composite",
            swap_format,
            Some(wgpu::BlendState::REPLACE),
        );
        let sampler = helpers::linear_sampler(device, "post_sampler");
        let groups = build_bind_groups(device, &bgl0, &bgl1, &sampler, &uniforms, targets);

        Self {
            bgl0,
            bgl1,
            sampler,
            uniforms,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            groups,
            settings,
        }
    }

    /// Bind groups reference the target views; rebuild after a resize.
    pub(crate) fn rebuild_bind_groups(&mut self, device: &wgpu::Device, targets: &RenderTargets) {
        self.groups = build_bind_groups(
            device,
            &self.bgl0,
            &self.bgl1,
            &self.sampler,
            &self.uniforms,
            targets,
        );
    }

    pub(crate) fn encode(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &RenderTargets,
        swap_view: &wgpu::TextureView,
        size: (u32, u32),
        time: f32,
    ) {
        let res = bloom_resolution(size.0, size.1);
        let s = &self.settings;
        let write = |buf: &wgpu::Buffer, dir: [f32; 2]| {
            queue.write_buffer(buf, 0, bytemuck::bytes_of(&s.pass(res, time, dir)));
        };
        write(&self.uniforms.composite, [0.0, 0.0]);

        if s.bloom {
            write(&self.uniforms.bright, [0.0, 0.0]);
            write(&self.uniforms.blur_h, [1.0, 0.0]);
            write(&self.uniforms.blur_v, [0.0, 1.0]);
            let (a, b) = (&targets.bloom_a_view, &targets.bloom_b_view);
            blit(encoder, "bright_pass", a, &self.bright_pipeline, &self.groups.bright, None);
            blit(encoder, "blur_h", b, &self.blur_pipeline, &self.groups.blur_h, None);
            blit(encoder, "blur_v", a, &self.blur_pipeline, &self.groups.blur_v, None);
        }

        blit(
            encoder,
            "composite",
            swap_view,
            &self.composite_pipeline,
            &self.groups.composite,
            Some(&self.groups.bloom),
        );
    }
}

fn source_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    uniforms: Option<&wgpu::Buffer>,
) -> wgpu::BindGroup {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(view),
        },
        wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(sampler),
        },
    ];
    if let Some(buf) = uniforms {
        entries.push(wgpu::BindGroupEntry {
            binding: 2,
            resource: buf.as_entire_binding(),
        });
    }
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

fn build_bind_groups(
    device: &wgpu::Device,
    bgl0: &wgpu::BindGroupLayout,
    bgl1: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniforms: &PassUniforms,
    targets: &RenderTargets,
) -> PostBindGroups {
    PostBindGroups {
        bright: source_group(device, "bg_bright", bgl0, &targets.scene_view, sampler, Some(&uniforms.bright)),
        blur_h: source_group(device, "bg_blur_h", bgl0, &targets.bloom_a_view, sampler, Some(&uniforms.blur_h)),
        blur_v: source_group(device, "bg_blur_v", bgl0, &targets.bloom_b_view, sampler, Some(&uniforms.blur_v)),
        composite: source_group(
            device,
            "bg_composite",
            bgl0,
            &targets.scene_view,
            sampler,
            Some(&uniforms.composite),
        ),
        bloom: source_group(device, "bg_bloom", bgl1, &targets.bloom_a_view, sampler, None),
    }
}

pub(crate) fn blit(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bg0: &wgpu::BindGroup,
    bg1: Option<&wgpu::BindGroup>,
) {
    let mut r = helpers::clear_pass(encoder, label, target);
    r.set_pipeline(pipeline);
    r.set_bind_group(0, bg0, &[]);
    if let Some(g1) = bg1 {
        r.set_bind_group(1, g1, &[]);
    }
    r.draw(0..3, 0..1);
}
