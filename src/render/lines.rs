use super::helpers;
use super::targets::SCENE_FORMAT;
use super::SceneLayer;
use crate::uniforms::LineUniforms;
use backdrop_core::{
    BackgroundEffect, EffectKind, MorphEffect, RenderParameters, FLOATING_LINE_ALPHA,
    GRID_LINE_ALPHA,
};
use glam::{UVec2, Vec3};
use wgpu::util::DeviceExt;

/// One indexed line set: dynamic vertices, static indices, own uniforms.
struct LineMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: LineUniforms,
}

impl LineMesh {
    fn new(
        device: &wgpu::Device,
        label: &str,
        bgl: &wgpu::BindGroupLayout,
        vertex_count: usize,
        indices: &[u16],
    ) -> Self {
        let vertices = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (vertex_count.max(1) * std::mem::size_of::<Vec3>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        // Index buffers must be 4-byte aligned in size.
        let mut padded = indices.to_vec();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&padded),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform_buffer =
            helpers::uniform_buffer(device, label, std::mem::size_of::<LineUniforms>());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Self {
            vertices,
            indices: index_buffer,
            index_count: indices.len() as u32,
            uniform_buffer,
            bind_group,
            uniforms: LineUniforms::default(),
        }
    }

    fn upload(&self, queue: &wgpu::Queue, positions: &[Vec3]) {
        if !positions.is_empty() {
            queue.write_buffer(&self.vertices, 0, bytemuck::cast_slice(positions));
        }
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if self.index_count == 0 {
            return;
        }
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertices.slice(..));
        rpass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// GPU morphing-wireframe variant. Vertex positions are evaluated on the CPU
/// by the core effect and streamed into the vertex buffers each frame.
pub(crate) struct MorphLayer {
    effect: MorphEffect,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    floating: LineMesh,
    grid: LineMesh,
}

impl MorphLayer {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let effect = MorphEffect::default();
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lines_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::shaders::LINES_WGSL.into()),
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lines_bgl"),
            entries: &[helpers::uniform_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT)],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lines_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lines_pipeline"),
            layout: Some(&pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_lines"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vec3>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_lines"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SCENE_FORMAT,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });
        let floating = LineMesh::new(
            device,
            "floating_lines",
            &bgl,
            effect.floating_vertices().len(),
            effect.floating_indices(),
        );
        let grid = LineMesh::new(
            device,
            "grid_lines",
            &bgl,
            effect.positions().len(),
            effect.grid_indices(),
        );

        Self {
            effect,
            queue: queue.clone(),
            pipeline,
            floating,
            grid,
        }
    }
}

impl BackgroundEffect for MorphLayer {
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
        let vp = self.effect.view_proj();
        self.floating.uniforms.write(
            vp * self.effect.floating_model(),
            self.effect.floating_color(),
            FLOATING_LINE_ALPHA,
        );
        self.grid
            .uniforms
            .write(vp * self.effect.model(), self.effect.line_color(), GRID_LINE_ALPHA);
    }

    fn dispose(&mut self) {
        self.effect.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.effect.is_disposed()
    }
}

impl SceneLayer for MorphLayer {
    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        if self.effect.is_disposed() {
            return;
        }
        self.floating
            .upload(&self.queue, self.effect.floating_vertices());
        self.grid.upload(&self.queue, self.effect.positions());

        let mut rpass = helpers::clear_pass(encoder, "lines_pass", target);
        rpass.set_pipeline(&self.pipeline);
        self.floating.draw(&mut rpass);
        self.grid.draw(&mut rpass);
    }
}
