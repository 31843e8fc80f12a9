use crate::constants::FRAME_LATENCY;
use crate::uniforms::PostSettings;
use backdrop_core::{
    BackgroundEffect, EffectKind, EquirectImage, GraphicsProbe, PerformanceTier, RenderParameters,
};
use glam::UVec2;
use web_sys as web;

mod cubemap;
mod gradient;
mod helpers;
mod lines;
mod post;
mod raymarch;
mod targets;
use targets::RenderTargets;

/// A variant that can draw itself into the offscreen scene target.
pub(crate) trait SceneLayer: BackgroundEffect {
    fn encode(&mut self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView);

    /// Project a captured panorama into the layer's environment cube.
    fn set_panorama(&mut self, _panorama: &EquirectImage, _face_size: u32) {}
}

fn make_layer(kind: EffectKind, device: &wgpu::Device, queue: &wgpu::Queue) -> Box<dyn SceneLayer> {
    match kind {
        EffectKind::RayMarch => Box::new(raymarch::RayMarchLayer::new(device, queue)),
        EffectKind::Morph => Box::new(lines::MorphLayer::new(device, queue)),
        EffectKind::Gradient => Box::new(gradient::GradientLayer::new(device, queue)),
    }
}

/// Surface and adapter acquired while probing; consumed by [`GpuState::new`].
pub struct ProbedAdapter<'a> {
    surface: wgpu::Surface<'a>,
    adapter: wgpu::Adapter,
    pub probe: GraphicsProbe,
}

/// Try to get a WebGPU adapter for `canvas` and describe it for the gate.
pub async fn probe_adapter(canvas: &'static web::HtmlCanvasElement) -> anyhow::Result<ProbedAdapter<'static>> {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
    let info = adapter.get_info();
    log::info!(
        "[gpu] adapter name={:?} vendor={:#x} type={:?} backend={:?}",
        info.name,
        info.vendor,
        info.device_type,
        info.backend
    );
    let probe = GraphicsProbe {
        available: true,
        renderer: (!info.name.is_empty()).then(|| info.name.clone()),
        is_software: info.device_type == wgpu::DeviceType::Cpu,
    };
    Ok(ProbedAdapter {
        surface,
        adapter,
        probe,
    })
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    targets: RenderTargets,
    post: post::PostResources,
    layer: Box<dyn SceneLayer>,
    width: u32,
    height: u32,
    time: f32,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        probed: ProbedAdapter<'a>,
        kind: EffectKind,
        tier: &PerformanceTier,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let ProbedAdapter {
            surface, adapter, ..
        } = probed;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        // Shaders output display-referred colour, so pick a non-sRGB target.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let width = width.max(1);
        let height = height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: FRAME_LATENCY,
        };
        surface.configure(&device, &config);

        let targets = RenderTargets::new(&device, width, height);
        let settings = PostSettings::for_tier(tier);
        let post = post::PostResources::new(&device, format, &targets, settings);
        let mut layer = make_layer(kind, &device, &queue);
        layer.mount(UVec2::new(width, height));
        log::info!(
            "[gpu] {} layer mounted at {}x{} format={:?} alpha={:?} bloom={}",
            kind.name(),
            width,
            height,
            format,
            alpha_mode,
            settings.bloom
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            post,
            layer,
            width,
            height,
            time: 0.0,
        })
    }

    pub fn kind(&self) -> EffectKind {
        self.layer.kind()
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.layer.is_disposed() {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.targets.recreate(&self.device, width, height);
            self.post.rebuild_bind_groups(&self.device, &self.targets);
            self.layer.mount(UVec2::new(width, height));
        }
    }

    pub fn update_frame(&mut self, params: &RenderParameters) {
        self.time = params.time;
        self.layer.update_frame(params);
    }

    pub fn set_panorama(&mut self, panorama: &EquirectImage, face_size: u32) {
        self.layer.set_panorama(panorama, face_size);
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if self.layer.is_disposed() {
            return Ok(());
        }
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        self.layer.encode(&mut encoder, &self.targets.scene_view);
        self.post.encode(
            &self.queue,
            &mut encoder,
            &self.targets,
            &view,
            (self.width, self.height),
            self.time,
        );
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Reconfigure after `Lost`/`Outdated`.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn dispose(&mut self) {
        if !self.layer.is_disposed() {
            self.layer.dispose();
            log::info!("[gpu] {} layer disposed", self.layer.kind().name());
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.layer.is_disposed()
    }
}
