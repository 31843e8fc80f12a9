use std::path::{Path, PathBuf};
use std::rc::Rc;

use backdrop_core::{
    aspect_of, assess, cpu_effect, AbortSignal, AnimationDriver, AssetFetcher, BackdropConfig,
    CaptureError, DeviceInfo, EffectKind, EnvironmentCapture, FrameUpdate, LifecycleGate,
    PerformanceTier, Theme,
};
use glam::{UVec2, Vec2};
use image::RgbaImage;

const USAGE: &str = "usage: backdrop-native [--variant raymarch|morph|gradient] [--size WxH] \
[--frames N] [--dt SECONDS] [--hdr PATH] [--theme light|dark] [--out DIR] [--fallback]";

/// Reads panoramas from the local filesystem.
struct FileFetcher;

impl AssetFetcher for FileFetcher {
    async fn fetch(&self, url: &str, signal: &AbortSignal) -> Result<Vec<u8>, CaptureError> {
        if signal.is_aborted() {
            return Err(CaptureError::Aborted);
        }
        std::fs::read(url).map_err(|e| CaptureError::Fetch(format!("{url}: {e}")))
    }
}

struct Options {
    variant: Option<EffectKind>,
    size: UVec2,
    frames: u32,
    dt: f32,
    hdr: Option<PathBuf>,
    theme: Theme,
    out: PathBuf,
    fallback: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            variant: None,
            size: UVec2::new(640, 360),
            frames: 1,
            dt: 1.0 / 60.0,
            hdr: None,
            theme: Theme::Dark,
            out: PathBuf::from("frames"),
            fallback: false,
        }
    }
}

fn parse_size(s: &str) -> anyhow::Result<UVec2> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("size must look like 640x360, got {s:?}"))?;
    Ok(UVec2::new(w.parse()?, h.parse()?).max(UVec2::ONE))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| anyhow::anyhow!("{flag} needs a value\n{USAGE}"))
        };
        match flag.as_str() {
            "--variant" => {
                let name = value()?;
                opts.variant = Some(
                    EffectKind::from_name(&name)
                        .ok_or_else(|| anyhow::anyhow!("unknown variant {name:?}"))?,
                );
            }
            "--size" => opts.size = parse_size(&value()?)?,
            "--frames" => opts.frames = value()?.parse::<u32>()?.max(1),
            "--dt" => opts.dt = value()?.parse()?,
            "--hdr" => opts.hdr = Some(PathBuf::from(value()?)),
            "--theme" => {
                opts.theme = match value()?.as_str() {
                    "light" => Theme::Light,
                    "dark" => Theme::Dark,
                    other => anyhow::bail!("unknown theme {other:?}"),
                }
            }
            "--out" => opts.out = PathBuf::from(value()?),
            "--fallback" => opts.fallback = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other:?}\n{USAGE}"),
        }
    }
    Ok(opts)
}

fn host_tier() -> PerformanceTier {
    let info = DeviceInfo {
        logical_cores: std::thread::available_parallelism()
            .ok()
            .map(|n| n.get() as u32),
        device_memory_gb: None,
        user_agent: String::new(),
    };
    assess(&info)
}

fn save(image: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    image.save(path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn run(opts: Options) -> anyhow::Result<()> {
    std::fs::create_dir_all(&opts.out)?;
    let tier = host_tier();
    let config = BackdropConfig::default();
    log::info!(
        "tier low_end={} mobile={} post={}",
        tier.is_low_end,
        tier.is_mobile,
        tier.post_processing_enabled
    );

    if opts.fallback {
        let gradient = LifecycleGate::new(true).fallback(opts.theme);
        return save(
            &gradient.render(opts.size.x, opts.size.y),
            &opts.out.join("fallback.png"),
        );
    }

    let kind = opts.variant.unwrap_or_else(|| config.effect_for(&tier));
    log::info!("variant={} size={}x{}", kind.name(), opts.size.x, opts.size.y);
    let mut effect = cpu_effect(kind);
    effect.mount(opts.size);

    if let (Some(path), true) = (&opts.hdr, kind.uses_environment()) {
        let url = path.to_string_lossy();
        let capture = EnvironmentCapture::new(FileFetcher, config.face_size(&tier));
        match pollster::block_on(capture.load(&url, &AbortSignal::new())) {
            Ok(map) => {
                log::info!("environment map {}px faces", map.face_size());
                effect.set_environment(Rc::new(map));
            }
            Err(e) => log::warn!("{url}: {e}; rendering without environment map"),
        }
    }

    let mut driver = AnimationDriver::new(&tier, kind.camera(aspect_of(opts.size)), opts.theme);
    let mut image = RgbaImage::new(opts.size.x, opts.size.y);
    for i in 0..opts.frames {
        let elapsed = i as f32 * opts.dt;
        // Slow Lissajous sweep standing in for a pointer.
        driver.set_pointer_target(Vec2::new(
            0.5 + 0.4 * (elapsed * 0.7).sin(),
            0.5 + 0.3 * (elapsed * 0.5).cos(),
        ));
        if driver.tick(elapsed, opts.dt, opts.size, opts.theme) == FrameUpdate::Skipped {
            continue;
        }
        effect.update_frame(driver.params());
        effect.rasterize(&mut image);
        save(&image, &opts.out.join(format!("{}_{i:04}.png", kind.name())))?;
    }
    effect.dispose();
    Ok(())
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let result = parse_args(std::env::args().skip(1)).and_then(run);
    if let Err(e) = result {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
