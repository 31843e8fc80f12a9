//! Cancellable environment capture: fetch an HDR panorama, project it onto a
//! cube and hand the result to the renderer. The browser stops after the
//! decode and projects on the GPU.
//!
//! Fetching is abstracted behind [`AssetFetcher`] so the browser `fetch` and
//! a local file reader share the same pipeline. Every step re-checks the
//! [`AbortSignal`]; once it fires nothing is applied.

use crate::config::BackdropConfig;
use crate::envmap::{EnvironmentMap, EquirectImage};
use crate::profiler::PerformanceTier;
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CaptureError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("unexpected HTTP status {0}")]
    Http(u16),
    #[error("panorama decode failed: {0}")]
    Decode(String),
    #[error("panorama has no pixels")]
    EmptyImage,
    #[error("capture aborted")]
    Aborted,
}

/// Shared cancellation flag; clones observe the same state.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal(Rc<Cell<bool>>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.set(true);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.get()
    }

    fn check(&self) -> Result<(), CaptureError> {
        if self.is_aborted() {
            Err(CaptureError::Aborted)
        } else {
            Ok(())
        }
    }
}

/// Source of raw asset bytes.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&self, url: &str, signal: &AbortSignal) -> Result<Vec<u8>, CaptureError>;
}

impl<F: AssetFetcher> AssetFetcher for &F {
    async fn fetch(&self, url: &str, signal: &AbortSignal) -> Result<Vec<u8>, CaptureError> {
        (**self).fetch(url, signal).await
    }
}

pub struct EnvironmentCapture<F> {
    fetcher: F,
    face_size: u32,
}

impl<F: AssetFetcher> EnvironmentCapture<F> {
    pub fn new(fetcher: F, face_size: u32) -> Self {
        Self { fetcher, face_size }
    }

    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    /// Fetch and decode without projecting. Hosts that project on the GPU
    /// stop here.
    pub async fn load_panorama(
        &self,
        url: &str,
        signal: &AbortSignal,
    ) -> Result<EquirectImage, CaptureError> {
        signal.check()?;
        let bytes = self.fetcher.fetch(url, signal).await?;
        signal.check()?;
        let panorama = EquirectImage::decode_hdr(&bytes)?;
        signal.check()?;
        Ok(panorama)
    }

    /// Fetch, decode and project on the CPU. Returns `Aborted` as soon as
    /// the signal fires, even if the network result already arrived.
    pub async fn load(&self, url: &str, signal: &AbortSignal) -> Result<EnvironmentMap, CaptureError> {
        let panorama = self.load_panorama(url, signal).await?;
        let map = EnvironmentMap::from_equirect(&panorama, self.face_size);
        signal.check()?;
        Ok(map)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Applied,
    /// Low-end tier: nothing was fetched.
    Skipped,
    Cancelled,
    /// Fetch or decode failed; the renderer keeps shading without a map.
    Failed,
}

/// Run the capture the tier allows and hand the decoded panorama, with the
/// tier's cube face size, to `apply` unless cancelled.
pub async fn capture_panorama_for_tier<F: AssetFetcher>(
    tier: &PerformanceTier,
    config: &BackdropConfig,
    fetcher: F,
    signal: &AbortSignal,
    apply: impl FnOnce(EquirectImage, u32),
) -> CaptureOutcome {
    let Some(asset) = tier.environment_asset() else {
        return CaptureOutcome::Skipped;
    };
    let url = config.asset_url(asset);
    let capture = EnvironmentCapture::new(fetcher, config.face_size(tier));
    match capture.load_panorama(url, signal).await {
        Ok(panorama) if !signal.is_aborted() => {
            log::info!(
                "[capture] panorama ready ({}x{} from {url})",
                panorama.width,
                panorama.height
            );
            apply(panorama, capture.face_size());
            CaptureOutcome::Applied
        }
        Ok(_) | Err(CaptureError::Aborted) => CaptureOutcome::Cancelled,
        Err(_) if signal.is_aborted() => CaptureOutcome::Cancelled,
        Err(err) => {
            log::warn!("[capture] {url}: {err}; rendering without environment map");
            CaptureOutcome::Failed
        }
    }
}

/// [`capture_panorama_for_tier`] followed by the CPU cube projection.
pub async fn capture_for_tier<F: AssetFetcher>(
    tier: &PerformanceTier,
    config: &BackdropConfig,
    fetcher: F,
    signal: &AbortSignal,
    apply: impl FnOnce(EnvironmentMap),
) -> CaptureOutcome {
    capture_panorama_for_tier(tier, config, fetcher, signal, |panorama, face_size| {
        apply(EnvironmentMap::from_equirect(&panorama, face_size))
    })
    .await
}
