//! One-shot device capability assessment.
//!
//! The host reads whatever it can about the device into a [`DeviceInfo`]
//! snapshot; [`assess`] turns that into an immutable [`PerformanceTier`] that
//! is passed explicitly to every component for the rest of the session.

/// Case-insensitive user-agent fragments identifying phones and tablets.
pub const MOBILE_UA_PATTERNS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

pub const LOW_END_MAX_CORES: u32 = 4;
pub const LOW_END_MAX_MEMORY_GB: f32 = 4.0;

/// Raw device facts as reported by the host. `None` means the API is absent.
#[derive(Clone, Debug, Default)]
pub struct DeviceInfo {
    pub logical_cores: Option<u32>,
    pub device_memory_gb: Option<f32>,
    pub user_agent: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerformanceTier {
    pub is_low_end: bool,
    pub is_mobile: bool,
    pub max_pixel_ratio: f32,
    pub post_processing_enabled: bool,
}

/// Which panorama the environment capture should fetch for this tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnvironmentAsset {
    Small,
    Full,
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_PATTERNS.iter().any(|p| ua.contains(p))
}

/// Derive the performance tier. Missing signals never count as low-end.
pub fn assess(info: &DeviceInfo) -> PerformanceTier {
    let few_cores = info
        .logical_cores
        .map(|c| c > 0 && c <= LOW_END_MAX_CORES)
        .unwrap_or(false);
    let low_memory = info
        .device_memory_gb
        .map(|gb| gb > 0.0 && gb <= LOW_END_MAX_MEMORY_GB)
        .unwrap_or(false);
    let is_low_end = few_cores || low_memory;
    let is_mobile = is_mobile_user_agent(&info.user_agent);
    let max_pixel_ratio = if is_low_end {
        0.5
    } else if is_mobile {
        0.75
    } else {
        1.0
    };
    let tier = PerformanceTier {
        is_low_end,
        is_mobile,
        max_pixel_ratio,
        post_processing_enabled: !is_low_end,
    };
    log::info!(
        "[profiler] cores={:?} memory={:?} -> low_end={} mobile={} max_dpr={}",
        info.logical_cores,
        info.device_memory_gb,
        tier.is_low_end,
        tier.is_mobile,
        tier.max_pixel_ratio
    );
    tier
}

impl PerformanceTier {
    pub const DESKTOP: Self = Self {
        is_low_end: false,
        is_mobile: false,
        max_pixel_ratio: 1.0,
        post_processing_enabled: true,
    };

    /// Continuous quality level consumed by the renderers.
    pub fn quality(&self) -> f32 {
        if self.is_low_end {
            0.0
        } else if self.is_mobile {
            0.5
        } else {
            1.0
        }
    }

    /// Tighter cap applied on top of `max_pixel_ratio` for the soft backdrop.
    pub fn backdrop_pixel_cap(&self) -> f32 {
        if self.is_low_end {
            0.4
        } else if self.is_mobile {
            0.6
        } else {
            0.8
        }
    }

    pub fn effective_pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        dpr.min(self.max_pixel_ratio).min(self.backdrop_pixel_cap())
    }

    /// Panorama to load, or `None` when the capture must be skipped entirely.
    pub fn environment_asset(&self) -> Option<EnvironmentAsset> {
        if self.is_low_end {
            None
        } else if self.is_mobile {
            Some(EnvironmentAsset::Small)
        } else {
            Some(EnvironmentAsset::Full)
        }
    }

    /// Bloom is kept on mobile; the chromatic offset only on desktop.
    pub fn chromatic_aberration_enabled(&self) -> bool {
        self.post_processing_enabled && !self.is_mobile
    }
}
