//! Build-time choices for a backdrop instance.

use crate::effect::EffectKind;
use crate::profiler::{EnvironmentAsset, PerformanceTier};

#[derive(Clone, Debug, PartialEq)]
pub struct BackdropConfig {
    /// Variant used on capable devices.
    pub variant: EffectKind,
    pub small_asset: String,
    pub full_asset: String,
    pub mobile_face_size: u32,
    pub desktop_face_size: u32,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            variant: EffectKind::RayMarch,
            small_asset: "/textures/studio_small_09_512.hdr".to_string(),
            full_asset: "/textures/studio_small_09_1k.hdr".to_string(),
            mobile_face_size: 256,
            desktop_face_size: 512,
        }
    }
}

impl BackdropConfig {
    /// Low-end devices always get the gradient, the cheapest variant.
    pub fn effect_for(&self, tier: &PerformanceTier) -> EffectKind {
        if tier.is_low_end {
            EffectKind::Gradient
        } else {
            self.variant
        }
    }

    pub fn asset_url(&self, asset: EnvironmentAsset) -> &str {
        match asset {
            EnvironmentAsset::Small => &self.small_asset,
            EnvironmentAsset::Full => &self.full_asset,
        }
    }

    pub fn face_size(&self, tier: &PerformanceTier) -> u32 {
        if tier.is_mobile {
            self.mobile_face_size
        } else {
            self.desktop_face_size
        }
    }
}
